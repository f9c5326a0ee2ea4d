//! Process and termination-result domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attribute snapshot of a running process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    /// Scheduler state (e.g., "running", "sleeping", "zombie").
    pub status: String,
    /// Start time, when the process table reports one.
    pub create_time: Option<DateTime<Utc>>,
    pub cmdline: Vec<String>,
    pub username: String,
}

impl ProcessInfo {
    pub fn is_zombie(&self) -> bool {
        self.status == "zombie"
    }
}

/// Best-effort process details.
///
/// Lookup failures fold into `Unavailable` so callers always get a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessDetails {
    Available(ProcessInfo),
    Unavailable { pid: u32, error: String },
}

impl ProcessDetails {
    pub fn unavailable(pid: u32) -> Self {
        ProcessDetails::Unavailable {
            pid,
            error: "Unable to get process info".to_string(),
        }
    }

    pub fn pid(&self) -> u32 {
        match self {
            ProcessDetails::Available(info) => info.pid,
            ProcessDetails::Unavailable { pid, .. } => *pid,
        }
    }

    pub fn info(&self) -> Option<&ProcessInfo> {
        match self {
            ProcessDetails::Available(info) => Some(info),
            ProcessDetails::Unavailable { .. } => None,
        }
    }
}

/// Map a `ps` STAT code to a readable scheduler state.
pub fn describe_state(stat: &str) -> &'static str {
    match stat.chars().next() {
        Some('R') => "running",
        Some('S') => "sleeping",
        Some('D') | Some('U') => "disk-sleep",
        Some('T') => "stopped",
        Some('t') => "tracing-stop",
        Some('Z') => "zombie",
        Some('X') => "dead",
        Some('I') => "idle",
        Some('W') => "paging",
        _ => "unknown",
    }
}

/// Signals used by the termination protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Termination request the target may intercept (SIGTERM).
    Graceful,
    /// Unconditional termination (SIGKILL).
    Hard,
}

/// Classified result of a kill attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KillResult {
    Success,
    NotFound,
    AccessDenied,
    Error,
}

impl KillResult {
    pub fn is_success(&self) -> bool {
        matches!(self, KillResult::Success)
    }
}

impl std::fmt::Display for KillResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            KillResult::Success => "success",
            KillResult::NotFound => "not_found",
            KillResult::AccessDenied => "access_denied",
            KillResult::Error => "error",
        };
        f.write_str(s)
    }
}

/// A kill result paired with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillOutcome {
    pub result: KillResult,
    pub message: String,
}

impl KillOutcome {
    pub fn success(name: &str, pid: u32) -> Self {
        Self {
            result: KillResult::Success,
            message: format!("Successfully terminated {} (PID: {})", name, pid),
        }
    }

    pub fn not_found(pid: u32) -> Self {
        Self {
            result: KillResult::NotFound,
            message: format!("Process with PID {} not found", pid),
        }
    }

    pub fn access_denied(pid: u32) -> Self {
        Self {
            result: KillResult::AccessDenied,
            message: format!(
                "Access denied. Admin privileges may be required to kill PID {}",
                pid
            ),
        }
    }

    pub fn error(pid: u32, detail: impl std::fmt::Display) -> Self {
        Self {
            result: KillResult::Error,
            message: format!("Error killing process {}: {}", pid, detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_serializes_like_marker() {
        let details = ProcessDetails::unavailable(42);
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["pid"], 42);
        assert_eq!(json["error"], "Unable to get process info");
        assert!(details.info().is_none());
    }

    #[test]
    fn test_describe_state() {
        assert_eq!(describe_state("Ss"), "sleeping");
        assert_eq!(describe_state("R+"), "running");
        assert_eq!(describe_state("Z"), "zombie");
        assert_eq!(describe_state(""), "unknown");
    }

    #[test]
    fn test_zombie_from_stat() {
        let mut info = ProcessInfo {
            pid: 9,
            name: "defunct".to_string(),
            status: describe_state("Z+").to_string(),
            create_time: None,
            cmdline: Vec::new(),
            username: "dev".to_string(),
        };
        assert!(info.is_zombie());

        info.status = describe_state("S").to_string();
        assert!(!info.is_zombie());
    }

    #[test]
    fn test_kill_outcome_messages() {
        assert_eq!(
            KillOutcome::success("node", 7).message,
            "Successfully terminated node (PID: 7)"
        );
        assert_eq!(KillOutcome::not_found(7).result, KillResult::NotFound);
        assert!(KillOutcome::access_denied(7).message.contains("PID 7"));
        assert!(KillOutcome::error(7, "boom").message.ends_with("boom"));
        assert_eq!(
            serde_json::to_string(&KillResult::AccessDenied).unwrap(),
            "\"access_denied\""
        );
    }
}
