//! Unix process table implementation.
//!
//! Uses the following:
//! - `nix::sys::signal::kill` for SIGTERM, SIGKILL and existence probes
//! - `ps -p PID -o ...` for process attributes

use std::path::Path;
use std::process::{Command, Stdio};

use chrono::{Duration as ChronoDuration, Utc};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal as NixSignal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::domain::{describe_state, ProcessInfo, Signal};
use crate::error::{Error, Result};
use crate::ports::ProcessTable;

/// Process table backed by `ps` and POSIX signals.
#[derive(Debug, Default)]
pub struct UnixProcessTable;

impl UnixProcessTable {
    pub fn new() -> Self {
        Self
    }

    /// Run `ps -p PID -o <field>= ...` and return its trimmed output.
    ///
    /// `Ok(None)` means ps found no such process.
    fn ps(&self, pid: u32, fields: &[&str]) -> Result<Option<String>> {
        let mut cmd = Command::new("ps");
        cmd.args(["-p", &pid.to_string()]);
        // One -o per field: procps treats everything after '=' as header text
        for field in fields {
            cmd.args(["-o", &format!("{}=", field)]);
        }

        let output = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| Error::CommandFailed(format!("Failed to run ps: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

        // ps -p returns exit code 1 and no rows if the process doesn't exist
        if stdout.is_empty() {
            return Ok(None);
        }

        Ok(Some(stdout))
    }

    /// First command-line argument, from `/proc` or else from `ps`.
    fn argv0(&self, pid: u32) -> Option<String> {
        if let Ok(raw) = std::fs::read(format!("/proc/{}/cmdline", pid)) {
            if let Some(first) = raw.split(|b| *b == 0).next().filter(|a| !a.is_empty()) {
                return Some(String::from_utf8_lossy(first).into_owned());
            }
        }
        let args = self.ps(pid, &["args"]).ok()??;
        args.split_whitespace().next().map(str::to_string)
    }

    /// Existence probe with signal 0.
    fn probe(&self, pid: u32) -> Result<()> {
        let target = to_pid(pid)?;
        match signal::kill(target, None::<NixSignal>) {
            // EPERM still means the process exists
            Ok(()) | Err(Errno::EPERM) => Ok(()),
            Err(errno) => Err(map_errno(pid, errno)),
        }
    }
}

fn to_pid(pid: u32) -> Result<Pid> {
    // 0 and negative values address process groups, never a single process
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Ok(Pid::from_raw(raw)),
        _ => Err(Error::ProcessNotFound(pid)),
    }
}

fn map_errno(pid: u32, errno: Errno) -> Error {
    match errno {
        Errno::ESRCH => Error::ProcessNotFound(pid),
        Errno::EPERM => Error::PermissionDenied(format!("cannot signal process {}", pid)),
        other => Error::Io(other.into()),
    }
}

/// Length at which the kernel cuts off `comm` on Linux.
const COMM_MAX: usize = 15;

/// Recover the full name from `argv[0]` when `comm` was cut short.
fn extend_truncated(comm: String, argv0: &str) -> String {
    match Path::new(argv0).file_name().map(|n| n.to_string_lossy()) {
        Some(full) if full.len() > comm.len() && full.starts_with(comm.as_str()) => {
            full.into_owned()
        }
        _ => comm,
    }
}

/// Parse a `ps` etime value (`[[dd-]hh:]mm:ss`) into seconds.
pub(crate) fn parse_etime(etime: &str) -> Option<i64> {
    let (days, clock) = match etime.split_once('-') {
        Some((d, rest)) => (d.parse::<i64>().ok()?, rest),
        None => (0, etime),
    };

    let parts: Vec<i64> = clock
        .split(':')
        .map(|p| p.parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()?;

    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => (0, *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };

    Some(((days * 24 + hours) * 60 + minutes) * 60 + seconds)
}

impl ProcessTable for UnixProcessTable {
    fn process_name(&self, pid: u32) -> Result<String> {
        self.probe(pid)?;

        let comm = match self.ps(pid, &["comm"])? {
            Some(comm) => comm,
            None => {
                // Gone since the probe, or ps cannot see it
                self.probe(pid)?;
                return Err(Error::CommandFailed(format!("ps returned no row for {}", pid)));
            }
        };

        // macOS reports the full executable path
        let name = Path::new(&comm)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(comm);

        if name.len() == COMM_MAX {
            if let Some(argv0) = self.argv0(pid) {
                return Ok(extend_truncated(name, &argv0));
            }
        }

        Ok(name)
    }

    fn lookup(&self, pid: u32) -> Result<ProcessInfo> {
        let name = self.process_name(pid)?;

        let row = self
            .ps(pid, &["user", "stat", "etime", "args"])?
            .ok_or(Error::ProcessNotFound(pid))?;

        let mut fields = row.split_whitespace();
        let username = fields.next().unwrap_or_default().to_string();
        let stat = fields.next().unwrap_or_default();
        let etime = fields.next().unwrap_or_default();
        let cmdline: Vec<String> = fields.map(str::to_string).collect();

        let create_time =
            parse_etime(etime).map(|secs| Utc::now() - ChronoDuration::seconds(secs));

        Ok(ProcessInfo {
            pid,
            name,
            status: describe_state(stat).to_string(),
            create_time,
            cmdline,
            username,
        })
    }

    fn signal(&self, pid: u32, signal: Signal) -> Result<()> {
        let target = to_pid(pid)?;
        let sig = match signal {
            Signal::Graceful => NixSignal::SIGTERM,
            Signal::Hard => NixSignal::SIGKILL,
        };

        debug!(pid = pid, signal = sig.as_str(), "Sending signal to process");

        signal::kill(target, sig).map_err(|errno| {
            if errno == Errno::EPERM {
                warn!(pid = pid, "Permission denied to signal process");
            }
            map_errno(pid, errno)
        })
    }

    fn is_alive(&self, pid: u32) -> bool {
        if self.probe(pid).is_err() {
            return false;
        }

        // An exited child lingers as a zombie until reaped
        match self.ps(pid, &["stat"]) {
            Ok(Some(stat)) => !stat.starts_with('Z'),
            Ok(None) => false,
            // Without ps the signal probe is all we have
            Err(_) => true,
        }
    }
}
