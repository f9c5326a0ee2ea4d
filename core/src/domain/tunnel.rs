//! SSH tunnel definitions and status.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Runtime status of a tunnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TunnelStatus {
    Stopped,
    /// Reserved for front-ends that show a pending start; never returned by the supervisor.
    Starting,
    Running,
    /// The subprocess exited on its own. Reported once, then the tunnel reads as stopped.
    Error,
}

impl TunnelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TunnelStatus::Stopped => "stopped",
            TunnelStatus::Starting => "starting",
            TunnelStatus::Running => "running",
            TunnelStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for TunnelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted description of an SSH local port-forward.
///
/// The JSON field names are the on-disk format of `tunnels.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelDefinition {
    /// Unique key within the definition set.
    pub name: String,
    pub remote_user: String,
    pub remote_host: String,
    pub local_port: u16,
    pub remote_port: u16,
    /// Set when the tunnel was last started and not explicitly stopped since.
    #[serde(default)]
    pub enabled: bool,
    /// Path to an identity file passed to `ssh -i`.
    #[serde(default)]
    pub ssh_key: Option<String>,
}

impl TunnelDefinition {
    pub fn new(
        name: impl Into<String>,
        remote_user: impl Into<String>,
        remote_host: impl Into<String>,
        local_port: u16,
        remote_port: u16,
    ) -> Self {
        Self {
            name: name.into(),
            remote_user: remote_user.into(),
            remote_host: remote_host.into(),
            local_port,
            remote_port,
            enabled: false,
            ssh_key: None,
        }
    }

    pub fn with_key(mut self, path: impl Into<String>) -> Self {
        self.ssh_key = Some(path.into());
        self
    }

    /// `user@host` destination.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.remote_user, self.remote_host)
    }

    /// Check the fields that end up on the ssh command line.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidTunnel("name must not be empty".to_string()));
        }
        check_ssh_word("remote_user", &self.remote_user)?;
        check_ssh_word("remote_host", &self.remote_host)?;
        if self.local_port == 0 {
            return Err(Error::InvalidTunnel("local_port must be 1-65535".to_string()));
        }
        if self.remote_port == 0 {
            return Err(Error::InvalidTunnel("remote_port must be 1-65535".to_string()));
        }
        if matches!(self.ssh_key.as_deref(), Some(k) if k.trim().is_empty()) {
            return Err(Error::InvalidTunnel("ssh_key must not be blank".to_string()));
        }
        Ok(())
    }

    /// Argument vector for the local port-forward, without the program name.
    ///
    /// `-N -L <local>:localhost:<remote> [-i <key>] <user>@<host>`
    pub fn ssh_args(&self) -> Vec<String> {
        let mut args = vec![
            "-N".to_string(),
            "-L".to_string(),
            format!("{}:localhost:{}", self.local_port, self.remote_port),
        ];

        if let Some(key) = &self.ssh_key {
            args.push("-i".to_string());
            args.push(key.clone());
        }

        args.push(self.destination());
        args
    }

    /// Full command line including the ssh program.
    pub fn ssh_command(&self, program: &str) -> Vec<String> {
        let mut cmd = vec![program.to_string()];
        cmd.extend(self.ssh_args());
        cmd
    }
}

// user and host become a single argv word; a leading '-' would be read as an option
fn check_ssh_word(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidTunnel(format!("{} must not be empty", field)));
    }
    if value.starts_with('-') {
        return Err(Error::InvalidTunnel(format!("{} must not start with '-'", field)));
    }
    if value.chars().any(|c| c.is_whitespace() || c == '@') {
        return Err(Error::InvalidTunnel(format!(
            "{} must not contain whitespace or '@'",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TunnelDefinition {
        TunnelDefinition::new("test-tunnel", "testuser", "example.com", 8080, 80)
    }

    #[test]
    fn test_ssh_command() {
        let cmd = sample().ssh_command("ssh");
        assert_eq!(
            cmd,
            vec!["ssh", "-N", "-L", "8080:localhost:80", "testuser@example.com"]
        );
    }

    #[test]
    fn test_ssh_command_with_key() {
        let cmd = sample().with_key("/home/u/.ssh/id_ed25519").ssh_command("ssh");
        assert_eq!(cmd[4], "-i");
        assert_eq!(cmd[5], "/home/u/.ssh/id_ed25519");
        assert_eq!(cmd.last().unwrap(), "testuser@example.com");
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["name"], "test-tunnel");
        assert_eq!(json["remote_user"], "testuser");
        assert_eq!(json["local_port"], 8080);
        assert_eq!(json["enabled"], false);
        assert!(json["ssh_key"].is_null());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let def: TunnelDefinition = serde_json::from_str(
            r#"{"name":"t","remote_user":"u","remote_host":"h","local_port":1,"remote_port":2}"#,
        )
        .unwrap();
        assert!(!def.enabled);
        assert!(def.ssh_key.is_none());
    }

    #[test]
    fn test_validate() {
        assert!(sample().validate().is_ok());

        let mut bad = sample();
        bad.remote_host = "-oProxyCommand=evil".to_string();
        assert!(matches!(bad.validate(), Err(Error::InvalidTunnel(_))));

        let mut bad = sample();
        bad.local_port = 0;
        assert!(bad.validate().is_err());

        let mut bad = sample();
        bad.remote_user = "a b".to_string();
        assert!(bad.validate().is_err());

        let mut bad = sample();
        bad.name = "  ".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(TunnelStatus::Running.to_string(), "running");
        assert_eq!(
            serde_json::to_string(&TunnelStatus::Error).unwrap(),
            "\"error\""
        );
    }
}
