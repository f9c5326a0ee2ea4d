//! Linux connection table implementation using ss.

use std::collections::HashSet;
use std::path::Path;
use std::process::{Command, Stdio};

use regex::Regex;
use tracing::debug;

use crate::domain::{ConnectionStatus, Protocol, RawConnection};
use crate::error::{Error, Result};

use super::utils::Utils;
use super::Scanner;

/// Locations checked for the ss binary before falling back to `$PATH`.
const SS_CANDIDATES: &[&str] = &["/usr/sbin/ss", "/usr/bin/ss", "/sbin/ss", "/bin/ss"];

/// Linux-specific connection scanner.
pub struct LinuxScanner {
    ss_path: String,
    pid_regex: Regex,
}

impl LinuxScanner {
    pub fn new() -> Self {
        let ss_path = SS_CANDIDATES
            .iter()
            .find(|p| Path::new(p).exists())
            .map(|p| p.to_string())
            .unwrap_or_else(|| "ss".to_string());

        Self {
            ss_path,
            pid_regex: Regex::new(r"pid=(\d+)").expect("valid pid regex"),
        }
    }

    /// Parse `ss -Htuanp` output.
    ///
    /// Expected format (no header):
    /// ```text
    /// tcp   LISTEN 0  4096  127.0.0.1:631        0.0.0.0:*          users:(("cupsd",pid=1,fd=7))
    /// tcp   ESTAB  0  0     192.168.1.5:50412    140.82.112.4:443   users:(("firefox",pid=2200,fd=88))
    /// udp   UNCONN 0  0     127.0.0.53%lo:53     0.0.0.0:*
    /// ```
    ///
    /// The process column is missing for sockets the caller may not inspect.
    fn parse_ss_output(&self, output: &str) -> Vec<RawConnection> {
        let mut connections = Vec::new();
        let mut seen: HashSet<RawConnection> = HashSet::new();

        for line in output.lines() {
            let components: Vec<&str> = line.split_whitespace().collect();
            if components.len() < 6 {
                continue;
            }

            let protocol = match components[0] {
                "tcp" => Protocol::Tcp,
                "udp" => Protocol::Udp,
                _ => continue,
            };

            let status = match protocol {
                Protocol::Udp if components[1] == "UNCONN" => ConnectionStatus::None,
                _ => ConnectionStatus::parse(components[1]),
            };

            let (local_address, local_port) = match Utils::parse_address(components[4]) {
                Some(parsed) => parsed,
                None => continue,
            };

            let (remote_address, remote_port) = match Utils::parse_address(components[5]) {
                Some((addr, port)) => (Some(addr), Some(port)),
                None => (None, None),
            };

            // First owner wins when several processes share the socket
            let pid = components
                .get(6..)
                .map(|rest| rest.join(" "))
                .and_then(|users| {
                    self.pid_regex
                        .captures(&users)
                        .and_then(|caps| caps[1].parse::<u32>().ok())
                });

            let connection = RawConnection {
                local_address,
                local_port,
                remote_address,
                remote_port,
                pid,
                status,
                protocol,
            };

            if seen.insert(connection.clone()) {
                connections.push(connection);
            }
        }

        connections
    }
}

impl Default for LinuxScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for LinuxScanner {
    /// List all inet sockets.
    ///
    /// Executes: `ss -Htuanp`
    ///
    /// Flags explained:
    /// -H, --no-header     Suppress header line
    /// -t, --tcp           display TCP sockets
    /// -u, --udp           display UDP sockets
    /// -a, --all           display listening and non-listening sockets
    /// -n, --numeric       don't resolve service names
    /// -p, --processes     show process using socket
    fn scan(&self) -> Result<Vec<RawConnection>> {
        debug!(ss = %self.ss_path, "Listing sockets");

        let output = Command::new(&self.ss_path)
            .args(["-Htuanp"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Error::CommandFailed(format!("Failed to run ss: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("Operation not permitted") || stderr.contains("Permission denied") {
                return Err(Error::PermissionDenied(stderr.trim().to_string()));
            }
            return Err(Error::CommandFailed(format!("ss failed: {}", stderr.trim())));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| Error::ParseError(format!("Invalid UTF-8 in ss output: {}", e)))?;

        Ok(self.parse_ss_output(&stdout))
    }
}
