//! macOS connection table implementation using lsof.

use std::collections::HashSet;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::domain::{ConnectionStatus, Protocol, RawConnection};
use crate::error::{Error, Result};

use super::utils::Utils;
use super::Scanner;

/// macOS-specific connection scanner using lsof.
pub struct DarwinScanner;

impl DarwinScanner {
    /// Create a new macOS scanner.
    pub fn new() -> Self {
        Self
    }

    /// Parse `lsof -i -P -n +c 0` output.
    ///
    /// ```text
    /// COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
    /// node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
    /// Google    1234  code   30u  IPv4 0x1d8015e195af1f3f      0t0  TCP 10.0.0.2:50412->140.82.112.4:443 (ESTABLISHED)
    /// mDNSRespo  199 _mdns    6u  IPv4 0x2d8015e195af1f3f      0t0  UDP *:5353
    /// ```
    fn parse_lsof_output(&self, output: &str) -> Vec<RawConnection> {
        let mut connections = Vec::new();
        let mut seen: HashSet<RawConnection> = HashSet::new();

        for line in output.lines().skip(1) {
            if line.is_empty() {
                continue;
            }

            let components: Vec<&str> = line.split_whitespace().collect();
            if components.len() < 9 {
                continue;
            }

            let pid: u32 = match components[1].parse() {
                Ok(p) => p,
                Err(_) => continue,
            };

            // NODE column holds the protocol; NAME and the optional state follow it
            let Some(node_idx) = components
                .iter()
                .skip(4)
                .position(|c| *c == "TCP" || *c == "UDP")
                .map(|i| i + 4)
            else {
                continue;
            };

            let protocol = if components[node_idx] == "TCP" {
                Protocol::Tcp
            } else {
                Protocol::Udp
            };

            let Some(name) = components.get(node_idx + 1) else {
                continue;
            };

            let status = components
                .get(node_idx + 2)
                .map(|s| ConnectionStatus::parse(s))
                .unwrap_or(ConnectionStatus::None);

            let (local, remote) = Utils::split_endpoints(name);

            let (local_address, local_port) = match Utils::parse_address(local) {
                Some(parsed) => parsed,
                None => continue,
            };

            let (remote_address, remote_port) = match remote.and_then(Utils::parse_address) {
                Some((addr, port)) => (Some(addr), Some(port)),
                None => (None, None),
            };

            let connection = RawConnection {
                local_address,
                local_port,
                remote_address,
                remote_port,
                pid: Some(pid),
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

impl Default for DarwinScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for DarwinScanner {
    fn scan(&self) -> Result<Vec<RawConnection>> {
        debug!("Listing sockets with lsof");

        let output = Command::new("/usr/sbin/lsof")
            .args(["-i", "-P", "-n", "+c", "0"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Error::CommandFailed(format!("Failed to run lsof: {}", e)))?;

        // lsof exits 1 when nothing matched; only stderr tells us about refusals
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("Operation not permitted") || stderr.contains("Permission denied") {
                return Err(Error::PermissionDenied(stderr.trim().to_string()));
            }
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| Error::ParseError(format!("Invalid UTF-8 in lsof output: {}", e)))?;

        Ok(self.parse_lsof_output(&stdout))
    }
}
