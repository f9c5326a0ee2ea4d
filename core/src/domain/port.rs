//! Port and connection domain models.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Process name used when the owner of a connection cannot be inspected.
pub const UNKNOWN_PROCESS: &str = "Unknown";

// ============================================================================
// Protocol
// ============================================================================

/// Transport protocol of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ConnectionStatus
// ============================================================================

/// Socket state as reported by the OS connection table.
///
/// `None` covers connectionless sockets (UDP) and any state label the
/// platform reports that has no counterpart here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Listen,
    Established,
    SynSent,
    SynRecv,
    #[serde(rename = "FIN_WAIT1")]
    FinWait1,
    #[serde(rename = "FIN_WAIT2")]
    FinWait2,
    TimeWait,
    Close,
    CloseWait,
    LastAck,
    Closing,
    None,
}

impl ConnectionStatus {
    /// Parse a state label from `ss` (`ESTAB`, `TIME-WAIT`) or `lsof` (`ESTABLISHED`, `TIME_WAIT`).
    pub fn parse(label: &str) -> Self {
        let normalized = label
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .to_ascii_uppercase()
            .replace('-', "_");

        match normalized.as_str() {
            "LISTEN" => ConnectionStatus::Listen,
            "ESTAB" | "ESTABLISHED" => ConnectionStatus::Established,
            "SYN_SENT" => ConnectionStatus::SynSent,
            "SYN_RECV" | "SYN_RECEIVED" => ConnectionStatus::SynRecv,
            "FIN_WAIT_1" | "FIN_WAIT1" => ConnectionStatus::FinWait1,
            "FIN_WAIT_2" | "FIN_WAIT2" => ConnectionStatus::FinWait2,
            "TIME_WAIT" => ConnectionStatus::TimeWait,
            "CLOSE" | "CLOSED" => ConnectionStatus::Close,
            "CLOSE_WAIT" => ConnectionStatus::CloseWait,
            "LAST_ACK" => ConnectionStatus::LastAck,
            "CLOSING" => ConnectionStatus::Closing,
            _ => ConnectionStatus::None,
        }
    }

    /// Label in the conventional upper-case form (`LISTEN`, `TIME_WAIT`, ...).
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Listen => "LISTEN",
            ConnectionStatus::Established => "ESTABLISHED",
            ConnectionStatus::SynSent => "SYN_SENT",
            ConnectionStatus::SynRecv => "SYN_RECV",
            ConnectionStatus::FinWait1 => "FIN_WAIT1",
            ConnectionStatus::FinWait2 => "FIN_WAIT2",
            ConnectionStatus::TimeWait => "TIME_WAIT",
            ConnectionStatus::Close => "CLOSE",
            ConnectionStatus::CloseWait => "CLOSE_WAIT",
            ConnectionStatus::LastAck => "LAST_ACK",
            ConnectionStatus::Closing => "CLOSING",
            ConnectionStatus::None => "NONE",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// RawConnection / PortRecord
// ============================================================================

/// One row of the OS connection table, before process names are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawConnection {
    pub local_address: String,
    pub local_port: u16,
    pub remote_address: Option<String>,
    pub remote_port: Option<u16>,
    /// Owning process, absent when the caller may not inspect it.
    pub pid: Option<u32>,
    pub status: ConnectionStatus,
    pub protocol: Protocol,
}

/// A connection together with the process that owns it.
///
/// Records are members of a snapshot and are never merged across scans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRecord {
    /// Local port number (e.g., 3000, 8080).
    pub local_port: u16,
    /// Local address the socket is bound to (e.g., "*", "127.0.0.1", "[::1]").
    pub local_address: String,
    /// Remote port, for connected sockets.
    pub remote_port: Option<u16>,
    /// Remote address, for connected sockets.
    pub remote_address: Option<String>,
    /// Owning process ID, 0 when unknown.
    pub pid: u32,
    /// Owning process name, or [`UNKNOWN_PROCESS`].
    pub process_name: String,
    pub status: ConnectionStatus,
    pub protocol: Protocol,
}

impl PortRecord {
    /// Build a record from a raw connection and an already-resolved process name.
    pub fn from_raw(raw: RawConnection, process_name: impl Into<String>) -> Self {
        Self {
            local_port: raw.local_port,
            local_address: raw.local_address,
            remote_port: raw.remote_port,
            remote_address: raw.remote_address,
            pid: raw.pid.unwrap_or(0),
            process_name: process_name.into(),
            status: raw.status,
            protocol: raw.protocol,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.status == ConnectionStatus::Listen
    }

    /// Formatted remote endpoint, or "-" for unconnected sockets.
    pub fn remote_endpoint(&self) -> String {
        match (&self.remote_address, self.remote_port) {
            (Some(addr), Some(port)) => format!("{}:{}", addr, port),
            _ => "-".to_string(),
        }
    }

    /// Check if this record matches a search query.
    ///
    /// Searches across process name, port number, PID and addresses.
    pub fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }

        let query_lower = query.to_lowercase();
        self.process_name.to_lowercase().contains(&query_lower)
            || self.local_port.to_string().contains(&query_lower)
            || self.pid.to_string().contains(&query_lower)
            || self.local_address.to_lowercase().contains(&query_lower)
            || self
                .remote_address
                .as_deref()
                .map(|a| a.to_lowercase().contains(&query_lower))
                .unwrap_or(false)
    }
}

impl std::fmt::Display for PortRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}:{} {} (PID: {}, Process: {})",
            self.protocol, self.local_address, self.local_port, self.status, self.pid, self.process_name
        )
    }
}

// ============================================================================
// PortFilter
// ============================================================================

/// Filter criteria for port listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortFilter {
    /// Text to search across record fields.
    #[serde(default)]
    pub search_text: String,
    /// Minimum port number (inclusive).
    #[serde(default)]
    pub min_port: Option<u16>,
    /// Maximum port number (inclusive).
    #[serde(default)]
    pub max_port: Option<u16>,
    /// Only this transport protocol.
    #[serde(default)]
    pub protocol: Option<Protocol>,
    /// Only sockets in LISTEN state.
    #[serde(default)]
    pub listening_only: bool,
    /// Only these local ports (a quick-filter preset such as "http" or "db").
    #[serde(default)]
    pub ports: Option<HashSet<u16>>,
}

impl PortFilter {
    /// Create a new filter with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the filter has any active conditions.
    pub fn is_active(&self) -> bool {
        !self.search_text.is_empty()
            || self.min_port.is_some()
            || self.max_port.is_some()
            || self.protocol.is_some()
            || self.listening_only
            || self.ports.is_some()
    }

    /// Check if a record matches all filter criteria.
    pub fn matches(&self, record: &PortRecord) -> bool {
        if !self.search_text.is_empty() && !record.matches_search(&self.search_text) {
            return false;
        }
        if let Some(min) = self.min_port {
            if record.local_port < min {
                return false;
            }
        }
        if let Some(max) = self.max_port {
            if record.local_port > max {
                return false;
            }
        }
        if let Some(protocol) = self.protocol {
            if record.protocol != protocol {
                return false;
            }
        }
        if self.listening_only && !record.is_listening() {
            return false;
        }
        if let Some(ports) = &self.ports {
            if !ports.contains(&record.local_port) {
                return false;
            }
        }
        true
    }

    /// Set the search text.
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    /// Set the port range.
    pub fn with_port_range(mut self, min: Option<u16>, max: Option<u16>) -> Self {
        self.min_port = min;
        self.max_port = max;
        self
    }

    /// Restrict to one protocol.
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Enable/disable listening-only mode.
    pub fn with_listening_only(mut self, enabled: bool) -> Self {
        self.listening_only = enabled;
        self
    }

    /// Restrict to a fixed set of ports.
    pub fn with_ports(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.ports = Some(ports.into_iter().collect());
        self
    }
}

/// Apply a filter to a list of records.
pub fn filter_ports(records: &[PortRecord], filter: &PortFilter) -> Vec<PortRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        port: u16,
        pid: u32,
        name: &str,
        status: ConnectionStatus,
        protocol: Protocol,
    ) -> PortRecord {
        PortRecord {
            local_port: port,
            local_address: "127.0.0.1".to_string(),
            remote_port: None,
            remote_address: None,
            pid,
            process_name: name.to_string(),
            status,
            protocol,
        }
    }

    #[test]
    fn test_parse_status_labels() {
        assert_eq!(ConnectionStatus::parse("LISTEN"), ConnectionStatus::Listen);
        assert_eq!(ConnectionStatus::parse("ESTAB"), ConnectionStatus::Established);
        assert_eq!(ConnectionStatus::parse("(ESTABLISHED)"), ConnectionStatus::Established);
        assert_eq!(ConnectionStatus::parse("TIME-WAIT"), ConnectionStatus::TimeWait);
        assert_eq!(ConnectionStatus::parse("FIN-WAIT-1"), ConnectionStatus::FinWait1);
        assert_eq!(ConnectionStatus::parse("CLOSE_WAIT"), ConnectionStatus::CloseWait);
        assert_eq!(ConnectionStatus::parse("UNCONN"), ConnectionStatus::None);
    }

    #[test]
    fn test_status_serializes_as_label() {
        let json = serde_json::to_string(&ConnectionStatus::FinWait2).unwrap();
        assert_eq!(json, "\"FIN_WAIT2\"");
        let json = serde_json::to_string(&ConnectionStatus::TimeWait).unwrap();
        assert_eq!(json, "\"TIME_WAIT\"");
        assert_eq!(ConnectionStatus::TimeWait.to_string(), "TIME_WAIT");
    }

    #[test]
    fn test_from_raw_defaults_pid_to_zero() {
        let raw = RawConnection {
            local_address: "*".to_string(),
            local_port: 5353,
            remote_address: None,
            remote_port: None,
            pid: None,
            status: ConnectionStatus::None,
            protocol: Protocol::Udp,
        };
        let record = PortRecord::from_raw(raw, UNKNOWN_PROCESS);
        assert_eq!(record.pid, 0);
        assert_eq!(record.process_name, "Unknown");
        assert_eq!(record.remote_endpoint(), "-");
    }

    #[test]
    fn test_matches_search() {
        let mut r = record(3000, 1234, "node", ConnectionStatus::Listen, Protocol::Tcp);
        r.remote_address = Some("10.0.0.5".to_string());

        assert!(r.matches_search("NODE"));
        assert!(r.matches_search("3000"));
        assert!(r.matches_search("1234"));
        assert!(r.matches_search("10.0.0"));
        assert!(r.matches_search(""));
        assert!(!r.matches_search("nginx"));
    }

    #[test]
    fn test_filter_ports() {
        let records = vec![
            record(3000, 1, "node", ConnectionStatus::Listen, Protocol::Tcp),
            record(80, 2, "nginx", ConnectionStatus::Established, Protocol::Tcp),
            record(5353, 3, "mdns", ConnectionStatus::None, Protocol::Udp),
        ];

        let filter = PortFilter::new().with_search("node");
        assert_eq!(filter_ports(&records, &filter).len(), 1);

        let filter = PortFilter::new().with_protocol(Protocol::Udp);
        let result = filter_ports(&records, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].local_port, 5353);

        let filter = PortFilter::new().with_listening_only(true);
        assert_eq!(filter_ports(&records, &filter)[0].local_port, 3000);

        let filter = PortFilter::new().with_ports([80, 443]);
        assert_eq!(filter_ports(&records, &filter)[0].process_name, "nginx");

        let filter = PortFilter::new().with_port_range(Some(1000), Some(4000));
        assert_eq!(filter_ports(&records, &filter).len(), 1);
    }

    #[test]
    fn test_port_filter_default() {
        assert!(!PortFilter::new().is_active());
        assert!(PortFilter::new().with_listening_only(true).is_active());
    }
}
