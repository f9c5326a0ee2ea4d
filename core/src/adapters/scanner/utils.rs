pub struct Utils;

impl Utils {
    /// Parse an address:port string.
    ///
    /// Handles multiple address formats:
    /// - IPv4: "127.0.0.1:3000" or "*:8080"
    /// - IPv6: "\[::1]:3000" or "\[fe80::1]:8080"
    /// - Interface-scoped: "127.0.0.53%lo:53" (the scope is dropped)
    ///
    /// Wildcard peers such as "*:*" or "0.0.0.0:*" have no port and yield `None`.
    pub fn parse_address(address: &str) -> Option<(String, u16)> {
        if address.starts_with('[') {
            // IPv6 format: [::1]:3000
            let bracket_end = address.find(']')?;
            if bracket_end + 1 >= address.len() || address.as_bytes()[bracket_end + 1] != b':' {
                return None;
            }
            let addr = strip_scope(&address[1..bracket_end]);
            let port_str = &address[bracket_end + 2..];
            let port: u16 = port_str.parse().ok()?;
            Some((format!("[{}]", addr), port))
        } else {
            // IPv4 format: 127.0.0.1:3000 or *:8080
            let last_colon = address.rfind(':')?;
            let addr = strip_scope(&address[..last_colon]);
            let port_str = &address[last_colon + 1..];
            let port: u16 = port_str.parse().ok()?;
            let addr = if addr.is_empty() { "*" } else { addr };
            Some((addr.to_string(), port))
        }
    }

    /// Split an lsof NAME column ("local->remote") into its endpoints.
    pub fn split_endpoints(name: &str) -> (&str, Option<&str>) {
        match name.split_once("->") {
            Some((local, remote)) => (local, Some(remote)),
            None => (name, None),
        }
    }
}

fn strip_scope(addr: &str) -> &str {
    match addr.find('%') {
        Some(idx) => &addr[..idx],
        None => addr,
    }
}
