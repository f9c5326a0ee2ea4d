//! Port-to-process inventory.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::adapters::{PortScanner, SystemProcessTable};
use crate::domain::{filter_ports, PortFilter, PortRecord, UNKNOWN_PROCESS};
use crate::ports::{ConnectionTable, ProcessTable};

/// Application service for port scanning operations.
///
/// `scan()` builds a snapshot of every inet socket and its owning process and
/// swaps it in whole. All queries read the last completed snapshot and never
/// rescan on their own.
pub struct PortInventory<C: ConnectionTable = PortScanner, P: ProcessTable = SystemProcessTable> {
    connections: C,
    processes: P,
    snapshot: RwLock<Vec<PortRecord>>,
}

impl PortInventory {
    /// Inventory over the host's connection and process tables.
    pub fn system() -> Self {
        Self::new(PortScanner::new(), SystemProcessTable::new())
    }
}

impl<C: ConnectionTable, P: ProcessTable> PortInventory<C, P> {
    pub fn new(connections: C, processes: P) -> Self {
        Self {
            connections,
            processes,
            snapshot: RwLock::new(Vec::new()),
        }
    }

    /// Refresh the snapshot and return it.
    ///
    /// Never fails: if the connection table can't be read the snapshot
    /// becomes empty.
    pub fn scan(&self) -> Vec<PortRecord> {
        let raw = match self.connections.connections() {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Connection table unavailable, snapshot is empty");
                Vec::new()
            }
        };

        // Several sockets usually share an owner
        let mut names: HashMap<u32, String> = HashMap::new();
        let mut records: Vec<PortRecord> = raw
            .into_iter()
            .map(|conn| {
                let name = match conn.pid {
                    Some(pid) => names
                        .entry(pid)
                        .or_insert_with(|| self.resolve_name(pid))
                        .clone(),
                    None => UNKNOWN_PROCESS.to_string(),
                };
                PortRecord::from_raw(conn, name)
            })
            .collect();

        records.sort_by(|a, b| {
            a.local_port
                .cmp(&b.local_port)
                .then(a.protocol.cmp(&b.protocol))
                .then(a.pid.cmp(&b.pid))
        });

        debug!(count = records.len(), "Scan complete");

        *self.snapshot.write() = records.clone();
        records
    }

    fn resolve_name(&self, pid: u32) -> String {
        self.processes.process_name(pid).unwrap_or_else(|e| {
            debug!(pid = pid, error = %e, "Could not resolve process name");
            UNKNOWN_PROCESS.to_string()
        })
    }

    /// Get all cached records.
    pub fn get_cached(&self) -> Vec<PortRecord> {
        self.snapshot.read().clone()
    }

    /// Records bound to `port` locally.
    pub fn find_by_port(&self, port: u16) -> Vec<PortRecord> {
        self.select(|r| r.local_port == port)
    }

    /// Records whose process name contains `name`, ignoring case.
    pub fn find_by_process(&self, name: &str) -> Vec<PortRecord> {
        let needle = name.to_lowercase();
        self.select(|r| r.process_name.to_lowercase().contains(&needle))
    }

    /// Records in LISTEN state.
    pub fn get_listening_ports(&self) -> Vec<PortRecord> {
        self.select(PortRecord::is_listening)
    }

    pub fn find_by_pid(&self, pid: u32) -> Vec<PortRecord> {
        self.select(|r| r.pid == pid)
    }

    /// Records matching `filter`.
    pub fn filter(&self, filter: &PortFilter) -> Vec<PortRecord> {
        filter_ports(&self.snapshot.read(), filter)
    }

    fn select(&self, pred: impl Fn(&PortRecord) -> bool) -> Vec<PortRecord> {
        self.snapshot
            .read()
            .iter()
            .filter(|r| pred(r))
            .cloned()
            .collect()
    }
}
