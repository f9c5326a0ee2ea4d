//! Process table port (interface).

use crate::domain::{ProcessInfo, Signal};
use crate::error::Result;

/// Port for inspecting and signalling processes by PID.
///
/// Lookups and signals fail with `Error::ProcessNotFound` when the PID is
/// absent and `Error::PermissionDenied` when the caller lacks privilege.
pub trait ProcessTable: Send + Sync {
    /// Name of the process (cheaper than a full [`ProcessTable::lookup`]).
    fn process_name(&self, pid: u32) -> Result<String>;

    /// Attribute snapshot of the process.
    fn lookup(&self, pid: u32) -> Result<ProcessInfo>;

    /// Deliver a signal. Returns once the OS accepted it.
    fn signal(&self, pid: u32, signal: Signal) -> Result<()>;

    /// Whether the process exists and has not exited (zombies count as exited).
    fn is_alive(&self, pid: u32) -> bool;
}
