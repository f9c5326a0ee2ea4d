//! Subprocess spawner port (interface).

use std::time::Duration;

use crate::error::Result;

/// Port for creating supervised subprocesses.
pub trait ProcessSpawner: Send + Sync {
    type Child: SupervisedProcess;

    /// Spawn `argv[0]` with the remaining arguments, detached from our stdio.
    fn spawn(&self, argv: &[String]) -> Result<Self::Child>;
}

/// An owned handle to a live subprocess.
pub trait SupervisedProcess: Send {
    /// OS process ID.
    fn id(&self) -> u32;

    /// Request termination (SIGTERM).
    fn terminate(&mut self) -> Result<()>;

    /// Force termination (SIGKILL).
    fn kill(&mut self) -> Result<()>;

    /// Non-blocking poll. `true` once the process has exited and been reaped.
    fn has_exited(&mut self) -> Result<bool>;

    /// Block up to `timeout` for the process to exit. `true` if it did.
    fn wait_timeout(&mut self, timeout: Duration) -> Result<bool> {
        crate::application::wait_until(timeout, || self.has_exited())
    }
}
