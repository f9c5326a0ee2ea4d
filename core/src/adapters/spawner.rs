//! Subprocess spawner backed by `std::process`.

use std::process::{Child, Command, Stdio};

use tracing::debug;

use crate::error::{Error, Result};
use crate::ports::{ProcessSpawner, SupervisedProcess};

/// Spawns subprocesses with stdin, stdout and stderr detached.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSpawner;

impl SystemSpawner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSpawner for SystemSpawner {
    type Child = ChildProcess;

    fn spawn(&self, argv: &[String]) -> Result<ChildProcess> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::Spawn("empty command line".to_string()))?;

        // Nothing reads the pipes, so a chatty child must not block on them
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Spawn(format!("Failed to start {}: {}", program, e)))?;

        debug!(pid = child.id(), program = %program, "Spawned subprocess");

        Ok(ChildProcess { child })
    }
}

/// Owned handle to a child spawned by [`SystemSpawner`].
#[derive(Debug)]
pub struct ChildProcess {
    child: Child,
}

impl SupervisedProcess for ChildProcess {
    fn id(&self) -> u32 {
        self.child.id()
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let pid = i32::try_from(self.child.id())
            .map_err(|_| Error::ProcessNotFound(self.child.id()))?;

        match kill(Pid::from_raw(pid), Signal::SIGTERM) {
            // Already gone but not yet reaped
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(errno) => Err(Error::Io(errno.into())),
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> Result<()> {
        self.kill()
    }

    fn kill(&mut self) -> Result<()> {
        match self.child.kill() {
            Ok(()) => Ok(()),
            // Reported when the child has already been reaped
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn has_exited(&mut self) -> Result<bool> {
        Ok(self.child.try_wait()?.is_some())
    }
}
