//! Process table adapters.

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::UnixProcessTable as SystemProcessTable;

#[cfg(not(unix))]
pub use fallback::UnsupportedProcessTable as SystemProcessTable;

#[cfg(not(unix))]
mod fallback {
    use crate::domain::{ProcessInfo, Signal};
    use crate::error::{Error, Result};
    use crate::ports::ProcessTable;

    /// Placeholder for platforms without POSIX signals.
    #[derive(Debug, Default)]
    pub struct UnsupportedProcessTable;

    impl UnsupportedProcessTable {
        pub fn new() -> Self {
            Self
        }
    }

    fn unsupported<T>() -> Result<T> {
        Err(Error::UnsupportedPlatform(
            "process control requires a Unix host".to_string(),
        ))
    }

    impl ProcessTable for UnsupportedProcessTable {
        fn process_name(&self, _pid: u32) -> Result<String> {
            unsupported()
        }

        fn lookup(&self, _pid: u32) -> Result<ProcessInfo> {
            unsupported()
        }

        fn signal(&self, _pid: u32, _signal: Signal) -> Result<()> {
            unsupported()
        }

        fn is_alive(&self, _pid: u32) -> bool {
            false
        }
    }
}
