//! Process termination service.

use tracing::{debug, info};

use crate::adapters::SystemProcessTable;
use crate::domain::{KillOutcome, ProcessDetails, Signal, UNKNOWN_PROCESS};
use crate::error::{Error, Result};
use crate::ports::ProcessTable;

use super::escalation::{escalate, Escalate, EscalationOutcome, EscalationPolicy};

/// Terminates processes by PID and reports a classified outcome.
///
/// Nothing here returns `Err`: failures become [`KillOutcome`] values or
/// degraded [`ProcessDetails`].
pub struct ProcessTerminator<P: ProcessTable = SystemProcessTable> {
    processes: P,
    policy: EscalationPolicy,
}

impl ProcessTerminator {
    /// Terminator over the host's process table with the default 3s/2s budget.
    pub fn system() -> Self {
        Self::new(SystemProcessTable::new())
    }
}

impl<P: ProcessTable> ProcessTerminator<P> {
    pub fn new(processes: P) -> Self {
        Self::with_policy(processes, EscalationPolicy::kill_defaults())
    }

    pub fn with_policy(processes: P, policy: EscalationPolicy) -> Self {
        Self { processes, policy }
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    /// Terminate `pid`.
    ///
    /// With `force` the hard signal is sent right away and the call returns
    /// once it is delivered. Otherwise the graceful signal goes first and the
    /// call blocks for at most the policy's total budget.
    pub fn kill(&self, pid: u32, force: bool) -> KillOutcome {
        let name = match self.processes.process_name(pid) {
            Ok(name) => name,
            Err(e @ (Error::ProcessNotFound(_) | Error::PermissionDenied(_))) => {
                return classify(pid, e)
            }
            Err(e) => {
                debug!(pid = pid, error = %e, "Process name unavailable");
                UNKNOWN_PROCESS.to_string()
            }
        };

        info!(pid = pid, process = %name, force = force, "Terminating process");

        if force {
            return match self.processes.signal(pid, Signal::Hard) {
                Ok(()) => KillOutcome::success(&name, pid),
                Err(e) => classify(pid, e),
            };
        }

        let mut target = PidTarget {
            processes: &self.processes,
            pid,
        };

        match escalate(&mut target, &self.policy) {
            Ok(EscalationOutcome::Graceful) | Ok(EscalationOutcome::Forced) => {
                KillOutcome::success(&name, pid)
            }
            Ok(EscalationOutcome::Survived) => {
                classify(pid, Error::Timeout(self.policy.hard_timeout))
            }
            Err(e) => classify(pid, e),
        }
    }

    /// Whether `pid` exists and has not exited.
    pub fn is_running(&self, pid: u32) -> bool {
        self.processes.is_alive(pid)
    }

    /// Best-effort attribute snapshot of `pid`.
    pub fn get_process_info(&self, pid: u32) -> ProcessDetails {
        match self.processes.lookup(pid) {
            Ok(info) => ProcessDetails::Available(info),
            Err(e) => {
                debug!(pid = pid, error = %e, "Process info unavailable");
                ProcessDetails::unavailable(pid)
            }
        }
    }
}

fn classify(pid: u32, error: Error) -> KillOutcome {
    match error {
        Error::ProcessNotFound(_) => KillOutcome::not_found(pid),
        Error::PermissionDenied(_) => KillOutcome::access_denied(pid),
        other => KillOutcome::error(pid, other),
    }
}

struct PidTarget<'a, P> {
    processes: &'a P,
    pid: u32,
}

impl<P: ProcessTable> Escalate for PidTarget<'_, P> {
    fn send(&mut self, signal: Signal) -> Result<()> {
        match self.processes.signal(self.pid, signal) {
            // Exited between the last poll and the hard signal
            Err(Error::ProcessNotFound(_)) if signal == Signal::Hard => Ok(()),
            other => other,
        }
    }

    fn has_exited(&mut self) -> Result<bool> {
        Ok(!self.processes.is_alive(self.pid))
    }
}
