//! Graceful-then-forced stop shared by process kills and tunnel stops.

use std::time::Duration;

use tracing::debug;

use crate::config::TimeoutSettings;
use crate::domain::Signal;
use crate::error::Result;

use super::wait_until;

/// Something that can be signalled and polled for exit.
pub trait Escalate {
    fn send(&mut self, signal: Signal) -> Result<()>;

    /// Non-blocking. A zombie counts as exited.
    fn has_exited(&mut self) -> Result<bool>;
}

/// Wait budgets for [`escalate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    pub graceful_timeout: Duration,
    pub hard_timeout: Duration,
}

impl EscalationPolicy {
    pub fn new(graceful_timeout: Duration, hard_timeout: Duration) -> Self {
        Self {
            graceful_timeout,
            hard_timeout,
        }
    }

    /// 3s after SIGTERM, 2s after SIGKILL.
    pub fn kill_defaults() -> Self {
        Self::new(Duration::from_secs(3), Duration::from_secs(2))
    }

    /// 5s after SIGTERM, 2s after SIGKILL.
    pub fn tunnel_defaults() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(2))
    }

    /// Upper bound on how long [`escalate`] blocks, excluding the final poll.
    pub fn total(&self) -> Duration {
        self.graceful_timeout + self.hard_timeout
    }
}

impl From<TimeoutSettings> for EscalationPolicy {
    fn from(t: TimeoutSettings) -> Self {
        Self::new(t.graceful(), t.hard())
    }
}

/// How an escalated stop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationOutcome {
    /// Exited within the graceful window.
    Graceful,
    /// Exited after the hard signal.
    Forced,
    /// Still alive after both windows.
    Survived,
}

impl EscalationOutcome {
    pub fn exited(&self) -> bool {
        !matches!(self, EscalationOutcome::Survived)
    }
}

/// Send the graceful signal, wait, then escalate to the hard signal and wait again.
pub fn escalate<T: Escalate + ?Sized>(
    target: &mut T,
    policy: &EscalationPolicy,
) -> Result<EscalationOutcome> {
    target.send(Signal::Graceful)?;
    if wait_until(policy.graceful_timeout, || target.has_exited())? {
        return Ok(EscalationOutcome::Graceful);
    }

    debug!(
        waited_ms = policy.graceful_timeout.as_millis() as u64,
        "Graceful stop timed out, escalating"
    );

    target.send(Signal::Hard)?;
    if wait_until(policy.hard_timeout, || target.has_exited())? {
        return Ok(EscalationOutcome::Forced);
    }

    Ok(EscalationOutcome::Survived)
}
