//! Application layer - Use case services.
//!
//! This module contains application services that orchestrate
//! domain logic and adapter interactions.
//!
//! Services are designed to be thin orchestrators that:
//! - Accept domain types as inputs
//! - Use ports (traits) for external dependencies
//! - Return domain types as outputs
//!
//! Every operation is synchronous. Waits are bounded polls of a
//! non-blocking probe, never an unbounded `wait()`.

mod escalation;
mod port_inventory;
mod terminator;
mod tunnel_supervisor;

use std::thread;
use std::time::{Duration, Instant};

use crate::error::Result;

pub use escalation::{escalate, Escalate, EscalationOutcome, EscalationPolicy};
pub use port_inventory::PortInventory;
pub use terminator::ProcessTerminator;
pub use tunnel_supervisor::TunnelSupervisor;

/// Interval between liveness probes while waiting.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll `done` until it reports `true` or `timeout` elapses.
///
/// Returns whether the condition was met. `done` is always checked at least
/// once, and once more at the deadline.
pub fn wait_until<F>(timeout: Duration, mut done: F) -> Result<bool>
where
    F: FnMut() -> Result<bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if done()? {
            return Ok(true);
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(false);
        }

        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}
