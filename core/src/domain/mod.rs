//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod port;
mod process;
mod tunnel;

// Re-export all domain types
pub use port::{
    filter_ports, ConnectionStatus, PortFilter, PortRecord, Protocol, RawConnection,
    UNKNOWN_PROCESS,
};
pub use process::{
    describe_state, KillOutcome, KillResult, ProcessDetails, ProcessInfo, Signal,
};
pub use tunnel::{TunnelDefinition, TunnelStatus};
