//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with external systems.

pub mod process;
pub mod scanner;
pub mod spawner;
pub mod store;

// Re-export main types for convenience
pub use process::SystemProcessTable;
pub use scanner::PortScanner;
pub use spawner::{ChildProcess, SystemSpawner};
pub use store::JsonTunnelStore;
