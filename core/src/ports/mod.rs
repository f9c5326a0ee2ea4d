//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with external systems. Implementations live in `adapters`.

mod config;
mod killer;
mod scanner;
mod spawner;

pub use config::TunnelRepository;
pub use killer::ProcessTable;
pub use scanner::ConnectionTable;
pub use spawner::{ProcessSpawner, SupervisedProcess};
