//! PortPilot Core Library
//!
//! Library for seeing which process owns which port and acting on it.
//! Provides functionality to:
//! - Snapshot every TCP/UDP socket together with its owning process
//! - Kill processes by PID (gracefully with escalation, or forcefully)
//! - Persist SSH local port-forward definitions and supervise the ssh processes
//! - Load user settings with defaults merged in
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - macOS: Uses `lsof` and `ps` commands
//! - Linux: Uses `ss` and `ps` commands
//! - Windows: not supported yet

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod engine;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{
    filter_ports, ConnectionStatus, KillOutcome, KillResult, PortFilter, PortRecord,
    ProcessDetails, ProcessInfo, Protocol, TunnelDefinition, TunnelStatus, UNKNOWN_PROCESS,
};

// Re-export other commonly used types
pub use adapters::{JsonTunnelStore, PortScanner, SystemProcessTable, SystemSpawner};
pub use application::{EscalationPolicy, PortInventory, ProcessTerminator, TunnelSupervisor};
pub use config::{Settings, SettingsStore, TimeoutSettings};
pub use engine::PortPilotEngine;
pub use error::{Error, Result};
