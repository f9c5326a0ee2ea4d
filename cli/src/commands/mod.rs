//! Subcommand implementations.

pub mod config;
pub mod info;
pub mod kill;
pub mod list;
pub mod tunnel;

use portpilot_core::PortPilotEngine;
use serde::Serialize;

/// State shared by every subcommand.
pub struct Context {
    pub engine: PortPilotEngine,
    pub json: bool,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{}…", head)
    }
}
