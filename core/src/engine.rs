//! PortPilot Engine - facade for front-ends.
//!
//! Wires the inventory, terminator and tunnel supervisor to the host
//! adapters using one loaded [`Settings`] value.

use std::collections::BTreeSet;

use tracing::info;

use crate::adapters::{JsonTunnelStore, PortScanner, SystemProcessTable, SystemSpawner};
use crate::application::{PortInventory, ProcessTerminator, TunnelSupervisor};
use crate::config::{Settings, SettingsStore};
use crate::domain::{KillOutcome, PortFilter, PortRecord, TunnelStatus};
use crate::error::{Error, Result};

/// The main PortPilot engine.
///
/// Front-ends call [`PortPilotEngine::refresh`] on their own schedule
/// (`Settings::refresh_interval_ms` is the suggested period) and read the
/// cached snapshot in between.
pub struct PortPilotEngine {
    settings: Settings,
    store: SettingsStore,
    inventory: PortInventory,
    terminator: ProcessTerminator,
    tunnels: TunnelSupervisor,
}

impl PortPilotEngine {
    /// Create an engine from the settings in `~/.portpilot`.
    ///
    /// Enabled tunnels are started right away when `tunnel_auto_start` is set.
    pub fn new() -> Result<Self> {
        let mut engine = Self::with_store(SettingsStore::new()?);
        engine.auto_start();
        Ok(engine)
    }

    /// Create an engine from the settings in `store` without starting anything.
    pub fn with_store(store: SettingsStore) -> Self {
        let settings = store.load();

        let inventory = PortInventory::new(PortScanner::new(), SystemProcessTable::new());
        let terminator = ProcessTerminator::with_policy(
            SystemProcessTable::new(),
            settings.kill_timeouts.into(),
        );
        let tunnels = TunnelSupervisor::new(
            JsonTunnelStore::with_path(store.tunnels_path(&settings)),
            SystemSpawner::new(),
        )
        .with_ssh_program(settings.ssh_program.clone())
        .with_policy(settings.tunnel_stop_timeouts.into());

        Self {
            settings,
            store,
            inventory,
            terminator,
            tunnels,
        }
    }

    /// Start enabled tunnels if `tunnel_auto_start` is set.
    pub fn auto_start(&mut self) -> Vec<(String, TunnelStatus)> {
        if !self.settings.tunnel_auto_start {
            return Vec::new();
        }

        let started = self.tunnels.start_enabled();
        info!(count = started.len(), "Auto-started enabled tunnels");
        started
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_store(&self) -> &SettingsStore {
        &self.store
    }

    // MARK: - Ports

    /// Rescan and return the new snapshot.
    pub fn refresh(&self) -> Vec<PortRecord> {
        self.inventory.scan()
    }

    pub fn inventory(&self) -> &PortInventory {
        &self.inventory
    }

    /// Filter for a named preset from `port_filters`.
    pub fn preset_filter(&self, name: &str) -> Result<PortFilter> {
        self.settings
            .preset(name)
            .map(|ports| PortFilter::new().with_ports(ports.iter().copied()))
            .ok_or_else(|| Error::Config(format!("Unknown port preset '{}'", name)))
    }

    // MARK: - Process Management

    pub fn terminator(&self) -> &ProcessTerminator {
        &self.terminator
    }

    /// Kill a process by PID.
    pub fn kill_process(&self, pid: u32, force: bool) -> KillOutcome {
        self.terminator.kill(pid, force)
    }

    /// Kill every process that owns a socket on `port`.
    ///
    /// Rescans first so the owners are current. Sockets whose owner is hidden
    /// (PID 0) are skipped. An empty result means nothing owned the port.
    pub fn kill_port(&self, port: u16, force: bool) -> Vec<KillOutcome> {
        self.inventory.scan();

        let pids: BTreeSet<u32> = self
            .inventory
            .find_by_port(port)
            .into_iter()
            .map(|r| r.pid)
            .filter(|pid| *pid != 0)
            .collect();

        pids.into_iter()
            .map(|pid| self.terminator.kill(pid, force))
            .collect()
    }

    // MARK: - Tunnels

    pub fn tunnels(&self) -> &TunnelSupervisor {
        &self.tunnels
    }

    pub fn tunnels_mut(&mut self) -> &mut TunnelSupervisor {
        &mut self.tunnels
    }

    /// Status of every defined tunnel, ordered by name.
    pub fn tunnel_statuses(&mut self) -> Vec<(String, TunnelStatus)> {
        let names: Vec<String> = self.tunnels.get_all().into_iter().map(|d| d.name).collect();
        names
            .into_iter()
            .map(|name| {
                let status = self.tunnels.status(&name);
                (name, status)
            })
            .collect()
    }

    /// Stop every tunnel this engine started.
    pub fn shutdown(&mut self) {
        self.tunnels.stop_all();
    }
}
