//! Tunnel commands - manage and run SSH port-forwards.
//!
//! Running tunnels belong to the process that started them, so `start` and
//! `up` stay in the foreground and poll until the tunnels exit.

use std::thread;

use anyhow::{bail, Result};
use portpilot_core::{Error, TunnelDefinition, TunnelStatus};
use serde::Serialize;

use super::{print_json, Context};

/// Fields of `tunnel add`.
pub struct NewTunnel {
    pub name: String,
    pub user: String,
    pub host: String,
    pub local_port: u16,
    pub remote_port: u16,
    pub key: Option<String>,
}

#[derive(Serialize)]
struct TunnelRow {
    #[serde(flatten)]
    definition: TunnelDefinition,
    status: TunnelStatus,
}

fn require(ctx: &Context, name: &str) -> Result<TunnelDefinition> {
    ctx.engine
        .tunnels()
        .get(name)
        .cloned()
        .ok_or_else(|| Error::TunnelNotFound(name.to_string()).into())
}

fn rows(ctx: &mut Context) -> Vec<TunnelRow> {
    let statuses = ctx.engine.tunnel_statuses();
    let tunnels = ctx.engine.tunnels();
    statuses
        .into_iter()
        .filter_map(|(name, status)| {
            tunnels.get(&name).cloned().map(|definition| TunnelRow { definition, status })
        })
        .collect()
}

pub fn list(ctx: &mut Context) -> Result<()> {
    let rows = rows(ctx);

    if ctx.json {
        return print_json(&rows);
    }

    if rows.is_empty() {
        println!("No tunnels defined.");
        return Ok(());
    }

    println!(
        "{:<16} {:<32} {:<8} {:<8} {:<8} KEY",
        "NAME", "DESTINATION", "LOCAL", "REMOTE", "ENABLED"
    );
    println!("{}", "-".repeat(90));

    for row in &rows {
        let def = &row.definition;
        println!(
            "{:<16} {:<32} {:<8} {:<8} {:<8} {}",
            def.name,
            def.destination(),
            def.local_port,
            def.remote_port,
            if def.enabled { "yes" } else { "no" },
            def.ssh_key.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub fn add(ctx: &mut Context, new: NewTunnel) -> Result<()> {
    let mut def = TunnelDefinition::new(
        new.name,
        new.user,
        new.host,
        new.local_port,
        new.remote_port,
    );
    def.ssh_key = new.key;

    let name = def.name.clone();
    if !ctx.engine.tunnels_mut().add(def)? {
        bail!("Tunnel '{}' already exists", name);
    }

    println!("Added tunnel '{}'", name);
    Ok(())
}

pub fn remove(ctx: &mut Context, name: &str) -> Result<()> {
    if !ctx.engine.tunnels_mut().remove(name)? {
        return Err(Error::TunnelNotFound(name.to_string()).into());
    }

    println!("Removed tunnel '{}'", name);
    Ok(())
}

pub fn start(ctx: &mut Context, name: &str) -> Result<()> {
    let def = require(ctx, name)?;

    if ctx.engine.tunnels_mut().start(name)? != TunnelStatus::Running {
        bail!("Failed to start tunnel '{}'", name);
    }

    println!(
        "Tunnel '{}' running: localhost:{} -> {}:{} (Ctrl-C to stop)",
        name,
        def.local_port,
        def.remote_host,
        def.remote_port
    );

    supervise(ctx, vec![name.to_string()])
}

pub fn stop(ctx: &mut Context, name: &str) -> Result<()> {
    let mut def = require(ctx, name)?;
    let tunnels = ctx.engine.tunnels_mut();

    tunnels.stop(name)?;

    // Nothing ran in this process, but a later `up` should skip it
    if def.enabled {
        def.enabled = false;
        tunnels.update(name, def)?;
    }

    println!("Tunnel '{}' stopped", name);
    Ok(())
}

pub fn status(ctx: &mut Context, name: Option<&str>) -> Result<()> {
    let rows: Vec<TunnelRow> = match name {
        Some(name) => {
            let definition = require(ctx, name)?;
            let status = ctx.engine.tunnels_mut().status(name);
            vec![TunnelRow { definition, status }]
        }
        None => rows(ctx),
    };

    if ctx.json {
        return print_json(&rows);
    }

    for row in &rows {
        let enabled = if row.definition.enabled { " (enabled)" } else { "" };
        println!("{:<16} {}{}", row.definition.name, row.status, enabled);
    }
    Ok(())
}

pub fn up(ctx: &mut Context) -> Result<()> {
    let started = ctx.engine.tunnels_mut().start_enabled();

    if started.is_empty() {
        println!("No enabled tunnels.");
        return Ok(());
    }

    let mut running = Vec::new();
    for (name, status) in started {
        println!("{:<16} {}", name, status);
        if status == TunnelStatus::Running {
            running.push(name);
        }
    }

    if running.is_empty() {
        bail!("No tunnel could be started");
    }

    supervise(ctx, running)
}

/// Poll `names` every refresh interval until none is running.
fn supervise(ctx: &mut Context, mut names: Vec<String>) -> Result<()> {
    let interval = ctx.engine.settings().refresh_interval();
    let mut exited = Vec::new();

    while !names.is_empty() {
        thread::sleep(interval);

        let tunnels = ctx.engine.tunnels_mut();
        names.retain(|name| match tunnels.status(name) {
            TunnelStatus::Running => true,
            status => {
                eprintln!("Tunnel '{}' exited ({})", name, status);
                exited.push(name.clone());
                false
            }
        });
    }

    bail!("Tunnel(s) exited: {}", exited.join(", "))
}
