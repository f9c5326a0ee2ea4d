//! Info command - show process details.

use anyhow::{bail, Result};
use chrono::Local;
use portpilot_core::ProcessDetails;

use super::{print_json, Context};

pub fn run(ctx: &Context, pid: u32) -> Result<()> {
    let details = ctx.engine.terminator().get_process_info(pid);

    if ctx.json {
        print_json(&details)?;
    }

    let info = match &details {
        ProcessDetails::Available(info) => info,
        ProcessDetails::Unavailable { pid, error } => bail!("PID {}: {}", pid, error),
    };

    if ctx.json {
        return Ok(());
    }

    let started = info
        .create_time
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    println!("PID:      {}", info.pid);
    println!("Name:     {}", info.name);
    if info.is_zombie() {
        println!("Status:   {} (exited, not yet reaped by its parent)", info.status);
    } else {
        println!("Status:   {}", info.status);
    }
    println!("User:     {}", info.username);
    println!("Started:  {}", started);
    println!("Command:  {}", info.cmdline.join(" "));

    ctx.engine.refresh();
    let owned = ctx.engine.inventory().find_by_pid(pid);
    if !owned.is_empty() {
        println!("Sockets:");
        for r in &owned {
            println!(
                "  {} {}:{} {}",
                r.protocol.as_str(),
                r.local_address,
                r.local_port,
                r.status.label()
            );
        }
    }

    Ok(())
}
