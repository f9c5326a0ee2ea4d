//! List command - show sockets and their owners.

use anyhow::Result;
use portpilot_core::{filter_ports, PortFilter, PortRecord, Protocol};

use super::{print_json, truncate, Context};
use crate::ListArgs;

fn build_filter(ctx: &Context, args: &ListArgs) -> Result<PortFilter> {
    let mut filter = match &args.preset {
        Some(preset) => ctx.engine.preset_filter(preset)?,
        None => PortFilter::new(),
    };

    if let Some(port) = args.port {
        filter = filter.with_port_range(Some(port), Some(port));
    }
    if args.tcp {
        filter = filter.with_protocol(Protocol::Tcp);
    }
    if args.udp {
        filter = filter.with_protocol(Protocol::Udp);
    }

    Ok(filter.with_listening_only(args.listening))
}

pub fn run(ctx: &Context, args: &ListArgs) -> Result<()> {
    let filter = build_filter(ctx, args)?;

    ctx.engine.refresh();
    let inventory = ctx.engine.inventory();
    let records = match &args.name {
        Some(name) => filter_ports(&inventory.find_by_process(name), &filter),
        None => inventory.filter(&filter),
    };

    if ctx.json {
        return print_json(&records);
    }

    if records.is_empty() {
        println!("No matching sockets found.");
        return Ok(());
    }

    print_table(&records);
    println!("\nTotal: {} sockets", records.len());
    Ok(())
}

fn print_table(records: &[PortRecord]) {
    println!(
        "{:<5} {:<28} {:<24} {:<12} {:<8} PROCESS",
        "PROTO", "LOCAL", "REMOTE", "STATUS", "PID"
    );
    println!("{}", "-".repeat(96));

    for r in records {
        let local = format!("{}:{}", r.local_address, r.local_port);
        let pid = if r.pid == 0 {
            "-".to_string()
        } else {
            r.pid.to_string()
        };

        println!(
            "{:<5} {:<28} {:<24} {:<12} {:<8} {}",
            r.protocol.as_str(),
            truncate(&local, 28),
            truncate(&r.remote_endpoint(), 24),
            r.status.label(),
            pid,
            truncate(&r.process_name, 24)
        );
    }
}
