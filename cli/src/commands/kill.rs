//! Kill commands - terminate by PID or by port.

use anyhow::{bail, Result};

use super::{print_json, Context};

pub fn run(ctx: &Context, pid: u32, force: bool) -> Result<()> {
    let outcome = ctx.engine.kill_process(pid, force);

    if ctx.json {
        print_json(&outcome)?;
    } else if outcome.result.is_success() {
        println!("{}", outcome.message);
    }

    if !outcome.result.is_success() {
        bail!("{}", outcome.message);
    }
    Ok(())
}

pub fn run_port(ctx: &Context, port: u16, force: bool) -> Result<()> {
    let outcomes = ctx.engine.kill_port(port, force);

    if ctx.json {
        print_json(&outcomes)?;
    }

    if outcomes.is_empty() {
        bail!("No process found on port {}", port);
    }

    let failed = outcomes.iter().filter(|o| !o.result.is_success()).count();
    if !ctx.json {
        for outcome in &outcomes {
            if outcome.result.is_success() {
                println!("{}", outcome.message);
            } else {
                eprintln!("{}", outcome.message);
            }
        }
    }

    if failed > 0 {
        bail!(
            "Failed to kill {} of {} processes on port {}",
            failed,
            outcomes.len(),
            port
        );
    }
    Ok(())
}
