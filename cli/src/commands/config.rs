//! Config command - show effective settings.

use anyhow::Result;
use serde_json::json;

use super::{print_json, Context};

pub fn show(ctx: &Context) -> Result<()> {
    let store = ctx.engine.settings_store();
    let settings = ctx.engine.settings();
    let settings_path = store.settings_path();
    let tunnels_path = store.tunnels_path(settings);

    if ctx.json {
        return print_json(&json!({
            "settings_path": settings_path,
            "tunnels_path": tunnels_path,
            "settings": settings,
        }));
    }

    println!("Settings file: {}", settings_path.display());
    println!("Tunnel store:  {}", tunnels_path.display());
    println!();
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}
