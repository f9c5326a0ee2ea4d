//! PortPilot CLI - See what owns your ports and run SSH tunnels
//!
//! A command-line tool for listing sockets, killing processes
//! and supervising SSH local port-forwards.

mod commands;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Args, Parser, Subcommand};
use portpilot_core::{PortPilotEngine, SettingsStore};
use tracing_subscriber::EnvFilter;

use commands::Context;

#[derive(Parser)]
#[command(name = "portpilot")]
#[command(author, version, about = "See what owns your ports and run SSH tunnels")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Settings directory (default: ~/.portpilot)
    #[arg(long, global = true, value_name = "DIR")]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List sockets and the processes that own them
    #[command(alias = "ls")]
    List(ListArgs),

    /// Kill a process by PID
    Kill {
        pid: u32,

        /// Force kill (SIGKILL) without graceful shutdown
        #[arg(short, long)]
        force: bool,
    },

    /// Kill whatever owns a port
    KillPort {
        port: u16,

        /// Force kill (SIGKILL) without graceful shutdown
        #[arg(short, long)]
        force: bool,
    },

    /// Show details about a process
    Info { pid: u32 },

    /// Manage SSH tunnels
    Tunnel {
        #[command(subcommand)]
        action: TunnelAction,
    },

    /// Show effective settings
    Config,
}

#[derive(Args, Default)]
pub struct ListArgs {
    /// Filter by local port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Filter by process name (case-insensitive substring)
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Only sockets in LISTEN state
    #[arg(short, long)]
    pub listening: bool,

    /// Only TCP sockets
    #[arg(long, conflicts_with = "udp")]
    pub tcp: bool,

    /// Only UDP sockets
    #[arg(long)]
    pub udp: bool,

    /// Only ports from a preset in the settings (e.g. http, dev, db)
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,
}

#[derive(Subcommand)]
enum TunnelAction {
    /// List tunnel definitions
    #[command(alias = "ls")]
    List,

    /// Add a tunnel definition
    Add {
        name: String,

        /// Remote login user
        #[arg(long)]
        user: String,

        /// Remote host
        #[arg(long)]
        host: String,

        /// Local port to listen on
        #[arg(long)]
        local_port: u16,

        /// Port on the remote host's localhost
        #[arg(long)]
        remote_port: u16,

        /// Identity file passed to ssh -i
        #[arg(long, value_name = "PATH")]
        key: Option<String>,
    },

    /// Remove a tunnel definition
    #[command(alias = "rm")]
    Remove { name: String },

    /// Start a tunnel and supervise it until it exits (Ctrl-C stops it)
    Start { name: String },

    /// Stop a tunnel and clear its enabled flag
    Stop { name: String },

    /// Show tunnel status
    Status { name: Option<String> },

    /// Start every enabled tunnel and supervise them (Ctrl-C stops them)
    Up,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = match cli.config {
        Some(dir) => SettingsStore::with_dir(dir),
        None => SettingsStore::new().context("Could not locate the settings directory")?,
    };

    let mut ctx = Context {
        engine: PortPilotEngine::with_store(store),
        json: cli.json,
    };

    match cli.command {
        Some(Commands::List(args)) => commands::list::run(&ctx, &args)?,
        Some(Commands::Kill { pid, force }) => commands::kill::run(&ctx, pid, force)?,
        Some(Commands::KillPort { port, force }) => {
            commands::kill::run_port(&ctx, port, force)?
        }
        Some(Commands::Info { pid }) => commands::info::run(&ctx, pid)?,
        Some(Commands::Tunnel { action }) => match action {
            TunnelAction::List => commands::tunnel::list(&mut ctx)?,
            TunnelAction::Add {
                name,
                user,
                host,
                local_port,
                remote_port,
                key,
            } => commands::tunnel::add(
                &mut ctx,
                commands::tunnel::NewTunnel {
                    name,
                    user,
                    host,
                    local_port,
                    remote_port,
                    key,
                },
            )?,
            TunnelAction::Remove { name } => commands::tunnel::remove(&mut ctx, &name)?,
            TunnelAction::Start { name } => commands::tunnel::start(&mut ctx, &name)?,
            TunnelAction::Stop { name } => commands::tunnel::stop(&mut ctx, &name)?,
            TunnelAction::Status { name } => commands::tunnel::status(&mut ctx, name.as_deref())?,
            TunnelAction::Up => commands::tunnel::up(&mut ctx)?,
        },
        Some(Commands::Config) => commands::config::show(&ctx)?,
        // Default: list everything
        None => commands::list::run(&ctx, &ListArgs::default())?,
    }

    Ok(())
}
