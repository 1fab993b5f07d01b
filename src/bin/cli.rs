//! CLI binary for the session bridge.

use clap::{Args, Parser, Subcommand};
use schedule_feed::HttpFetcher;
use session_bridge::host::{DisplayHost, FileHost, properties};
use session_bridge::{FileStore, SyncConfig, SyncOrchestrator, TickReport};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Show the current and next conference session in text files.
#[derive(Parser)]
#[command(name = "session-bridge", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory for the cached schedule and fetch time.
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run one sync cycle and print the report.
    Tick(TargetArgs),

    /// Run sync cycles on a timer until Ctrl+C.
    Run {
        /// Seconds between ticks.
        #[arg(long, default_value_t = 1)]
        every: u64,

        #[command(flatten)]
        targets: TargetArgs,
    },

    /// Print the current and next session from the cached schedule.
    Resolve {
        /// Local time to resolve at (`YYYY-MM-DDTHH:MM:SS`, in the
        /// configured timezone) instead of now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Print the settings form description as JSON.
    Properties {
        /// Directory whose `.txt` files are offered as display targets.
        #[arg(long)]
        targets_dir: Option<PathBuf>,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Directory whose `<name>.txt` files are the display targets.
    #[arg(long, default_value = ".")]
    targets_dir: PathBuf,

    /// Create missing files for the configured targets.
    #[arg(long)]
    create_targets: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("session_bridge=info,schedule_feed=info")
        }))
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(SyncConfig::default_config_path);
    let config = if config_path.is_file() {
        SyncConfig::from_file(&config_path)?
    } else if cli.config.is_some() {
        anyhow::bail!("config file {} does not exist", config_path.display());
    } else {
        SyncConfig::default()
    };
    let store = match cli.state_dir {
        Some(dir) => FileStore::new(dir),
        None => FileStore::default_location(),
    };

    match cli.command {
        Command::Tick(targets) => run_once(config, store, &targets),
        Command::Run { every, targets } => run_loop(config, store, &targets, every).await,
        Command::Resolve { at } => print_view(config, store, at),
        Command::Properties { targets_dir } => print_properties(targets_dir),
    }
}

fn orchestrator(
    config: SyncConfig,
    store: FileStore,
) -> anyhow::Result<SyncOrchestrator<HttpFetcher, FileStore>> {
    if let Err(e) = config.validate() {
        tracing::warn!(error = %e, "configuration has problems");
    }
    let fetcher = HttpFetcher::new(&config.feed)?;
    Ok(SyncOrchestrator::new(config, fetcher, store))
}

fn file_host(config: &SyncConfig, args: &TargetArgs) -> anyhow::Result<FileHost> {
    let host = FileHost::new(&args.targets_dir);
    if args.create_targets {
        host.ensure_targets(config.targets())?;
    }
    Ok(host)
}

fn run_once(config: SyncConfig, store: FileStore, args: &TargetArgs) -> anyhow::Result<()> {
    let mut host = file_host(&config, args)?;
    let mut orchestrator = orchestrator(config, store)?;
    let report = orchestrator.tick(&mut host);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if report == TickReport::Disabled {
        eprintln!("sync is disabled; set `enabled = true` in the config file");
    }
    Ok(())
}

async fn run_loop(
    config: SyncConfig,
    store: FileStore,
    args: &TargetArgs,
    every: u64,
) -> anyhow::Result<()> {
    let mut host = file_host(&config, args)?;
    let mut orchestrator = orchestrator(config, store)?;
    let mut interval = tokio::time::interval(Duration::from_secs(every.max(1)));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!(every_secs = every.max(1), "sync loop started; press Ctrl+C to stop");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = tokio::task::block_in_place(|| orchestrator.tick(&mut host));
                tracing::debug!(?report, "tick finished");
            }
            _ = &mut ctrl_c => {
                info!("received Ctrl+C, shutting down...");
                break;
            }
        }
    }
    Ok(())
}

fn print_view(mut config: SyncConfig, store: FileStore, at: Option<String>) -> anyhow::Result<()> {
    if at.is_some() {
        config.override_datetime = at;
    }
    let room = config.room_name.clone();
    let view = orchestrator(config, store)?.resolve_now()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "room": room, "view": view }))?
    );
    Ok(())
}

fn print_properties(targets_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let host: Box<dyn DisplayHost> = match targets_dir {
        Some(dir) => Box::new(FileHost::new(dir)),
        None => Box::new(session_bridge::host::MemoryHost::default()),
    };
    println!("{}", serde_json::to_string_pretty(&properties(host.as_ref()))?);
    Ok(())
}
