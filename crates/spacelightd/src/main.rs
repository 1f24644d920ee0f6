use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use spacelight_core::{DaemonConfig, RunFlag};
use tokio::signal::unix::{signal, SignalKind};

mod pidfile;

/// Daemon for controlling a WLED light fixture with a SpaceNav controller.
#[derive(Parser, Debug)]
#[command(name = "spacelightd")]
#[command(about = "SpaceNav to WLED bridge daemon")]
struct Args {
    /// Action to perform.
    #[arg(value_enum)]
    action: Action,

    /// Log file location.
    #[arg(short, long, default_value = "spacelightd.log")]
    log: PathBuf,

    /// IP address or hostname of the WLED device.
    #[arg(long = "ip_address", default_value = DaemonConfig::DEFAULT_FIXTURE_ADDRESS)]
    ip_address: String,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Action {
    Start,
    Stop,
}

fn main() -> Result<()> {
    let args = Args::parse();
    match args.action {
        Action::Start => start(&args),
        Action::Stop => stop(),
    }
}

fn start(args: &Args) -> Result<()> {
    let pid_path = pidfile::default_path();
    if let Some(pid) = pidfile::read_live_pid(&pid_path)? {
        anyhow::bail!("spacelightd is already running with PID {pid}");
    }

    init_logging(&args.log, args.verbose)?;
    pidfile::write(&pid_path)?;

    let run_flag = RunFlag::new();
    let config = DaemonConfig::new(args.ip_address.clone());

    let runtime = tokio::runtime::Runtime::new().context("starting the async runtime")?;
    let result = runtime.block_on(async {
        install_signal_handlers(run_flag.clone())?;
        spacelight_core::run(config, run_flag).await
    });

    pidfile::remove(&pid_path);
    result
}

fn stop() -> Result<()> {
    let pid_path = pidfile::default_path();
    match pidfile::read(&pid_path)? {
        None => println!("PID file does not exist. Daemon may not be running."),
        Some(pid) => {
            if pidfile::is_alive(pid) {
                pidfile::terminate(pid)?;
                println!("Daemon stopped successfully.");
            } else {
                println!("PID file exists but no process is running. Removing stale PID file.");
            }
            pidfile::remove(&pid_path);
        }
    }
    Ok(())
}

/// Route log lines into the daemon's log file. `--verbose` turns on the
/// debug-level event chatter.
fn init_logging(path: &Path, verbose: bool) -> Result<()> {
    let file = File::options()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Clearing the run flag from a signal is the only path that stops the
/// loops; everything else retries forever.
fn install_signal_handlers(run_flag: RunFlag) -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate()).context("installing the SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("installing the SIGINT handler")?;
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => log::info!("Received SIGTERM, shutting down"),
            _ = sigint.recv() => log::info!("Received SIGINT, shutting down"),
        }
        run_flag.shutdown();
    });
    Ok(())
}
