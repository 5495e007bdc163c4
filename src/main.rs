use anyhow::Context;
use clap::Parser;
use mediastow::{
    AppError, BatchRunner, Cli, Commands, Config, ItemProcessor, RunLockGuard, RunMode,
    RunSummary, logging,
};
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Missing roots, bad configuration or a held lock
const EXIT_FATAL: i32 = 2;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process { config, run } => {
            init_logging(&config);
            match run_pass(&config, RunMode::from_run_flag(run)) {
                Ok(summary) => process::exit(summary.exit_code()),
                Err(e) => {
                    tracing::error!("ERROR {e:#}");
                    process::exit(EXIT_FATAL);
                }
            }
        }
        Commands::Daemon {
            config,
            run,
            interval,
        } => {
            init_logging(&config);
            run_daemon(&config, RunMode::from_run_flag(run), interval);
        }
    }
}

/// Log to the configured directory when the config is readable, else console only
fn init_logging(config_path: &Path) {
    let log_dir = Config::from_file(config_path)
        .ok()
        .map(|config| config.paths.log_dir)
        .filter(|dir| dir.parent().is_some_and(Path::exists));

    if let Err(e) = logging::init(log_dir.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }
}

fn run_pass(config_path: &Path, mode: RunMode) -> anyhow::Result<RunSummary> {
    tracing::debug!("Loading configuration from: {}", config_path.display());
    let config = Config::from_file(config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            config_path.display()
        )
    })?;

    let missing = config.paths.missing_roots();
    for path in &missing {
        tracing::error!("ERROR missing required path: {}", path.display());
    }
    if let Some(path) = missing.into_iter().next() {
        return Err(AppError::MissingRoot { path }.into());
    }

    let _lock = RunLockGuard::acquire(&config.paths.source_roots())?;

    let processor = ItemProcessor::new(&config, mode);
    Ok(BatchRunner::new(&config, processor).run())
}

fn run_daemon(config_path: &Path, mode: RunMode, interval: u64) {
    tracing::info!(
        "Starting daemon mode (interval: {}s, config: {})",
        interval,
        config_path.display()
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received interrupt signal, shutting down gracefully...");
        r.store(false, Ordering::SeqCst);
    }) {
        tracing::warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let mut pass = 1;

    while running.load(Ordering::SeqCst) {
        tracing::info!("===== Daemon pass #{pass} =====");

        match run_pass(config_path, mode) {
            Ok(summary) if summary.has_errors() => {
                tracing::warn!("Pass finished with {} irregular item(s)", summary.error);
            }
            Ok(_) => {}
            Err(e) => {
                // Keep going: the next pass may find the roots mounted again
                tracing::error!("Pass failed: {e:#}");
            }
        }

        if !running.load(Ordering::SeqCst) {
            break;
        }

        tracing::info!("Sleeping for {interval} seconds until next pass...");
        for _ in 0..interval {
            if !running.load(Ordering::SeqCst) {
                break;
            }
            std::thread::sleep(Duration::from_secs(1));
        }

        pass += 1;
    }

    tracing::info!("Daemon stopped gracefully");
}
