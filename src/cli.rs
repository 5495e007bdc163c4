use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Find default config path with priority:
/// 1. /etc/mediastow/config.yaml (system-wide, preferred)
/// 2. ~/.config/mediastow/config.yaml (user-specific)
/// 3. Fallback to /etc even if it doesn't exist
pub fn default_config_path() -> PathBuf {
    let etc_path = PathBuf::from("/etc/mediastow/config.yaml");

    if etc_path.exists() {
        return etc_path;
    }

    if let Some(config_dir) = dirs::config_dir() {
        let user_path = config_dir.join("mediastow/config.yaml");
        if user_path.exists() {
            return user_path;
        }
    }

    etc_path
}

#[derive(Parser)]
#[command(name = "mediastow")]
#[command(version)]
#[command(about = "Sort completed downloads into the TV and movie libraries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process every folder in the staging roots once
    Process {
        /// Path to configuration file
        #[arg(short, long, value_name = "FILE", default_value_os_t = default_config_path())]
        config: PathBuf,

        /// Perform the moves; without this flag actions are only logged
        #[arg(long)]
        run: bool,
    },

    /// Process the staging roots periodically until interrupted
    Daemon {
        /// Path to configuration file
        #[arg(short, long, value_name = "FILE", default_value_os_t = default_config_path())]
        config: PathBuf,

        /// Perform the moves; without this flag actions are only logged
        #[arg(long)]
        run: bool,

        /// Interval between passes (in seconds)
        #[arg(short, long, value_name = "SECONDS", default_value = "3600")]
        interval: u64,
    },
}
