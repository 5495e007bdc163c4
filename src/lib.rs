#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod actions;
pub mod audit;
pub mod batch;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extractor;
pub mod item;
pub mod lock;
pub mod logging;
pub mod mover;
pub mod processor;
pub mod recycle;
pub mod release;
pub mod transfer;

pub use actions::Actions;
pub use audit::AuditLog;
pub use batch::{BatchRunner, RunSummary, list_items};
pub use cli::{Cli, Commands, default_config_path};
pub use config::{Config, ConfigError, DiscoveryConfig, ExtractorConfig, PathsConfig};
pub use discovery::{ContentStrategy, MediaScanner};
pub use error::{AppError, Result};
pub use extractor::{ArchiveExtractor, CommandRunner, ToolOutput, ToolRunner};
pub use item::{FailureReason, ItemKind, ItemResult, ItemStatus, RunMode};
pub use lock::RunLockGuard;
pub use mover::{Mover, NativeMover};
pub use processor::ItemProcessor;
pub use recycle::Recycler;
pub use release::{ParsedMovie, ParsedTv, parse_movie, parse_tv};
pub use transfer::{TransferExecutor, TransferOutcome};
