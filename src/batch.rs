//! One pass over both staging roots.

use crate::audit::AuditLog;
use crate::config::Config;
use crate::item::{FailureReason, ItemKind, ItemResult};
use crate::processor::ItemProcessor;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Counts of finished items for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ok: usize,
    pub error: usize,
}

impl RunSummary {
    fn record(&mut self, result: &ItemResult) {
        if result.is_ok() {
            self.ok += 1;
        } else {
            self.error += 1;
        }
    }

    pub const fn has_errors(&self) -> bool {
        self.error > 0
    }

    pub const fn exit_code(&self) -> i32 {
        if self.has_errors() { 1 } else { 0 }
    }
}

/// Immediate subdirectories of `root`, sorted by name.
///
/// Names listed in `skip_names`, hidden entries and plain files are left out.
pub fn list_items(root: &Path, skip_names: &[String]) -> io::Result<Vec<PathBuf>> {
    let mut items = Vec::new();

    for entry in fs::read_dir(root)? {
        let Ok(entry) = entry else { continue };
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if name.starts_with('.') || skip_names.iter().any(|skip| *skip == name) {
            continue;
        }
        if entry.path().is_dir() {
            items.push(entry.path());
        }
    }

    items.sort();
    Ok(items)
}

pub struct BatchRunner {
    processor: ItemProcessor,
    audit: AuditLog,
    series_root: PathBuf,
    movies_root: PathBuf,
    skip_names: Vec<String>,
}

impl BatchRunner {
    /// Audit records go to the configured log directory
    pub fn new(config: &Config, processor: ItemProcessor) -> Self {
        Self {
            processor,
            audit: AuditLog::new(&config.paths.log_dir),
            series_root: config.paths.series_source.clone(),
            movies_root: config.paths.movies_source.clone(),
            skip_names: config.skip_names.clone(),
        }
    }

    /// Process the series root, then the movies root.
    ///
    /// A root that cannot be listed is logged and contributes no items.
    pub fn run(&self) -> RunSummary {
        let mode = self.processor.mode();
        tracing::info!("process-downloads start mode={mode}");
        self.audit.start(mode);

        let mut summary = RunSummary::default();
        for (kind, root) in [
            (ItemKind::Tv, &self.series_root),
            (ItemKind::Movie, &self.movies_root),
        ] {
            let items = match list_items(root, &self.skip_names) {
                Ok(items) => items,
                Err(e) => {
                    tracing::error!("ERROR cannot list {}: {e}", root.display());
                    continue;
                }
            };

            for folder in items {
                let result = self.processor.process(kind, &folder);
                self.report(&result);
                summary.record(&result);
            }
        }

        tracing::info!(
            "process-downloads done ok={} error={}",
            summary.ok,
            summary.error
        );
        self.audit.done(summary.ok, summary.error);
        summary
    }

    fn report(&self, result: &ItemResult) {
        self.audit.item(result);
        if let (Some(FailureReason::ExtractionFailed), Some(output)) =
            (result.reason(), result.diagnostic())
        {
            self.audit.extraction_failed(result, output);
        }
    }
}
