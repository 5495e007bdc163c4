//! Per-folder state machine:
//! parse → classify → transfer → retire, stopping at the first failure.
//!
//! The source folder is only ever touched by the final retire step, and only
//! after the payload transfer reported success.

use crate::actions::Actions;
use crate::config::Config;
use crate::discovery::{ContentStrategy, MediaScanner};
use crate::extractor::{ArchiveExtractor, CommandRunner, ToolRunner};
use crate::item::{FailureReason, ItemKind, ItemResult, RunMode};
use crate::mover::Mover;
use crate::recycle::Recycler;
use crate::release::{parse_movie, parse_tv};
use crate::transfer::TransferExecutor;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

pub struct ItemProcessor {
    tv_library: PathBuf,
    movies_library: PathBuf,
    scanner: MediaScanner,
    transfer: TransferExecutor,
    recycler: Recycler,
    actions: Actions,
}

impl ItemProcessor {
    pub fn new(config: &Config, mode: RunMode) -> Self {
        Self {
            tv_library: config.paths.tv_library.clone(),
            movies_library: config.paths.movies_library.clone(),
            scanner: MediaScanner::new(&config.discovery),
            transfer: TransferExecutor::new(
                ArchiveExtractor::new(&config.extractor),
                Box::new(CommandRunner),
            ),
            recycler: Recycler::new(&config.paths.recycle),
            actions: Actions::new(mode),
        }
    }

    /// Replace the external archive tool
    pub fn with_tool_runner(mut self, runner: Box<dyn ToolRunner>) -> Self {
        self.transfer = self.transfer.with_runner(runner);
        self
    }

    pub fn with_mover(mut self, mover: Box<dyn Mover>) -> Self {
        self.actions = Actions::with_mover(self.actions.mode(), mover);
        self
    }

    /// Use a fixed recycle date folder instead of today's
    pub fn with_recycle_date(mut self, date: NaiveDate) -> Self {
        self.recycler = self.recycler.with_date(date);
        self
    }

    pub const fn mode(&self) -> RunMode {
        self.actions.mode()
    }

    /// Library directory for `release`, or `None` if the name does not parse
    pub fn destination_for(&self, kind: ItemKind, release: &str) -> Option<PathBuf> {
        match kind {
            ItemKind::Tv => parse_tv(release).map(|p| self.tv_library.join(p.library_dir())),
            ItemKind::Movie => {
                parse_movie(release).map(|p| self.movies_library.join(p.library_dir()))
            }
        }
    }

    /// Process one source folder. Never panics or errors out: every
    /// irregularity is reported in the returned [`ItemResult`].
    pub fn process(&self, kind: ItemKind, folder: &Path) -> ItemResult {
        let release = folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let Some(dest_dir) = self.destination_for(kind, &release) else {
            match kind {
                ItemKind::Tv => tracing::warn!("IRREGULAR TV name (can't parse): {release}"),
                ItemKind::Movie => {
                    tracing::warn!("IRREGULAR Movie name (can't parse year): {release}");
                }
            }
            return ItemResult::failed(kind, release, folder, None, FailureReason::Unparseable);
        };

        if let Err(e) = self.actions.ensure_dir(&dest_dir) {
            tracing::error!("ERROR cannot create {}: {e}", dest_dir.display());
            return ItemResult::failed(
                kind,
                release,
                folder,
                Some(&dest_dir),
                FailureReason::TransferFailed,
            )
            .with_diagnostic(&e.to_string());
        }

        let strategy = self.scanner.discover(folder);
        tracing::debug!(
            "{kind} {release}: strategy {} -> {}",
            strategy.label(),
            dest_dir.display()
        );

        if strategy == ContentStrategy::None {
            tracing::warn!("IRREGULAR: no rar/video files found in {}", folder.display());
        }

        let outcome = self
            .transfer
            .execute(&self.actions, &strategy, &dest_dir, &release);

        if let Some(reason) = outcome.failure {
            let result = ItemResult::failed(kind, release, folder, Some(&dest_dir), reason);
            return if outcome.diagnostic_output.is_empty() {
                result
            } else {
                result.with_diagnostic(&outcome.diagnostic_output)
            };
        }

        if !outcome.moved_any {
            // Successful transfer that moved nothing: keep the source.
            return ItemResult::succeeded(kind, release, folder, &dest_dir, None);
        }

        match self.recycler.retire(&self.actions, folder) {
            Ok(recycled_to) => {
                ItemResult::succeeded(kind, release, folder, &dest_dir, Some(recycled_to))
            }
            Err(e) => {
                tracing::error!("ERROR recycling {} failed: {e}", folder.display());
                ItemResult::failed(
                    kind,
                    release,
                    folder,
                    Some(&dest_dir),
                    FailureReason::RecycleFailed,
                )
                .with_diagnostic(&e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DiscoveryConfig, ExtractorConfig, PathsConfig};
    use std::fs;
    use tempfile::TempDir;

    fn config(root: &Path) -> Config {
        Config {
            paths: PathsConfig {
                series_source: root.join("complete/Series"),
                movies_source: root.join("complete/Movies"),
                tv_library: root.join("media/TV"),
                movies_library: root.join("media/Movies"),
                recycle: root.join("complete/#recycle"),
                log_dir: root.join("logs"),
            },
            discovery: DiscoveryConfig::default(),
            extractor: ExtractorConfig::default(),
            skip_names: Vec::new(),
        }
    }

    #[test]
    fn test_destination_for() {
        let temp = TempDir::new().unwrap();
        let processor = ItemProcessor::new(&config(temp.path()), RunMode::DryRun);

        assert_eq!(
            processor.destination_for(ItemKind::Tv, "Show.Name.2020.S01E02.1080p"),
            Some(temp.path().join("media/TV/Show Name (2020)/Season 01"))
        );
        assert_eq!(
            processor.destination_for(ItemKind::Movie, "Movie.Title.1999.BluRay"),
            Some(temp.path().join("media/Movies/Movie Title (1999)"))
        );
        assert_eq!(processor.destination_for(ItemKind::Tv, "Movie.Title.1999"), None);
    }

    #[test]
    fn test_unparseable_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("complete/Series/randomfolder");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("video.mkv"), "x").unwrap();
        let processor = ItemProcessor::new(&config(temp.path()), RunMode::Perform);

        let result = processor.process(ItemKind::Tv, &folder);

        assert!(!result.is_ok());
        assert_eq!(result.reason(), Some(FailureReason::Unparseable));
        assert_eq!(result.destination(), None);
        assert!(folder.join("video.mkv").exists());
        assert!(!temp.path().join("media").exists());
    }

    #[test]
    fn test_empty_folder_is_no_media_found() {
        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("complete/Movies/Movie.Title.1999.BluRay");
        fs::create_dir_all(&folder).unwrap();
        let processor = ItemProcessor::new(&config(temp.path()), RunMode::Perform);

        let result = processor.process(ItemKind::Movie, &folder);

        assert_eq!(result.reason(), Some(FailureReason::NoMediaFound));
        assert_eq!(result.recycled_to(), None);
        assert!(folder.exists());
    }
}
