use crate::actions::Actions;
use crate::discovery::ContentStrategy;
use crate::extractor::{ArchiveExtractor, ToolRunner};
use crate::item::FailureReason;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Result of moving or extracting a folder's payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub succeeded: bool,
    pub moved_any: bool,
    /// Tool output for archives, the I/O error for failed moves
    pub diagnostic_output: String,
    /// Set exactly when `succeeded` is false
    pub failure: Option<FailureReason>,
}

impl TransferOutcome {
    fn done(moved_any: bool, diagnostic_output: String) -> Self {
        Self {
            succeeded: true,
            moved_any,
            diagnostic_output,
            failure: None,
        }
    }

    fn failed(reason: FailureReason, moved_any: bool, diagnostic_output: String) -> Self {
        Self {
            succeeded: false,
            moved_any,
            diagnostic_output,
            failure: Some(reason),
        }
    }
}

pub struct TransferExecutor {
    extractor: ArchiveExtractor,
    runner: Box<dyn ToolRunner>,
}

impl TransferExecutor {
    pub fn new(extractor: ArchiveExtractor, runner: Box<dyn ToolRunner>) -> Self {
        Self { extractor, runner }
    }

    pub fn with_runner(mut self, runner: Box<dyn ToolRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Carry out `strategy` into `dest_dir`.
    ///
    /// Files are handled in list order and the first failing move stops
    /// the transfer. A `None` strategy fails without touching anything.
    pub fn execute(
        &self,
        actions: &Actions,
        strategy: &ContentStrategy,
        dest_dir: &Path,
        release: &str,
    ) -> TransferOutcome {
        match strategy {
            ContentStrategy::Archive(archive) => self.extract(actions, archive, dest_dir),
            ContentStrategy::VideoFiles(files) => move_all(actions, files, |file| {
                file.file_name().map(|name| dest_dir.join(name))
            }),
            ContentStrategy::LargeUnlabeledFiles(files) => {
                let target = dest_dir.join(format!("{release}.mkv"));
                move_all(actions, files, |_| Some(target.clone()))
            }
            ContentStrategy::None => {
                TransferOutcome::failed(FailureReason::NoMediaFound, false, String::new())
            }
        }
    }

    fn extract(&self, actions: &Actions, archive: &Path, dest_dir: &Path) -> TransferOutcome {
        if let Err(e) = actions.ensure_dir(dest_dir) {
            return TransferOutcome::failed(FailureReason::TransferFailed, false, e.to_string());
        }

        let extraction = self.extractor.extract(
            self.runner.as_ref(),
            archive,
            dest_dir,
            actions.is_perform(),
        );

        if extraction.succeeded {
            TransferOutcome::done(true, extraction.output)
        } else {
            tracing::error!(
                "ERROR unrar failed for {} (leaving source)",
                archive.display()
            );
            TransferOutcome::failed(FailureReason::ExtractionFailed, false, extraction.output)
        }
    }
}

/// Plan every target before moving anything: two files landing on the same
/// library path fail the transfer with nothing moved.
fn move_all<F>(actions: &Actions, files: &[PathBuf], target_for: F) -> TransferOutcome
where
    F: Fn(&Path) -> Option<PathBuf>,
{
    let mut planned: Vec<(&Path, PathBuf)> = Vec::with_capacity(files.len());
    let mut claimed = HashSet::new();

    for file in files {
        let Some(target) = target_for(file) else {
            return TransferOutcome::failed(
                FailureReason::TransferFailed,
                false,
                format!("No file name in {}", file.display()),
            );
        };
        if !claimed.insert(target.clone()) {
            tracing::error!(
                "ERROR {} would overwrite another file at {} (leaving source)",
                file.display(),
                target.display()
            );
            return TransferOutcome::failed(
                FailureReason::TransferFailed,
                false,
                format!(
                    "{}: more than one file maps to {}",
                    file.display(),
                    target.display()
                ),
            );
        }
        planned.push((file.as_path(), target));
    }

    let mut moved_any = false;
    for (file, target) in planned {
        if let Err(e) = actions.move_file(file, &target) {
            tracing::error!("ERROR moving {} failed: {e} (leaving source)", file.display());
            return TransferOutcome::failed(
                FailureReason::TransferFailed,
                moved_any,
                format!("{}: {e}", file.display()),
            );
        }
        moved_any = true;
    }

    TransferOutcome::done(moved_any, String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::extractor::{DRY_RUN_MARKER, ToolOutput};
    use crate::item::RunMode;
    use std::cell::Cell;
    use std::ffi::OsString;
    use std::fs;
    use std::io;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct ExitWith {
        code: i32,
        calls: Rc<Cell<usize>>,
    }

    impl ToolRunner for ExitWith {
        fn run(&self, _program: &str, _args: &[OsString]) -> io::Result<ToolOutput> {
            self.calls.set(self.calls.get() + 1);
            Ok(ToolOutput {
                exit_code: Some(self.code),
                output: format!("exit {}", self.code),
            })
        }
    }

    fn executor(code: i32) -> (TransferExecutor, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let runner = ExitWith {
            code,
            calls: Rc::clone(&calls),
        };
        (
            TransferExecutor::new(
                ArchiveExtractor::new(&ExtractorConfig::default()),
                Box::new(runner),
            ),
            calls,
        )
    }

    fn touch(path: &Path) -> PathBuf {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"payload").unwrap();
        path.to_path_buf()
    }

    #[test]
    fn test_none_strategy_fails_without_side_effects() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("lib/Movie (1999)");
        let (executor, calls) = executor(0);

        let outcome = executor.execute(
            &Actions::new(RunMode::Perform),
            &ContentStrategy::None,
            &dest,
            "Movie.1999",
        );

        assert!(!outcome.succeeded);
        assert!(!outcome.moved_any);
        assert_eq!(outcome.failure, Some(FailureReason::NoMediaFound));
        assert!(!dest.exists());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_video_files_keep_names() {
        let temp = TempDir::new().unwrap();
        let a = touch(&temp.path().join("src/a.mkv"));
        let b = touch(&temp.path().join("src/extras/b.mp4"));
        let dest = temp.path().join("lib/Show/Season 01");
        let (executor, _) = executor(0);

        let outcome = executor.execute(
            &Actions::new(RunMode::Perform),
            &ContentStrategy::VideoFiles(vec![a.clone(), b.clone()]),
            &dest,
            "Show.S01E01",
        );

        assert!(outcome.succeeded);
        assert!(outcome.moved_any);
        assert!(dest.join("a.mkv").exists());
        assert!(dest.join("b.mp4").exists());
        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn test_unlabeled_files_renamed_after_release() {
        let temp = TempDir::new().unwrap();
        let blob = touch(&temp.path().join("src/abc123"));
        let dest = temp.path().join("lib/Movie Title (1999)");
        let (executor, _) = executor(0);

        let outcome = executor.execute(
            &Actions::new(RunMode::Perform),
            &ContentStrategy::LargeUnlabeledFiles(vec![blob.clone()]),
            &dest,
            "Movie.Title.1999.BluRay",
        );

        assert!(outcome.succeeded);
        assert!(dest.join("Movie.Title.1999.BluRay.mkv").exists());
        assert!(!blob.exists());
    }

    #[test]
    fn test_dry_run_moves_nothing() {
        let temp = TempDir::new().unwrap();
        let a = touch(&temp.path().join("src/a.mkv"));
        let dest = temp.path().join("lib/Show/Season 01");
        let (executor, _) = executor(0);

        let outcome = executor.execute(
            &Actions::new(RunMode::DryRun),
            &ContentStrategy::VideoFiles(vec![a.clone()]),
            &dest,
            "Show.S01E01",
        );

        assert!(outcome.succeeded);
        assert!(outcome.moved_any);
        assert!(a.exists());
        assert!(!dest.exists());
    }

    #[test]
    fn test_archive_success() {
        let temp = TempDir::new().unwrap();
        let rar = touch(&temp.path().join("src/movie.rar"));
        let dest = temp.path().join("lib/Movie (1999)");
        let (executor, calls) = executor(0);

        let outcome = executor.execute(
            &Actions::new(RunMode::Perform),
            &ContentStrategy::Archive(rar),
            &dest,
            "Movie.1999",
        );

        assert!(outcome.succeeded);
        assert!(outcome.moved_any);
        assert_eq!(calls.get(), 1);
        assert!(dest.is_dir(), "Destination is created before extraction");
    }

    #[test]
    fn test_archive_failure() {
        let temp = TempDir::new().unwrap();
        let rar = touch(&temp.path().join("src/movie.rar"));
        let dest = temp.path().join("lib/Movie (1999)");
        let (executor, _) = executor(3);

        let outcome = executor.execute(
            &Actions::new(RunMode::Perform),
            &ContentStrategy::Archive(rar.clone()),
            &dest,
            "Movie.1999",
        );

        assert!(!outcome.succeeded);
        assert!(!outcome.moved_any);
        assert_eq!(outcome.failure, Some(FailureReason::ExtractionFailed));
        assert_eq!(outcome.diagnostic_output, "exit 3");
        assert!(rar.exists());
    }

    #[test]
    fn test_archive_dry_run_skips_tool() {
        let temp = TempDir::new().unwrap();
        let rar = touch(&temp.path().join("src/movie.rar"));
        let dest = temp.path().join("lib/Movie (1999)");
        let (executor, calls) = executor(3);

        let outcome = executor.execute(
            &Actions::new(RunMode::DryRun),
            &ContentStrategy::Archive(rar),
            &dest,
            "Movie.1999",
        );

        assert!(outcome.succeeded);
        assert_eq!(outcome.diagnostic_output, DRY_RUN_MARKER);
        assert_eq!(calls.get(), 0);
        assert!(!dest.exists());
    }

    #[test]
    fn test_same_file_name_in_two_folders_fails_before_moving() {
        let temp = TempDir::new().unwrap();
        let cd1 = touch(&temp.path().join("src/CD1/movie.mkv"));
        let cd2 = touch(&temp.path().join("src/CD2/movie.mkv"));
        let dest = temp.path().join("lib/Movie (1999)");
        let (executor, _) = executor(0);

        let outcome = executor.execute(
            &Actions::new(RunMode::Perform),
            &ContentStrategy::VideoFiles(vec![cd1.clone(), cd2.clone()]),
            &dest,
            "Movie.1999",
        );

        assert!(!outcome.succeeded);
        assert!(!outcome.moved_any);
        assert_eq!(outcome.failure, Some(FailureReason::TransferFailed));
        assert!(cd1.exists());
        assert!(cd2.exists());
        assert!(!dest.join("movie.mkv").exists());
    }

    #[test]
    fn test_several_unlabeled_blobs_are_not_merged() {
        let temp = TempDir::new().unwrap();
        let a = touch(&temp.path().join("src/blobA"));
        let b = touch(&temp.path().join("src/blobB"));
        let dest = temp.path().join("lib/Movie (1999)");
        let (executor, _) = executor(0);

        let outcome = executor.execute(
            &Actions::new(RunMode::DryRun),
            &ContentStrategy::LargeUnlabeledFiles(vec![a, b]),
            &dest,
            "Movie.1999",
        );

        assert_eq!(outcome.failure, Some(FailureReason::TransferFailed));
        assert!(outcome.diagnostic_output.contains("Movie.1999.mkv"));
    }

    #[test]
    fn test_failed_move_stops_transfer() {
        let temp = TempDir::new().unwrap();
        let a = touch(&temp.path().join("src/a.mkv"));
        let missing = temp.path().join("src/vanished.mkv");
        let c = touch(&temp.path().join("src/c.mkv"));
        let dest = temp.path().join("lib/Show/Season 01");
        let (executor, _) = executor(0);

        let outcome = executor.execute(
            &Actions::new(RunMode::Perform),
            &ContentStrategy::VideoFiles(vec![a, missing, c.clone()]),
            &dest,
            "Show.S01E01",
        );

        assert!(!outcome.succeeded);
        assert!(outcome.moved_any);
        assert_eq!(outcome.failure, Some(FailureReason::TransferFailed));
        assert!(outcome.diagnostic_output.contains("vanished.mkv"));
        assert!(c.exists(), "Files after the failure are not attempted");
    }
}
