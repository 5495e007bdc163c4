//! Every filesystem mutation the job makes goes through [`Actions`].
//!
//! Each action is logged as one line first and only executed in
//! [`RunMode::Perform`], so a dry run prints exactly what a real run does.

use crate::item::RunMode;
use crate::mover::{Mover, NativeMover};
use std::fs;
use std::io;
use std::path::Path;

pub struct Actions {
    mode: RunMode,
    mover: Box<dyn Mover>,
}

impl Actions {
    pub fn new(mode: RunMode) -> Self {
        Self::with_mover(mode, Box::new(NativeMover))
    }

    pub fn with_mover(mode: RunMode, mover: Box<dyn Mover>) -> Self {
        Self { mode, mover }
    }

    pub const fn mode(&self) -> RunMode {
        self.mode
    }

    pub const fn is_perform(&self) -> bool {
        self.mode.is_perform()
    }

    /// `mkdir -p`; silent when the directory already exists.
    pub fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        if path.exists() {
            return Ok(());
        }
        tracing::info!("mkdir -p {}", path.display());
        if self.is_perform() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Move a file into the library, creating its parent directory first.
    ///
    /// Fails with `AlreadyExists` rather than replacing an existing file.
    pub fn move_file(&self, source: &Path, destination: &Path) -> io::Result<()> {
        self.relocate("move", source, destination)
    }

    /// Move a processed source folder into the recycle area
    pub fn recycle_folder(&self, source: &Path, destination: &Path) -> io::Result<()> {
        self.relocate("recycle", source, destination)
    }

    fn relocate(&self, verb: &str, source: &Path, destination: &Path) -> io::Result<()> {
        if fs::symlink_metadata(destination).is_ok() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", destination.display()),
            ));
        }
        if let Some(parent) = destination.parent() {
            self.ensure_dir(parent)?;
        }
        tracing::info!("{verb} {} -> {}", source.display(), destination.display());
        if self.is_perform() {
            self.mover.move_path(source, destination)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Actions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actions").field("mode", &self.mode).finish()
    }
}
