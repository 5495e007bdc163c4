use crate::actions::Actions;
use chrono::{Local, NaiveDate};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

/// Numbered suffixes tried before falling back to the process id
pub const MAX_SUFFIX_ATTEMPTS: u32 = 999;

fn with_suffix(dir: &Path, name: &OsStr, suffix: impl fmt::Display) -> PathBuf {
    let mut candidate = name.to_os_string();
    candidate.push(format!(".{suffix}"));
    dir.join(candidate)
}

/// Moves processed source folders to `<root>/<YYYY-MM-DD>/<name>`
#[derive(Debug, Clone)]
pub struct Recycler {
    root: PathBuf,
    date: Option<NaiveDate>,
}

impl Recycler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            date: None,
        }
    }

    /// Pin the date folder instead of using today's local date
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    fn date_dir(&self) -> PathBuf {
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        self.root.join(date.format("%Y-%m-%d").to_string())
    }

    /// First free path among `<name>`, `<name>.1` … `<name>.999`, else `<name>.<pid>`
    pub fn unique_destination(&self, folder: &Path) -> PathBuf {
        let date_dir = self.date_dir();
        let name = folder
            .file_name()
            .map_or_else(|| OsString::from("unnamed"), OsString::from);

        let base = date_dir.join(&name);
        if !base.exists() {
            return base;
        }

        (1..=MAX_SUFFIX_ATTEMPTS)
            .map(|i| with_suffix(&date_dir, &name, i))
            .find(|candidate| !candidate.exists())
            .unwrap_or_else(|| with_suffix(&date_dir, &name, process::id()))
    }

    /// Move `folder` into the recycle area and return where it went.
    ///
    /// In dry-run mode the destination is computed and logged only.
    pub fn retire(&self, actions: &Actions, folder: &Path) -> io::Result<PathBuf> {
        let destination = self.unique_destination(folder);
        actions.recycle_folder(folder, &destination)?;
        Ok(destination)
    }
}
