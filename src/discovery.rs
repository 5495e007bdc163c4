use crate::config::DiscoveryConfig;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Recognized video extensions, compared case-insensitively
pub const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "mov", "m4v", "wmv"];

/// The single way a folder's payload will be handled.
///
/// Priority is fixed: `Archive` > `VideoFiles` > `LargeUnlabeledFiles` > `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentStrategy {
    /// First archive found in traversal order. Any further archives are ignored.
    Archive(PathBuf),
    VideoFiles(Vec<PathBuf>),
    LargeUnlabeledFiles(Vec<PathBuf>),
    None,
}

impl ContentStrategy {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Archive(_) => "archive",
            Self::VideoFiles(_) => "video_files",
            Self::LargeUnlabeledFiles(_) => "large_unlabeled_files",
            Self::None => "none",
        }
    }
}

/// Classifies the contents of a release folder
#[derive(Debug, Clone)]
pub struct MediaScanner {
    archive_suffix: String,
    min_unlabeled_bytes: u64,
}

impl MediaScanner {
    pub fn new(config: &DiscoveryConfig) -> Self {
        let ext = config.archive_extension.trim_start_matches('.');
        Self {
            archive_suffix: format!(".{ext}"),
            min_unlabeled_bytes: config.min_unlabeled_bytes,
        }
    }

    /// Pick the content strategy for `folder`. Never fails: unreadable
    /// entries are skipped and an empty or unreadable folder yields `None`.
    pub fn discover(&self, folder: &Path) -> ContentStrategy {
        if let Some(archive) = self.find_first_archive(folder) {
            return ContentStrategy::Archive(archive);
        }

        let videos = find_video_files(folder);
        if !videos.is_empty() {
            return ContentStrategy::VideoFiles(videos);
        }

        let unlabeled = self.find_large_unlabeled(folder);
        if !unlabeled.is_empty() {
            return ContentStrategy::LargeUnlabeledFiles(unlabeled);
        }

        ContentStrategy::None
    }

    pub fn find_first_archive(&self, folder: &Path) -> Option<PathBuf> {
        walk_files(folder)
            .find(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(&self.archive_suffix))
            })
            .map(DirEntry::into_path)
    }

    /// Extensionless files at or above the size threshold.
    /// Entries whose metadata cannot be read (vanished mid-scan) are skipped.
    pub fn find_large_unlabeled(&self, folder: &Path) -> Vec<PathBuf> {
        walk_files(folder)
            .filter(|entry| has_no_extension(entry.path()))
            .filter(|entry| {
                fs::metadata(entry.path())
                    .is_ok_and(|meta| meta.len() >= self.min_unlabeled_bytes)
            })
            .map(DirEntry::into_path)
            .collect()
    }
}

pub fn find_video_files(folder: &Path) -> Vec<PathBuf> {
    walk_files(folder)
        .filter(|entry| is_video(entry.path()))
        .map(DirEntry::into_path)
        .collect()
}

pub fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

fn has_no_extension(path: &Path) -> bool {
    path.extension().is_none_or(|ext| ext.is_empty())
}

/// Regular files under `folder`, recursively, in file-name order.
/// Symlinks to files count as files; linked directories are not entered.
fn walk_files(folder: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(folder)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
}
