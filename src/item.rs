use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Bound on captured tool output kept in a result
pub const DIAGNOSTIC_TAIL_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Tv,
    Movie,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tv => write!(f, "TV"),
            Self::Movie => write!(f, "Movie"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Ok,
    Error,
}

/// Why an item was left in place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Release name matches neither the TV nor the movie convention
    Unparseable,
    /// No archive, video or large extensionless file in the folder
    NoMediaFound,
    /// The archive tool exited non-zero or could not be started
    ExtractionFailed,
    /// A directory could not be created or a file could not be moved
    TransferFailed,
    /// Payload transferred but the source folder could not be recycled
    RecycleFailed,
}

impl FailureReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unparseable => "unparseable",
            Self::NoMediaFound => "no_media_found",
            Self::ExtractionFailed => "extraction_failed",
            Self::TransferFailed => "transfer_failed",
            Self::RecycleFailed => "recycle_failed",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether mutations are executed or only logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunMode {
    #[serde(rename = "dry")]
    DryRun,
    #[serde(rename = "run")]
    Perform,
}

impl RunMode {
    pub const fn from_run_flag(run: bool) -> Self {
        if run { Self::Perform } else { Self::DryRun }
    }

    pub const fn is_perform(self) -> bool {
        matches!(self, Self::Perform)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DryRun => write!(f, "DRY_RUN"),
            Self::Perform => write!(f, "RUN"),
        }
    }
}

/// Outcome of processing one source folder.
///
/// `recycled_to` is only ever set on an `Ok` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    kind: ItemKind,
    release: String,
    status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<FailureReason>,
    #[serde(rename = "path")]
    source: PathBuf,
    #[serde(rename = "dest", skip_serializing_if = "Option::is_none")]
    destination: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recycled_to: Option<PathBuf>,
    #[serde(skip)]
    diagnostic: Option<String>,
}

impl ItemResult {
    pub fn succeeded(
        kind: ItemKind,
        release: impl Into<String>,
        source: &Path,
        destination: &Path,
        recycled_to: Option<PathBuf>,
    ) -> Self {
        Self {
            kind,
            release: release.into(),
            status: ItemStatus::Ok,
            reason: None,
            source: source.to_path_buf(),
            destination: Some(destination.to_path_buf()),
            recycled_to,
            diagnostic: None,
        }
    }

    pub fn failed(
        kind: ItemKind,
        release: impl Into<String>,
        source: &Path,
        destination: Option<&Path>,
        reason: FailureReason,
    ) -> Self {
        Self {
            kind,
            release: release.into(),
            status: ItemStatus::Error,
            reason: Some(reason),
            source: source.to_path_buf(),
            destination: destination.map(Path::to_path_buf),
            recycled_to: None,
            diagnostic: None,
        }
    }

    /// Attach captured output, keeping only its last `DIAGNOSTIC_TAIL_CHARS` characters
    pub fn with_diagnostic(mut self, output: &str) -> Self {
        self.diagnostic = Some(tail_chars(output, DIAGNOSTIC_TAIL_CHARS).to_string());
        self
    }

    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn release(&self) -> &str {
        &self.release
    }

    pub const fn status(&self) -> ItemStatus {
        self.status
    }

    pub const fn is_ok(&self) -> bool {
        matches!(self.status, ItemStatus::Ok)
    }

    pub const fn reason(&self) -> Option<FailureReason> {
        self.reason
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    pub fn recycled_to(&self) -> Option<&Path> {
        self.recycled_to.as_deref()
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }
}

/// Last `max` characters of `text`, cut on a char boundary
pub fn tail_chars(text: &str, max: usize) -> &str {
    if max == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max - 1) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}
