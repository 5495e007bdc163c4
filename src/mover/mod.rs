use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub mod checksum;

/// Moves a file or a whole directory tree.
///
/// Callers make sure the destination's parent directory exists.
pub trait Mover {
    /// # Errors
    /// Returns `io::Error` if the move fails; the source is left in place
    /// unless the move completed.
    fn move_path(&self, source: &Path, destination: &Path) -> io::Result<()>;
}

/// `rename(2)` when possible, verified copy + delete across filesystems
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeMover;

impl Mover for NativeMover {
    fn move_path(&self, source: &Path, destination: &Path) -> io::Result<()> {
        match fs::rename(source, destination) {
            Ok(()) => {
                tracing::debug!(
                    "Renamed {} -> {}",
                    source.display(),
                    destination.display()
                );
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                tracing::debug!(
                    "{} is on another filesystem than {}, copying",
                    source.display(),
                    destination.display()
                );
                copy_verified(source, destination)?;
                remove_source(source)
            }
            Err(e) => Err(e),
        }
    }
}

/// Copy `source` (file or tree) to `destination`, checking every file.
///
/// A directory destination that did not exist before is removed again if
/// any file fails to copy.
pub(crate) fn copy_verified(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(source)?;
    if !metadata.is_dir() {
        return copy_file_verified(source, destination);
    }

    let fresh = !destination.exists();
    let result = copy_tree(source, destination);
    if result.is_err() && fresh {
        let _ = fs::remove_dir_all(destination);
    }
    result
}

fn copy_tree(source: &Path, destination: &Path) -> io::Result<()> {
    fs::create_dir_all(destination)?;

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(io::Error::other)?;
        let target = destination.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            copy_file_verified(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(source: &Path, target: &Path) -> io::Result<()> {
    let link = fs::read_link(source)?;
    std::os::unix::fs::symlink(link, target)
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, target: &Path) -> io::Result<()> {
    copy_file_verified(source, target)
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map_or_else(OsString::new, OsString::from);
    name.push(".partial");
    destination.with_file_name(name)
}

/// Copy under a `.partial` name, verify, then rename into place so other
/// readers (Plex scans) never see a half-written file.
fn copy_file_verified(source: &Path, destination: &Path) -> io::Result<()> {
    let temp = partial_path(destination);

    fs::copy(source, &temp)?;

    match checksum::files_match(source, &temp) {
        Ok(true) => {}
        Ok(false) => {
            let _ = fs::remove_file(&temp);
            return Err(io::Error::other(format!(
                "Copy of {} does not match its source",
                source.display()
            )));
        }
        Err(e) => {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
    }

    fs::rename(&temp, destination)
}

fn remove_source(source: &Path) -> io::Result<()> {
    if fs::symlink_metadata(source)?.is_dir() {
        fs::remove_dir_all(source)
    } else {
        fs::remove_file(source)
    }
}
