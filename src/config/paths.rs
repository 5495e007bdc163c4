use super::{ConfigError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Filesystem roots the job reads from and writes to.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PathsConfig {
    pub series_source: PathBuf,
    pub movies_source: PathBuf,
    pub tv_library: PathBuf,
    pub movies_library: PathBuf,
    pub recycle: PathBuf,
    pub log_dir: PathBuf,
}

impl PathsConfig {
    fn named(&self) -> [(&'static str, &Path); 6] {
        [
            ("series_source", self.series_source.as_path()),
            ("movies_source", self.movies_source.as_path()),
            ("tv_library", self.tv_library.as_path()),
            ("movies_library", self.movies_library.as_path()),
            ("recycle", self.recycle.as_path()),
            ("log_dir", self.log_dir.as_path()),
        ]
    }

    pub(super) fn validate(&self) -> Result<()> {
        for (name, path) in self.named() {
            if !path.is_absolute() {
                return Err(ConfigError::RelativePath {
                    name,
                    path: path.to_path_buf(),
                });
            }
        }

        if self.series_source == self.movies_source {
            return Err(ConfigError::SharedSource {
                path: self.series_source.clone(),
            });
        }

        Ok(())
    }

    /// Roots that must already exist before any item is touched.
    ///
    /// The recycle root is created on demand, and the log directory only needs
    /// its parent to exist.
    pub fn missing_roots(&self) -> Vec<PathBuf> {
        let log_home = self.log_dir.parent().unwrap_or(self.log_dir.as_path());

        [
            self.series_source.as_path(),
            self.movies_source.as_path(),
            self.tv_library.as_path(),
            self.movies_library.as_path(),
            log_home,
        ]
        .into_iter()
        .filter(|p| !p.exists())
        .map(Path::to_path_buf)
        .collect()
    }

    pub fn source_roots(&self) -> [&Path; 2] {
        [self.series_source.as_path(), self.movies_source.as_path()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn paths_under(root: &Path) -> PathsConfig {
        PathsConfig {
            series_source: root.join("complete/Series"),
            movies_source: root.join("complete/Movies"),
            tv_library: root.join("media/TV"),
            movies_library: root.join("media/Movies"),
            recycle: root.join("complete/#recycle"),
            log_dir: root.join("coda/logs"),
        }
    }

    #[test]
    fn test_deserialize_paths() {
        let yaml = r"
series_source: /mnt/complete/Series
movies_source: /mnt/complete/Movies
tv_library: /mnt/media/Video/TV
movies_library: /mnt/media/Video/Movies
recycle: /mnt/complete/#recycle/process-downloads
log_dir: /mnt/coda/logs
";
        let paths: PathsConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(paths.series_source, PathBuf::from("/mnt/complete/Series"));
        assert_eq!(
            paths.recycle,
            PathBuf::from("/mnt/complete/#recycle/process-downloads")
        );
    }

    #[test]
    fn test_validate_relative_path() {
        let mut paths = paths_under(Path::new("/mnt"));
        paths.tv_library = PathBuf::from("media/TV");

        match paths.validate() {
            Err(ConfigError::RelativePath { name, .. }) => assert_eq!(name, "tv_library"),
            other => panic!("Expected RelativePath error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_shared_source() {
        let mut paths = paths_under(Path::new("/mnt"));
        paths.movies_source = paths.series_source.clone();

        assert!(matches!(
            paths.validate(),
            Err(ConfigError::SharedSource { .. })
        ));
    }

    #[test]
    fn test_missing_roots_reports_absent_directories() {
        let temp = TempDir::new().unwrap();
        let paths = paths_under(temp.path());
        fs::create_dir_all(&paths.series_source).unwrap();
        fs::create_dir_all(&paths.tv_library).unwrap();

        let missing = paths.missing_roots();
        assert_eq!(
            missing,
            vec![
                paths.movies_source.clone(),
                paths.movies_library.clone(),
                temp.path().join("coda"),
            ]
        );
    }

    #[test]
    fn test_missing_roots_empty_when_all_present() {
        let temp = TempDir::new().unwrap();
        let paths = paths_under(temp.path());
        fs::create_dir_all(&paths.series_source).unwrap();
        fs::create_dir_all(&paths.movies_source).unwrap();
        fs::create_dir_all(&paths.tv_library).unwrap();
        fs::create_dir_all(&paths.movies_library).unwrap();
        fs::create_dir_all(temp.path().join("coda")).unwrap();

        assert!(paths.missing_roots().is_empty());
    }
}
