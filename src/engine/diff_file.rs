//! engine::diff_file
//!
//! Persisting diff output for later inspection.
//!
//! The file always exists after a successful call. It is truncated when
//! there are no differences and overwritten otherwise, never appended to.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Failure to persist a diff.
#[derive(Debug, Error)]
#[error("writing diff to file '{path}'")]
pub struct DiffFileError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Write `diff` to `path`, or truncate `path` when there is no diff.
///
/// The handle is flushed and closed before returning on every path.
pub fn write_diff_to_file(path: &Path, diff: Option<&str>) -> Result<(), DiffFileError> {
    let wrap = |source| DiffFileError {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(wrap)?;
    if let Some(diff) = diff {
        file.write_all(diff.as_bytes()).map_err(wrap)?;
    }
    file.flush().map_err(wrap)?;

    debug!(path = %path.display(), bytes = diff.map_or(0, str::len), "wrote diff file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn none_truncates_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.diff");
        fs::write(&path, "stale diff from a previous run\n").unwrap();

        write_diff_to_file(&path, None).unwrap();

        assert!(path.exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn none_creates_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.diff");
        write_diff_to_file(&path, None).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn repeated_writes_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.diff");

        write_diff_to_file(&path, Some("X")).unwrap();
        write_diff_to_file(&path, Some("X")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "X");
    }

    #[test]
    fn shorter_diff_replaces_longer() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.diff");

        write_diff_to_file(&path, Some("a much longer diff\n")).unwrap();
        write_diff_to_file(&path, Some("-a\n")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "-a\n");
    }

    #[test]
    fn empty_diff_gives_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.diff");
        write_diff_to_file(&path, Some("")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn unwritable_path_is_wrapped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("out.diff");

        let err = write_diff_to_file(&path, Some("-a\n")).unwrap_err();

        assert!(err.to_string().starts_with("writing diff to file"));
        assert_eq!(err.path, path);
        assert!(err.source().is_some());
    }
}
