//! Output file layout and atomic writes

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{ReportError, ReportResult};
use crate::record::RecordDocument;

/// The pair of output documents for one run, plus the screenshot directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPaths {
    pub html: PathBuf,
    pub json: PathBuf,
    pub screenshots: PathBuf,
}

impl ReportPaths {
    /// Pick `test-report_<run_id>.{html,json}` inside `dir`.
    ///
    /// If either file already exists a numeric suffix is appended so that an
    /// earlier run is never overwritten.
    pub fn allocate(dir: &Path, run_id: &str) -> Self {
        let mut suffix = 0usize;
        loop {
            let stem = if suffix == 0 {
                format!("test-report_{}", run_id)
            } else {
                format!("test-report_{}_{}", run_id, suffix)
            };
            let html = dir.join(format!("{}.html", stem));
            let json = dir.join(format!("{}.json", stem));
            if !html.exists() && !json.exists() {
                return Self {
                    html,
                    json,
                    screenshots: dir.join(format!("{}_screenshots", stem)),
                };
            }
            suffix += 1;
        }
    }
}

/// Write `contents` to a temp file next to `path` and rename it into place.
pub fn write_atomic(path: &Path, contents: &[u8]) -> ReportResult<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ReportError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Create `dir/file_name`, or `dir/<stem>_N.<ext>` when that name is taken.
///
/// The file is created with `create_new`, so concurrent callers never get
/// the same name. Returns the chosen file name and the open file.
pub fn create_unique(dir: &Path, file_name: &str) -> ReportResult<(String, File)> {
    let original = Path::new(file_name);
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string());
    let extension = original.extension().map(|e| e.to_string_lossy().to_string());

    let mut suffix = 0usize;
    loop {
        let candidate = match (suffix, &extension) {
            (0, _) => file_name.to_string(),
            (n, Some(ext)) => format!("{}_{}.{}", stem, n, ext),
            (n, None) => format!("{}_{}", stem, n),
        };
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&candidate))
        {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Serialize the JSON summary document.
pub fn summary_json(records: &[RecordDocument]) -> ReportResult<Vec<u8>> {
    let mut json = serde_json::to_vec_pretty(records)?;
    json.push(b'\n');
    Ok(json)
}

/// Parse a JSON summary document written by [`summary_json`].
pub fn read_summary(path: &Path) -> ReportResult<Vec<RecordDocument>> {
    let content = std::fs::read(path)?;
    Ok(serde_json::from_slice(&content)?)
}

/// Hex SHA-256 of a file's contents.
pub fn hash_file(path: &Path) -> ReportResult<String> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_allocate_skips_existing_run() {
        let dir = TempDir::new().unwrap();
        let first = ReportPaths::allocate(dir.path(), "20240101_120000");
        std::fs::write(&first.html, "old").unwrap();

        let second = ReportPaths::allocate(dir.path(), "20240101_120000");
        assert_ne!(first.html, second.html);
        assert!(second
            .html
            .to_string_lossy()
            .ends_with("test-report_20240101_120000_1.html"));
    }

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("report.html");
        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");

        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_create_unique_never_reuses_a_name() {
        let dir = TempDir::new().unwrap();
        let (first, _) = create_unique(dir.path(), "twin_20260101_000000.png").unwrap();
        let (second, _) = create_unique(dir.path(), "twin_20260101_000000.png").unwrap();
        let (third, _) = create_unique(dir.path(), "twin_20260101_000000.png").unwrap();
        assert_eq!(first, "twin_20260101_000000.png");
        assert_eq!(second, "twin_20260101_000000_1.png");
        assert_eq!(third, "twin_20260101_000000_2.png");
    }

    #[test]
    fn test_hash_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(
            hash_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
