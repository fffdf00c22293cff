//! Writing converted HTML to disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Atomically write `contents` to `dir/file_name`.
///
/// The data goes to a temporary file in `dir` that is renamed into place,
/// so readers never see a partial file. The temporary file is removed if
/// any step fails.
///
/// # Errors
///
/// Returns an error if the directory cannot be written or the rename fails.
pub fn write_export(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    let _scope = crate::perf::scope("export.write");
    let target = dir.join(file_name);
    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    temp.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write {}", target.display()))?;
    temp.flush()
        .with_context(|| format!("Failed to write {}", target.display()))?;
    temp.persist(&target)
        .map_err(|err| err.error)
        .with_context(|| format!("Failed to save {}", target.display()))?;
    crate::perf::log_event(
        "export.saved",
        format!("path={} bytes={}", target.display(), contents.len()),
    );
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_export_creates_file() {
        let dir = tempdir().unwrap();
        let path = write_export(dir.path(), "converted.html", "<p>x</p>").unwrap();
        assert_eq!(path, dir.path().join("converted.html"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>x</p>");
    }

    #[test]
    fn test_write_export_replaces_existing_file() {
        let dir = tempdir().unwrap();
        write_export(dir.path(), "converted.html", "old").unwrap();
        write_export(dir.path(), "converted.html", "new").unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("converted.html")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_write_export_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = write_export(&missing, "converted.html", "x").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to create temp file"));
    }
}
