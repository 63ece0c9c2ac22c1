//! Batch processing around the parser: importing dispatches and syncing
//! status updates, plus loading `.eml` files from disk.

pub mod batch;
pub mod sync;

use std::path::{Path, PathBuf};

use crate::error::{DispatchError, Result};
use crate::model::email::RawEmail;
use crate::parser::eml::read_eml;

/// List the `.eml` files directly inside `dir`, sorted by name.
pub fn eml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(DispatchError::FileNotFound(dir.to_path_buf()));
    }
    let entries = std::fs::read_dir(dir).map_err(|e| DispatchError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| DispatchError::io(dir, e))?.path();
        let is_eml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"));
        if path.is_file() && is_eml {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read every `.eml` file in `dir`.
///
/// Files that cannot be read are logged and skipped; `on_progress` is
/// called with `(done, total)` after each file.
pub fn load_dir(dir: &Path, on_progress: &dyn Fn(usize, usize)) -> Result<Vec<RawEmail>> {
    let files = eml_files(dir)?;
    let total = files.len();
    let mut emails = Vec::with_capacity(total);

    for (i, path) in files.iter().enumerate() {
        match read_eml(path) {
            Ok(email) => emails.push(email),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable email"),
        }
        on_progress(i + 1, total);
    }

    Ok(emails)
}
