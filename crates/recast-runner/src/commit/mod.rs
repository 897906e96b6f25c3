//! Writes rewritten sources back to disk.
//!
//! Each file is written to a temporary file in the target's directory and
//! then renamed over the target, so a reader sees either the old or the new
//! content and never a partial write.

use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::BatchError;

/// Atomically replaces the content of an existing file, keeping its
/// permissions.
pub(crate) fn write_atomically(path: &Path, content: &str) -> Result<(), BatchError> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(path)
        .map_err(|err| BatchError::commit(path, err))?
        .permissions();

    let mut temp_file =
        NamedTempFile::new_in(parent).map_err(|err| BatchError::commit(path, err))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|err| BatchError::commit(path, err))?;
    temp_file
        .as_file()
        .set_permissions(permissions)
        .map_err(|err| BatchError::commit(path, err))?;
    temp_file
        .persist(path)
        .map_err(|err| BatchError::commit(path, err.error))?;
    Ok(())
}
