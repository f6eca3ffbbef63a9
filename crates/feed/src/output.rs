// ABOUTME: Atomic persistence of the generated feed and the raw JSON snapshot.
// ABOUTME: Writes to a temp file beside the target, syncs it, then renames over the target.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::FeedError;

/// Replaces `path` with `bytes`. Readers see either the old file or the new
/// one, never a partial write; on failure the target is left untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), FeedError> {
    let dir = parent_dir(path);
    fs::create_dir_all(&dir).map_err(|e| FeedError::write(path, e))?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| FeedError::write(path, e))?;
    tmp.write_all(bytes).map_err(|e| FeedError::write(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| FeedError::write(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(|e| FeedError::write(path, e))?;
    }

    tmp.persist(path).map_err(|e| FeedError::write(path, e.error))?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

/// Pretty-printed JSON of `value`, written atomically.
pub fn write_json_snapshot<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), FeedError> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(FeedError::serialize)?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
