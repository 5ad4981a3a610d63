//! File-system resource helpers.
use anyhow::{Context as _, Result};
use std::io::Write as _;
use std::path::Path;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Remove an existing file or symlink at `path`, including broken symlinks.
///
/// Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<()> {
    if path.exists() || path.symlink_metadata().is_ok() {
        std::fs::remove_file(path)
            .with_context(|| format!("remove existing: {}", path.display()))?;
    }
    Ok(())
}

/// Write `bytes` to `target` through a sibling temp file and a rename, so a
/// reader never observes a half-written file.
///
/// When `private` is set the temp file is created with mode `0600` on Unix,
/// so the content is never readable by others, not even before the rename.
///
/// # Errors
///
/// Returns an error if the temp file cannot be written or renamed into place.
pub fn write_atomic(target: &Path, bytes: &[u8], private: bool) -> Result<()> {
    let file_name = target.file_name().map_or_else(
        || "sslcert_tmp".to_string(),
        |n| format!(".{}.sslcert_tmp", n.to_string_lossy()),
    );
    let tmp = target.with_file_name(file_name);

    // A leftover temp file would keep its old mode.
    remove_existing(&tmp)?;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if private {
            options.mode(0o600);
        }
    }
    #[cfg(not(unix))]
    let _ = private;

    let written = options
        .open(&tmp)
        .and_then(|mut file| file.write_all(bytes))
        .with_context(|| format!("write {}", tmp.display()));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }

    if let Err(e) = std::fs::rename(&tmp, target) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("rename {} to {}", tmp.display(), target.display()));
    }
    Ok(())
}
