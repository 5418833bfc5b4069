use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::Builder;

/// Atomically replace `path` with `content`, optionally keeping a `.bak` copy of
/// the previous version. Readers never observe a partially written file.
pub fn write_atomic(path: &Path, content: &str, backup: bool) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };

    let mut tmp = Builder::new()
        .prefix(".markdown-rewrite")
        .tempfile_in(&parent)?;
    tmp.as_file_mut().write_all(content.as_bytes())?;
    tmp.as_file_mut().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(path) {
            let perm = metadata.permissions().mode();
            if let Err(err) = fs::set_permissions(tmp.path(), fs::Permissions::from_mode(perm)) {
                tracing::debug!(path = %path.display(), error = %err, "could not copy permissions");
            }
        }
    }

    if backup && path.exists() {
        fs::copy(path, backup_path(path))?;
    }

    tmp.persist(path).map(|_| ()).map_err(|err| err.error)
}

/// Location of the backup written next to `path`, e.g. `notes.md.bak`.
pub fn backup_path(path: &Path) -> std::path::PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    name.into()
}
