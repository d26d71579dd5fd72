use crate::error::{PulseError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|e| PulseError::fs(dir, e))
}

/// Writes `path` through a sibling temp file and renames it into place, so readers see
/// either the previous file or the complete new one. Parent directories are created.
/// The result keeps the permissions of the file it replaces, or the umask default.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&File>) -> std::io::Result<()>,
{
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    ensure_dir(dir)?;
    let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };

    let tmp = temp_file_in(dir).map_err(|e| PulseError::fs(dir, e))?;
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| PulseError::fs(path, e))?;
    }
    {
        let mut out = BufWriter::new(tmp.as_file());
        write(&mut out).map_err(|e| PulseError::fs(path, e))?;
        out.flush().map_err(|e| PulseError::fs(path, e))?;
    }
    tmp.as_file().sync_all().map_err(|e| PulseError::fs(path, e))?;
    tmp.persist(path).map_err(|e| PulseError::fs(path, e.error))?;
    Ok(())
}

#[cfg(unix)]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;
    // Masked by the process umask on creation.
    Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    Builder::new().tempfile_in(dir)
}
