use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Backup name for the `number`-th copy of `path`: `dir/#name.N#`.
pub fn backup_path(path: &Path, number: u32) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let backup = format!("#{}.{}#", name, number);
    match path.parent() {
        Some(dir) => dir.join(backup),
        None => PathBuf::from(backup),
    }
}

/// Renames an existing file at `path` to the first unused backup name.
///
/// Returns the backup location, or `None` when there was nothing to preserve
/// or the rename could not be done. Failures are logged and never stop the
/// caller from overwriting `path`.
pub fn make_backup(path: &Path, max_backups: u32) -> Option<PathBuf> {
    if !path.exists() {
        return None;
    }
    let Some(target) = (1..=max_backups)
        .map(|number| backup_path(path, number))
        .find(|candidate| !candidate.exists())
    else {
        warn!(
            "Won't make more than {} backups of '{}'; it will be overwritten.",
            max_backups,
            path.display()
        );
        return None;
    };

    match fs::rename(path, &target) {
        Ok(()) => {
            info!("Backed up '{}' to '{}'.", path.display(), target.display());
            Some(target)
        }
        Err(e) => {
            warn!("Could not back up '{}' to '{}': {}", path.display(), target.display(), e);
            None
        }
    }
}
