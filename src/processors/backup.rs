use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use super::fingerprint::split_name;
use super::RunLog;

const BACKUP_SUFFIX: &str = ".bak";

/// How a backup is named
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    /// `{name}.bak`, replaced by later backups of the same name
    Asset,
    /// `{stem}_{timestamp}{ext}.bak`, one per mutation
    Markup,
}

/// Side directory holding pre-mutation copies
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `src` into the backup directory and log it.
    ///
    /// Must be called before `src` is renamed or rewritten.
    pub fn backup(&self, src: &Path, kind: BackupKind, log: &mut RunLog) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create backup directory: {}", self.dir.display()))?;

        let filename = src
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Unsupported file name: {}", src.display()))?;

        let dest = self.unique_path(&backup_name(filename, kind, Local::now()), kind);
        copy_preserving(src, &dest)?;

        log.record(format!("Backed up {} to {}", src.display(), dest.display()));
        Ok(dest)
    }

    fn unique_path(&self, name: &str, kind: BackupKind) -> PathBuf {
        let path = self.dir.join(name);
        if kind == BackupKind::Asset || !path.exists() {
            return path;
        }

        // Same markup file backed up twice within one second
        let base = name.strip_suffix(BACKUP_SUFFIX).unwrap_or(name);
        let (stem, ext) = split_name(base);
        (1..)
            .map(|n| self.dir.join(format!("{stem}-{n}{ext}{BACKUP_SUFFIX}")))
            .find(|candidate| !candidate.exists())
            .unwrap_or(path)
    }
}

/// Name of the backup copy for `filename`
pub fn backup_name(filename: &str, kind: BackupKind, now: DateTime<Local>) -> String {
    match kind {
        BackupKind::Asset => format!("{filename}{BACKUP_SUFFIX}"),
        BackupKind::Markup => {
            let (stem, ext) = split_name(filename);
            format!(
                "{}_{}{}{}",
                stem,
                now.format("%Y%m%d%H%M%S"),
                ext,
                BACKUP_SUFFIX
            )
        }
    }
}

/// Copy bytes, permissions and modification time.
///
/// Works for read-only sources: the copy inherits their mode, so an older
/// backup at `dest` is removed rather than written through, and the mtime
/// is set through a read-only handle.
fn copy_preserving(src: &Path, dest: &Path) -> Result<()> {
    if dest.is_file() {
        fs::remove_file(dest)
            .with_context(|| format!("Failed to replace old backup: {}", dest.display()))?;
    }

    fs::copy(src, dest).with_context(|| {
        format!("Failed to back up {} to {}", src.display(), dest.display())
    })?;

    if let Ok(modified) = fs::metadata(src).and_then(|m| m.modified()) {
        File::open(dest)
            .and_then(|f| f.set_modified(modified))
            .with_context(|| format!("Failed to set modification time: {}", dest.display()))?;
    }

    Ok(())
}
