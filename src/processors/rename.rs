use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

use super::fingerprint::{fingerprinted_name, has_fingerprint};
use super::{BackupKind, BackupStore, RunLog};
use crate::utils::hash::fingerprint_file;

/// Original file name → final file name, for every scanned asset.
///
/// Keys are bare file names, not paths, matching how markup refers to
/// assets. Unchanged assets map to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameMap {
    entries: BTreeMap<String, String>,
}

impl RenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mapping; a later entry for the same name wins
    pub fn insert(&mut self, old_name: impl Into<String>, new_name: impl Into<String>) {
        let old_name = old_name.into();
        let new_name = new_name.into();
        if let Some(previous) = self.entries.get(&old_name) {
            if *previous != new_name {
                tracing::warn!(
                    "Several assets are named {}; references will point to {}",
                    old_name,
                    new_name
                );
            }
        }
        self.entries.insert(old_name, new_name);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries whose name actually changed
    pub fn changed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(old, new)| old != new)
    }
}

/// What happened to one asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Name already carries the current fingerprint
    Unchanged { name: String },
    /// Moved (or, in a dry run, would be moved) to a new name
    Renamed {
        old_name: String,
        new_name: String,
        replaced_existing: bool,
    },
}

impl RenameOutcome {
    pub fn old_name(&self) -> &str {
        match self {
            RenameOutcome::Unchanged { name } => name,
            RenameOutcome::Renamed { old_name, .. } => old_name,
        }
    }

    pub fn new_name(&self) -> &str {
        match self {
            RenameOutcome::Unchanged { name } => name,
            RenameOutcome::Renamed { new_name, .. } => new_name,
        }
    }
}

/// Bring one asset's name in line with its content fingerprint.
///
/// On mismatch the file is backed up, any file already sitting at the
/// target name is deleted, and the asset is moved in place.
pub fn process_asset(
    path: &Path,
    backups: &BackupStore,
    log: &mut RunLog,
    dry_run: bool,
) -> Result<RenameOutcome> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Unsupported file name: {}", path.display()))?
        .to_string();

    let fingerprint = fingerprint_file(path)?;
    tracing::debug!("{} fingerprint {}", path.display(), fingerprint);

    if has_fingerprint(&filename, &fingerprint) {
        log.record(format!("Skipped (hash match): {filename}"));
        return Ok(RenameOutcome::Unchanged { name: filename });
    }

    let new_name = fingerprinted_name(&filename, &fingerprint);
    let new_path = path.with_file_name(&new_name);
    let replaced_existing = new_path.exists();

    if dry_run {
        log.record(format!("Would rename: {filename} -> {new_name}"));
        return Ok(RenameOutcome::Renamed {
            old_name: filename,
            new_name,
            replaced_existing,
        });
    }

    backups.backup(path, BackupKind::Asset, log)?;

    if replaced_existing {
        std::fs::remove_file(&new_path)
            .with_context(|| format!("Failed to remove existing file: {}", new_path.display()))?;
        log.record(format!("Removed existing file: {new_name}"));
    }

    std::fs::rename(path, &new_path).with_context(|| {
        format!("Failed to rename {} to {}", path.display(), new_path.display())
    })?;
    log.record(format!("Renamed: {filename} -> {new_name}"));

    Ok(RenameOutcome::Renamed {
        old_name: filename,
        new_name,
        replaced_existing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hash::fingerprint_bytes;
    use chrono::Local;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        backups: BackupStore,
        log: RunLog,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let backups = BackupStore::new(dir.path().join(".rename"));
        Fixture {
            dir,
            backups,
            log: RunLog::silent(Local::now()),
        }
    }

    #[test]
    fn test_renames_stale_suffix() {
        let mut fx = fixture();
        let path = fx.dir.path().join("app_deadbeef.js");
        fs::write(&path, "console.log(1)").unwrap();
        let fingerprint = fingerprint_bytes(b"console.log(1)");

        let outcome = process_asset(&path, &fx.backups, &mut fx.log, false).unwrap();

        let expected = format!("app_{fingerprint}.js");
        assert_eq!(outcome.new_name(), expected);
        assert!(!path.exists());
        assert_eq!(
            fs::read_to_string(fx.dir.path().join(&expected)).unwrap(),
            "console.log(1)"
        );
        assert_eq!(
            fs::read_to_string(fx.dir.path().join(".rename/app_deadbeef.js.bak")).unwrap(),
            "console.log(1)"
        );
        assert_eq!(fx.log.entries().len(), 2);
        assert_eq!(
            fx.log.entries()[1],
            format!("Renamed: app_deadbeef.js -> {expected}")
        );
    }

    #[test]
    fn test_skips_matching_fingerprint() {
        let mut fx = fixture();
        let fingerprint = fingerprint_bytes(b"body{}");
        let name = format!("style_{fingerprint}.css");
        let path = fx.dir.path().join(&name);
        fs::write(&path, "body{}").unwrap();

        let outcome = process_asset(&path, &fx.backups, &mut fx.log, false).unwrap();

        assert_eq!(outcome, RenameOutcome::Unchanged { name: name.clone() });
        assert!(path.exists());
        assert!(!fx.backups.dir().exists());
        assert_eq!(fx.log.entries(), [format!("Skipped (hash match): {name}")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_renames_read_only_asset() {
        use std::os::unix::fs::PermissionsExt;

        let mut fx = fixture();
        let path = fx.dir.path().join("app.js");
        fs::write(&path, "locked").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();

        let outcome = process_asset(&path, &fx.backups, &mut fx.log, false).unwrap();

        let new_path = fx.dir.path().join(outcome.new_name());
        assert_eq!(fs::read_to_string(&new_path).unwrap(), "locked");
        assert_eq!(
            fs::read_to_string(fx.backups.dir().join("app.js.bak")).unwrap(),
            "locked"
        );
    }

    #[test]
    fn test_uppercase_suffix_counts_as_match() {
        let mut fx = fixture();
        let fingerprint = fingerprint_bytes(b"x");
        let name = format!("a_{}.js", fingerprint.to_ascii_uppercase());
        let path = fx.dir.path().join(&name);
        fs::write(&path, "x").unwrap();

        let outcome = process_asset(&path, &fx.backups, &mut fx.log, false).unwrap();
        assert!(matches!(outcome, RenameOutcome::Unchanged { .. }));
    }

    #[test]
    fn test_existing_destination_is_replaced() {
        let mut fx = fixture();
        let fingerprint = fingerprint_bytes(b"new");
        let target = fx.dir.path().join(format!("app_{fingerprint}.js"));
        let path = fx.dir.path().join("app.js");
        fs::write(&path, "new").unwrap();
        // Leftover file already occupying the target name
        fs::write(&target, "stale bytes").unwrap();

        let outcome = process_asset(&path, &fx.backups, &mut fx.log, false).unwrap();

        assert!(matches!(
            outcome,
            RenameOutcome::Renamed {
                replaced_existing: true,
                ..
            }
        ));
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert!(fx
            .log
            .entries()
            .contains(&format!("Removed existing file: app_{fingerprint}.js")));
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let mut fx = fixture();
        let path = fx.dir.path().join("app.js");
        fs::write(&path, "x").unwrap();

        let outcome = process_asset(&path, &fx.backups, &mut fx.log, true).unwrap();

        assert!(matches!(outcome, RenameOutcome::Renamed { .. }));
        assert!(path.exists());
        assert!(!fx.backups.dir().exists());
        assert!(fx.log.entries()[0].starts_with("Would rename: app.js -> app_"));
    }

    #[test]
    fn test_map_tracks_changes() {
        let mut map = RenameMap::new();
        map.insert("a.js", "a_11111111.js");
        map.insert("b_22222222.css", "b_22222222.css");

        assert_eq!(map.iter().count(), 2);
        assert_eq!(map.changed().collect::<Vec<_>>(), vec![("a.js", "a_11111111.js")]);
    }

    #[test]
    fn test_map_last_insert_wins() {
        let mut map = RenameMap::new();
        map.insert("app.js", "app_11111111.js");
        map.insert("app.js", "app_22222222.js");
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("app.js", "app_22222222.js")]);
    }
}
