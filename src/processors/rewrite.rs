use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::Path;

use super::{BackupKind, BackupStore, RenameMap, RunLog};

/// Replace every old asset name in `content` with its new name.
///
/// Plain text substitution in a single left-to-right pass: at each position
/// the longest matching old name wins, and substituted text is never
/// scanned again. The result does not depend on map order, and a new name
/// that contains some other old name is left alone.
pub fn rewrite_references<'a>(content: &'a str, map: &RenameMap) -> Cow<'a, str> {
    let mut pairs: Vec<(&str, &str)> = map.changed().filter(|(old, _)| !old.is_empty()).collect();
    if pairs.is_empty() {
        return Cow::Borrowed(content);
    }
    pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

    let mut out = String::with_capacity(content.len());
    let mut copied_to = 0;
    let mut pos = 0;
    let mut replaced = false;

    while pos < content.len() {
        let rest = &content[pos..];
        match pairs.iter().find(|(old, _)| rest.starts_with(*old)) {
            Some((old, new)) => {
                out.push_str(&content[copied_to..pos]);
                out.push_str(new);
                pos += old.len();
                copied_to = pos;
                replaced = true;
            }
            None => {
                pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if !replaced {
        return Cow::Borrowed(content);
    }
    out.push_str(&content[copied_to..]);
    Cow::Owned(out)
}

/// Rewrite references inside one markup file.
///
/// Files that need no substitution are left alone without a backup or log
/// entry. Returns whether the file changed.
pub fn update_references(
    path: &Path,
    map: &RenameMap,
    backups: &BackupStore,
    log: &mut RunLog,
    dry_run: bool,
) -> Result<bool> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read markup file: {}", path.display()))?;

    let rewritten = match rewrite_references(&content, map) {
        Cow::Borrowed(_) => {
            tracing::debug!("No references to update in {}", path.display());
            return Ok(false);
        }
        Cow::Owned(rewritten) => rewritten,
    };

    if dry_run {
        log.record(format!("Would update references in {}", path.display()));
        return Ok(true);
    }

    backups.backup(path, BackupKind::Markup, log)?;
    std::fs::write(path, rewritten)
        .with_context(|| format!("Failed to write markup file: {}", path.display()))?;
    log.record(format!("Updated references in {}", path.display()));

    Ok(true)
}
