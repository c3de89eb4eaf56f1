//! Parsing of fingerprinted file names.
//!
//! A fingerprinted name looks like `app_deadbeef.js`: the stem ends with an
//! underscore followed by exactly eight hex digits, right before the
//! extension.

use crate::utils::hash::FINGERPRINT_LEN;

/// Split a file name into stem and extension at the last dot.
///
/// The extension keeps its leading dot. Names without a dot, or whose only
/// dot is the leading one (`.env`), have an empty extension.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => name.split_at(idx),
    }
}

/// Split a trailing `_<8 hex>` fingerprint off a stem.
///
/// Returns the remaining stem and the fingerprint lowercased.
pub fn split_fingerprint(stem: &str) -> Option<(&str, String)> {
    let suffix_len = FINGERPRINT_LEN + 1;
    if stem.len() < suffix_len || !stem.is_char_boundary(stem.len() - suffix_len) {
        return None;
    }

    let (rest, suffix) = stem.split_at(stem.len() - suffix_len);
    let digits = suffix.strip_prefix('_')?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    Some((rest, digits.to_ascii_lowercase()))
}

/// Extract the fingerprint embedded in a file name, if any.
///
/// Returns the stem without its suffix and the lowercased fingerprint.
pub fn extract_fingerprint(name: &str) -> Option<(&str, String)> {
    let (stem, _) = split_name(name);
    split_fingerprint(stem)
}

/// Remove a trailing `_<8 hex>` fingerprint from a stem
pub fn strip_fingerprint(stem: &str) -> &str {
    split_fingerprint(stem).map_or(stem, |(rest, _)| rest)
}

/// Build the name a file should carry for the given fingerprint
pub fn fingerprinted_name(name: &str, fingerprint: &str) -> String {
    let (stem, ext) = split_name(name);
    format!("{}_{}{}", strip_fingerprint(stem), fingerprint, ext)
}

/// Whether the name already embeds this fingerprint (case-insensitive)
pub fn has_fingerprint(name: &str, fingerprint: &str) -> bool {
    extract_fingerprint(name).is_some_and(|(_, embedded)| embedded.eq_ignore_ascii_case(fingerprint))
}
