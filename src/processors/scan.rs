use anyhow::Result;
use globset::GlobSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// What the scanner skips besides non-matching suffixes
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    /// Directory pruned from the walk (normally the backup directory)
    pub skip_dir: Option<PathBuf>,
    /// Patterns matched against paths relative to the root
    pub exclude: GlobSet,
}

/// Lazily walk `root` for files whose name ends with one of `suffixes`.
///
/// Symlinks to files are listed like regular files. Order is whatever the
/// filesystem yields. Walk errors (unreadable directories and the like)
/// are passed through to the caller.
pub fn find_files<'a>(
    root: &'a Path,
    suffixes: &'a [String],
    filter: &'a ScanFilter,
) -> impl Iterator<Item = Result<PathBuf>> + 'a {
    let skip_dir = filter.skip_dir.as_deref().map(|dir| SkipDir {
        path: dir,
        canonical: dir.canonicalize().ok(),
    });

    WalkDir::new(root)
        .into_iter()
        .filter_entry(move |entry| !skip_dir.as_ref().is_some_and(|dir| dir.matches(entry)))
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                if !has_suffix(&entry, suffixes) || !entry.path().is_file() {
                    return None;
                }
                let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                if filter.exclude.is_match(relative) {
                    tracing::debug!("Excluded: {}", relative.display());
                    return None;
                }
                Some(Ok(entry.into_path()))
            }
            Err(e) => Some(Err(anyhow::Error::new(e)
                .context(format!("Failed to scan directory: {}", root.display())))),
        })
}

struct SkipDir<'a> {
    path: &'a Path,
    canonical: Option<PathBuf>,
}

impl SkipDir<'_> {
    /// Same directory, however the root and the skip path were spelled
    fn matches(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        if entry.path() == self.path {
            return true;
        }
        self.canonical
            .as_deref()
            .is_some_and(|canonical| entry.path().canonicalize().is_ok_and(|p| p == canonical))
    }
}

fn has_suffix(entry: &DirEntry, suffixes: &[String]) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use globset::{Glob, GlobSetBuilder};
    use std::fs;
    use tempfile::TempDir;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn collect(root: &Path, suffixes: &[String], filter: &ScanFilter) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = find_files(root, suffixes, filter)
            .collect::<Result<_>>()
            .unwrap();
        files.sort();
        files
    }

    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("js/lib")).unwrap();
        fs::create_dir_all(root.join(".rename")).unwrap();
        fs::write(root.join("js/app.js"), "a").unwrap();
        fs::write(root.join("js/lib/util.js"), "b").unwrap();
        fs::write(root.join("style.css"), "c").unwrap();
        fs::write(root.join("index.html"), "d").unwrap();
        fs::write(root.join("notes.jsx"), "e").unwrap();
        fs::write(root.join(".rename/old.js"), "f").unwrap();
        temp_dir
    }

    #[test]
    fn test_recursive_suffix_match() {
        let temp_dir = fixture();
        let root = temp_dir.path();

        let files = collect(root, &exts(&[".js", ".css"]), &ScanFilter::default());
        assert_eq!(
            files,
            vec![
                root.join(".rename/old.js"),
                root.join("js/app.js"),
                root.join("js/lib/util.js"),
                root.join("style.css"),
            ]
        );
    }

    #[test]
    fn test_skip_dir_is_pruned() {
        let temp_dir = fixture();
        let root = temp_dir.path();
        let filter = ScanFilter {
            skip_dir: Some(root.join(".rename")),
            ..Default::default()
        };

        let files = collect(root, &exts(&[".js"]), &filter);
        assert_eq!(files, vec![root.join("js/app.js"), root.join("js/lib/util.js")]);
    }

    #[test]
    fn test_exclude_globs() {
        let temp_dir = fixture();
        let root = temp_dir.path();
        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new("js/lib/**").unwrap());
        let filter = ScanFilter {
            skip_dir: Some(root.join(".rename")),
            exclude: builder.build().unwrap(),
        };

        let files = collect(root, &exts(&[".js"]), &filter);
        assert_eq!(files, vec![root.join("js/app.js")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_listed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("shared")).unwrap();
        fs::write(root.join("shared/real.txt"), "x").unwrap();
        std::os::unix::fs::symlink(root.join("shared/real.txt"), root.join("app.js")).unwrap();
        std::os::unix::fs::symlink(root.join("shared"), root.join("dir.js")).unwrap();

        let files = collect(root, &exts(&[".js"]), &ScanFilter::default());
        assert_eq!(files, vec![root.join("app.js")]);
    }

    #[test]
    fn test_skip_dir_matched_across_spellings() {
        let temp_dir = fixture();
        let real_root = temp_dir.path();
        // Walk through `js/..` so entry paths never equal the skip path textually
        let root = real_root.join("js").join("..");
        let filter = ScanFilter {
            skip_dir: Some(real_root.canonicalize().unwrap().join(".rename")),
            ..Default::default()
        };

        let files = collect(&root, &exts(&[".js"]), &filter);
        assert_eq!(
            files,
            vec![root.join("js/app.js"), root.join("js/lib/util.js")]
        );
    }

    #[test]
    fn test_markup_scan() {
        let temp_dir = fixture();
        let root = temp_dir.path();
        let files = collect(root, &exts(&[".html"]), &ScanFilter::default());
        assert_eq!(files, vec![root.join("index.html")]);
    }
}
