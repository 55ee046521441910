//! Workspace snapshot — a one-time text digest of the sandbox root.
//!
//! Small files are inlined, larger ones are listed with their size.
//! Version-control metadata (`.git`, `.github`) is skipped.

use std::path::Path;
use walkdir::{DirEntry, WalkDir};

const SKIPPED_PREFIXES: [&str; 2] = [".git", ".github"];

fn is_vcs_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && SKIPPED_PREFIXES.iter().any(|name| entry.file_name() == *name)
}

fn is_vcs_file(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    SKIPPED_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

fn relative_display(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Walk `root` and summarize every regular file.
///
/// Files of at most `max_file_size` bytes appear as `path:\n<content>\n---`;
/// larger files as `path (size: N bytes, skipped)`. Within a directory,
/// files come before subdirectories, each sorted by name.
pub fn analyze_workspace(root: &Path, max_file_size: u64) -> String {
    let walker = WalkDir::new(root)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_entry(|entry| !is_vcs_dir(entry));

    let mut summary = Vec::new();
    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_file() || is_vcs_file(&entry) {
            continue;
        }
        let rel = relative_display(root, entry.path());

        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                summary.push(format!("{rel} (error reading: {e})"));
                continue;
            }
        };

        if size > max_file_size {
            summary.push(format!("{rel} (size: {size} bytes, skipped)"));
            continue;
        }

        match std::fs::read(entry.path()) {
            Ok(bytes) => {
                let content = String::from_utf8_lossy(&bytes);
                summary.push(format!("{rel}:\n{content}\n---"));
            }
            Err(e) => summary.push(format!("{rel} (error reading: {e})")),
        }
    }

    summary.join("\n")
}
