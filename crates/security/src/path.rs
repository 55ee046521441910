//! Path sandbox — filesystem containment to the workspace root.
//!
//! Two levels of guard:
//!
//! 1. [`resolve`]: lexical. Rejects any path with a `..` segment (after
//!    normalizing `\` to `/`) before the filesystem is touched, and joins the
//!    rest under the root.
//! 2. [`resolve_contained`]: additionally canonicalizes the deepest existing
//!    ancestor of the target and checks it is still under the canonical root,
//!    which catches symlinks pointing outside the workspace.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Error returned when a path would leave the workspace.
#[derive(Debug, thiserror::Error)]
pub enum PathEscapeError {
    #[error("Access to parent directories ('../') is not allowed: '{path}'")]
    ParentTraversal { path: String },

    #[error("Path '{path}' is outside the workspace root")]
    OutsideRoot { path: String },

    #[error("Failed to canonicalize path '{path}': {reason}")]
    CanonicalizeFailed { path: String, reason: String },
}

/// Reject any path that contains a `..` segment, whichever separator style
/// it uses. Only whole segments count: `..hidden` and `a..b` are fine.
pub fn check_segments(path: &str) -> Result<(), PathEscapeError> {
    let normalized = path.replace('\\', "/");
    if normalized.split('/').any(|segment| segment == "..") {
        warn!(path = %path, "Rejected parent-directory traversal");
        return Err(PathEscapeError::ParentTraversal { path: path.into() });
    }
    Ok(())
}

/// Resolve `relative` under `root` without touching the filesystem.
///
/// Absolute inputs are accepted only when they already lie under `root`.
pub fn resolve(root: &Path, relative: &str) -> Result<PathBuf, PathEscapeError> {
    check_segments(relative)?;

    let candidate = Path::new(relative);
    let joined = if candidate.is_absolute() {
        if !candidate.starts_with(root) {
            warn!(path = %relative, root = %root.display(), "Rejected absolute path outside root");
            return Err(PathEscapeError::OutsideRoot {
                path: relative.into(),
            });
        }
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };

    // Drop `.` components so reported paths read cleanly.
    Ok(joined
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}

/// Resolve `relative` under `root` and verify, through canonicalization,
/// that the result cannot escape the root via symlinks.
///
/// The target itself does not need to exist (writes create files); its
/// deepest existing ancestor is canonicalized instead.
pub fn resolve_contained(root: &Path, relative: &str) -> Result<PathBuf, PathEscapeError> {
    let resolved = resolve(root, relative)?;

    let canonical_root =
        root.canonicalize()
            .map_err(|e| PathEscapeError::CanonicalizeFailed {
                path: root.display().to_string(),
                reason: e.to_string(),
            })?;
    let canonical = canonicalize_existing_prefix(&resolved, relative)?;

    if !canonical.starts_with(&canonical_root) {
        warn!(path = %relative, resolved = %canonical.display(), "Rejected path escaping the workspace");
        return Err(PathEscapeError::OutsideRoot {
            path: relative.into(),
        });
    }

    Ok(canonical)
}

fn canonicalize_existing_prefix(path: &Path, original: &str) -> Result<PathBuf, PathEscapeError> {
    let mut existing = path;
    let mut missing: Vec<OsString> = Vec::new();

    // symlink_metadata so a dangling link counts as existing and fails to
    // canonicalize instead of being written through.
    while existing.symlink_metadata().is_err() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut canonical =
        existing
            .canonicalize()
            .map_err(|e| PathEscapeError::CanonicalizeFailed {
                path: original.into(),
                reason: e.to_string(),
            })?;
    for name in missing.iter().rev() {
        canonical.push(name);
    }
    Ok(canonical)
}
