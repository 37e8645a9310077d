//! Install-root directory staging.
//!
//! Creates the standard top-level Unix hierarchy with a merged-usr layout:
//! the real directories live under `usr/`, and the historical top-level
//! paths are compatibility symlinks.

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::BuildError;

const LAYOUT_DIRS: &[&str] = &[
    "boot", "etc", "home", "mnt", "opt", "proc", "root", "run", "srv", "sys", "tmp", "usr/bin",
    "usr/lib", "usr/sbin", "var", "var/log",
];

/// (link, target) pairs, relative to the install root.
const COMPAT_SYMLINKS: &[(&str, &str)] = &[
    ("bin", "usr/bin"),
    ("sbin", "usr/sbin"),
    ("lib", "usr/lib"),
    ("lib64", "usr/lib"),
    ("usr/lib64", "lib"),
];

/// Create the install root's directory skeleton and compatibility symlinks.
/// Safe to call repeatedly; existing correct entries are left alone.
pub fn stage_layout(root: &Path) -> Result<(), BuildError> {
    for dir in LAYOUT_DIRS {
        fs::create_dir_all(root.join(dir))?;
    }
    for (link, target) in COMPAT_SYMLINKS {
        ensure_symlink(&root.join(link), target)?;
    }
    Ok(())
}

/// Idempotently ensure `link` is a symlink to `target`.
///
/// A link that already exists in the expected form is success, the same as
/// creating it. Any other entry at `link` — a file, a directory, or a
/// symlink to somewhere else — is a conflict the caller must resolve, not
/// something to silently skip.
pub fn ensure_symlink(link: &Path, target: &str) -> Result<(), BuildError> {
    match fs::symlink_metadata(link) {
        Ok(meta) if meta.file_type().is_symlink() => {
            let current = fs::read_link(link)?;
            if current == Path::new(target) {
                debug!("symlink {} already correct", link.display());
                Ok(())
            } else {
                Err(BuildError::SymlinkConflict {
                    path: link.to_path_buf(),
                    target: target.into(),
                })
            }
        }
        Ok(_) => Err(BuildError::SymlinkConflict {
            path: link.to_path_buf(),
            target: target.into(),
        }),
        Err(_) => {
            std::os::unix::fs::symlink(target, link)?;
            Ok(())
        }
    }
}
