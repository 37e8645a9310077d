//! Per-package build driver.
//!
//! One package build walks fetch → extract → locate tree → run steps →
//! cleanup. The extracted tree is removed whatever the step outcome, so a
//! multi-hundred-package run never accumulates source trees on disk.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::config::Package;
use crate::environment;
use crate::error::BuildError;
use crate::extract::extract_archive;
use crate::fetch::fetch_source;
use crate::process::shell_with_env;

/// Builds packages against a shared source cache and install root.
pub struct PackageBuilder {
    sources_dir: PathBuf,
    install_root: PathBuf,
    jobs: usize,
}

impl PackageBuilder {
    pub fn new(sources_dir: PathBuf, install_root: PathBuf, jobs: usize) -> Self {
        Self {
            sources_dir,
            install_root,
            jobs,
        }
    }

    /// Path the package's archive occupies in the source cache.
    pub fn archive_path(&self, package: &Package) -> Result<PathBuf, BuildError> {
        let name = package.archive_name().ok_or_else(|| BuildError::Fetch {
            url: package.url.clone(),
            reason: "URL has no filename component".to_string(),
        })?;
        Ok(self.sources_dir.join(name))
    }

    /// Fetch the package's archive into the cache if it is not already there.
    pub fn fetch(&self, package: &Package) -> Result<(), BuildError> {
        let dest = self.archive_path(package)?;
        fetch_source(&package.url, &dest, package.checksum().as_ref())
    }

    /// Build one package, start to finish.
    pub fn build(&self, package: &Package) -> Result<(), BuildError> {
        info!("building {} {}", package.name, package.version);

        self.fetch(package)?;
        let archive = self.archive_path(package)?;

        // Fresh-extract guarantee: a stale tree from an earlier attempt is
        // never reused.
        let canonical_tree = self
            .sources_dir
            .join(format!("{}-{}", package.name, package.version));
        if canonical_tree.exists() {
            debug!("removing stale tree {}", canonical_tree.display());
            fs::remove_dir_all(&canonical_tree)?;
        }

        extract_archive(&archive, &self.sources_dir)?;

        let tree = locate_source_tree(&self.sources_dir, &package.name, &package.version)?;
        debug!("source tree: {}", tree.display());

        let env = environment::build_env(&self.install_root, self.jobs);

        let mut outcome = Ok(());
        for (index, command) in package.build_steps().iter().enumerate() {
            debug!("[{}] step {}: {}", package.name, index, command);
            match shell_with_env(command, &tree, &env) {
                Ok(result) if result.success() => {}
                Ok(result) => {
                    error!(
                        "step failed for {} (exit {}):\n{}",
                        package.name,
                        result.code(),
                        result.stderr_trimmed()
                    );
                    outcome = Err(BuildError::Step {
                        package: package.name.clone(),
                        index,
                        command: command.clone(),
                        code: result.code(),
                        stderr: result.stderr,
                    });
                    break;
                }
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }

        // Cleanup runs on every path out of the step loop.
        if let Err(e) = fs::remove_dir_all(&tree) {
            debug!("could not remove {}: {}", tree.display(), e);
        }

        if outcome.is_ok() {
            info!("built {} {}", package.name, package.version);
        }
        outcome
    }
}

/// Pick the extracted tree for a package out of the shared source directory.
///
/// Archives do not always unpack to `<name>-<version>`, so selection is
/// heuristic: prefer directories whose name contains both the package name
/// and version, then fall back to a prefix match on the name alone.
/// Candidates are sorted so selection is deterministic.
pub fn locate_source_tree(
    sources_dir: &Path,
    name: &str,
    version: &str,
) -> Result<PathBuf, BuildError> {
    let dirs = list_dirs(sources_dir)?;

    let mut candidates: Vec<&PathBuf> = dirs
        .iter()
        .filter(|d| {
            let n = dir_name(d);
            n.contains(name) && n.contains(version)
        })
        .collect();

    if candidates.is_empty() {
        candidates = dirs
            .iter()
            .filter(|d| dir_name(d).starts_with(name))
            .collect();
    }

    candidates.sort();
    candidates
        .first()
        .map(|p| (*p).clone())
        .ok_or_else(|| BuildError::TreeNotFound {
            name: name.to_string(),
            version: version.to_string(),
            dir: sources_dir.to_path_buf(),
        })
}

fn list_dirs(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mkdirs(base: &Path, names: &[&str]) {
        for name in names {
            fs::create_dir_all(base.join(name)).unwrap();
        }
    }

    #[test]
    fn test_locate_prefers_name_and_version_match() {
        let temp = TempDir::new().unwrap();
        mkdirs(temp.path(), &["foo-1.2", "foo-extra"]);

        let tree = locate_source_tree(temp.path(), "foo", "1.2").unwrap();
        assert_eq!(tree, temp.path().join("foo-1.2"));
    }

    #[test]
    fn test_locate_falls_back_to_prefix_match() {
        let temp = TempDir::new().unwrap();
        mkdirs(temp.path(), &["foo-extra"]);

        let tree = locate_source_tree(temp.path(), "foo", "1.2").unwrap();
        assert_eq!(tree, temp.path().join("foo-extra"));
    }

    #[test]
    fn test_locate_fails_with_no_candidates() {
        let temp = TempDir::new().unwrap();
        mkdirs(temp.path(), &["bar-1.0"]);

        let err = locate_source_tree(temp.path(), "foo", "1.2").unwrap_err();
        assert!(matches!(err, BuildError::TreeNotFound { .. }));
    }

    #[test]
    fn test_locate_ignores_plain_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("foo-1.2.tar.gz"), b"archive").unwrap();
        mkdirs(temp.path(), &["foo-1.2"]);

        let tree = locate_source_tree(temp.path(), "foo", "1.2").unwrap();
        assert_eq!(tree, temp.path().join("foo-1.2"));
    }

    #[test]
    fn test_locate_is_deterministic() {
        let temp = TempDir::new().unwrap();
        mkdirs(temp.path(), &["foo-1.2-rc2", "foo-1.2"]);

        let tree = locate_source_tree(temp.path(), "foo", "1.2").unwrap();
        assert_eq!(tree, temp.path().join("foo-1.2"));
    }

    #[test]
    fn test_archive_path_requires_filename() {
        let builder = PackageBuilder::new("/sources".into(), "/mnt/lfs".into(), 1);
        let pkg = Package {
            name: "foo".into(),
            version: "1.0".into(),
            url: "https://example.org/downloads/".into(),
            hash: None,
            sha256: None,
            build: None,
        };
        assert!(matches!(
            builder.archive_path(&pkg),
            Err(BuildError::Fetch { .. })
        ));
    }
}
