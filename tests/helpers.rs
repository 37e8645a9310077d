//! Shared test utilities for windfall tests.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use windfall::config::{Manifest, Package};

/// Test environment with temporary directories for the source cache and
/// install root.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Shared source cache
    pub sources_dir: PathBuf,
    /// Install root the build stages into
    pub install_root: PathBuf,
    /// Tools directory
    pub tools_dir: PathBuf,
}

impl TestEnv {
    /// Create a new test environment with temporary directories.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let sources_dir = base.join("sources");
        let install_root = base.join("lfs");
        let tools_dir = base.join("tools");

        fs::create_dir_all(&sources_dir).expect("Failed to create sources dir");
        fs::create_dir_all(&install_root).expect("Failed to create install root");

        Self {
            _temp_dir: temp_dir,
            sources_dir,
            install_root,
            tools_dir,
        }
    }

    /// Manifest wired to this environment's directories, single-job.
    pub fn manifest(&self, toolchain: Vec<Package>, packages: Vec<Package>) -> Manifest {
        let mut manifest = Manifest::default();
        manifest.build.jobs = 1;
        manifest.build.lfs_dir = self.install_root.clone();
        manifest.build.sources_dir = self.sources_dir.clone();
        manifest.build.tools_dir = self.tools_dir.clone();
        manifest.toolchain_packages = toolchain;
        manifest.packages = packages;
        manifest
    }

    /// Seed the source cache with `<name>-<version>.tar.gz` unpacking to
    /// `<top>/README`.
    pub fn seed_archive(&self, name: &str, version: &str, top: &str) {
        let path = self.sources_dir.join(format!("{name}-{version}.tar.gz"));
        write_targz(&path, top);
    }
}

/// Write a gzipped tar archive containing `<top>/README` at `path`.
pub fn write_targz(path: &Path, top: &str) {
    let file = File::create(path).expect("Failed to create archive");
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let body = b"test fixture\n";
    let mut header = tar::Header::new_gnu();
    header.set_size(body.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, format!("{top}/README"), &body[..])
        .expect("Failed to append archive entry");
    builder
        .into_inner()
        .expect("Failed to finish tar")
        .finish()
        .expect("Failed to finish gzip");
}

/// A package whose archive lives at an unroutable URL; tests seed the
/// source cache instead of fetching.
pub fn package(name: &str, version: &str, steps: &[&str]) -> Package {
    Package {
        name: name.to_string(),
        version: version.to_string(),
        url: format!("http://invalid.invalid/sources/{name}-{version}.tar.gz"),
        hash: None,
        sha256: None,
        build: if steps.is_empty() {
            None
        } else {
            Some(steps.iter().map(|s| s.to_string()).collect())
        },
    }
}

/// Assert that a file contains expected content.
pub fn assert_file_contains(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    assert!(
        content.contains(expected),
        "File {} does not contain expected content.\nExpected to find: {}\nActual content: {}",
        path.display(),
        expected,
        content
    );
}
