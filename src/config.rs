//! Configuration management for windfall.
//!
//! The build is declared in a TOML manifest (`[meta]`, `[build]`, `[users]`,
//! `[[packages]]`). The `[build]` table may reference two further manifests:
//! the toolchain package list and the system package list, both resolved
//! relative to the main manifest. Environment variables (optionally from a
//! `.env` file) override the cache and install locations after load.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::digest::Checksum;

/// Fully loaded build manifest.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Manifest {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub users: Users,
    /// System packages, built after the toolchain.
    #[serde(default)]
    pub packages: Vec<Package>,
    /// Debug-level logging requested by the manifest.
    #[serde(default)]
    pub debug: bool,
    /// Toolchain packages, merged in from the external toolchain manifest.
    #[serde(skip)]
    pub toolchain_packages: Vec<Package>,
}

/// Distribution identity.
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    #[serde(default = "default_distro_name")]
    pub name: String,
    #[serde(default = "default_distro_version")]
    pub version: String,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            name: default_distro_name(),
            version: default_distro_version(),
        }
    }
}

/// `[build]` settings with their historical key names.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    #[serde(default = "default_lfs_dir")]
    pub lfs_dir: PathBuf,
    #[serde(default = "default_sources_dir")]
    pub sources_dir: PathBuf,
    #[serde(default = "default_tools_dir")]
    pub tools_dir: PathBuf,
    #[serde(default = "default_lfs_version")]
    pub version: String,
    #[serde(default = "default_toolchain_config")]
    pub toolchain_config: PathBuf,
    #[serde(default = "default_lfs_config")]
    pub lfs_config: PathBuf,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            lfs_dir: default_lfs_dir(),
            sources_dir: default_sources_dir(),
            tools_dir: default_tools_dir(),
            version: default_lfs_version(),
            toolchain_config: default_toolchain_config(),
            lfs_config: default_lfs_config(),
        }
    }
}

/// `[users]` table: the build user plus declared system users.
#[derive(Debug, Clone, Deserialize)]
pub struct Users {
    #[serde(default = "default_lfs_user")]
    pub lfs_user: String,
    #[serde(default = "default_lfs_user")]
    pub lfs_group: String,
    #[serde(default)]
    pub system: Vec<SystemUser>,
}

impl Default for Users {
    fn default() -> Self {
        Self {
            lfs_user: default_lfs_user(),
            lfs_group: default_lfs_user(),
            system: Vec::new(),
        }
    }
}

/// A system user to materialize in the generated passwd/group files.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemUser {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub home: String,
    pub shell: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

/// One declared package: where to get it and how to build it.
///
/// An entry with no build steps (or an empty list) is metadata-only: its
/// archive is fetched when declared in the toolchain list, but it is never
/// passed to the step-execution path.
#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub url: String,
    /// MD5 digest of the source archive (the format's default algorithm).
    #[serde(default, alias = "md5")]
    pub hash: Option<String>,
    /// SHA-256 digest; preferred over `hash` when both are declared.
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default, alias = "build_commands")]
    pub build: Option<Vec<String>>,
}

impl Package {
    /// True if this entry only documents a dependency or triggers a fetch.
    pub fn is_metadata_only(&self) -> bool {
        self.build.as_ref().map_or(true, |steps| steps.is_empty())
    }

    /// Ordered build steps, empty for metadata-only entries.
    pub fn build_steps(&self) -> &[String] {
        self.build.as_deref().unwrap_or(&[])
    }

    /// The declared checksum, if any.
    pub fn checksum(&self) -> Option<Checksum> {
        if let Some(hex) = &self.sha256 {
            Some(Checksum::sha256(hex.clone()))
        } else {
            self.hash.as_ref().map(|hex| Checksum::md5(hex.clone()))
        }
    }

    /// Archive filename derived from the URL's final path segment.
    pub fn archive_name(&self) -> Option<&str> {
        self.url.rsplit('/').next().filter(|s| !s.is_empty())
    }
}

impl Manifest {
    /// Load the manifest at `path`, merge the external package manifests it
    /// references, and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut manifest: Manifest = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        manifest.load_external(base);
        manifest.apply_env_overrides();
        Ok(manifest)
    }

    /// Merge the toolchain and system-package manifests referenced from
    /// `[build]`. A missing or unparsable external file is a warning, not a
    /// fatal error: small configurations build without either.
    fn load_external(&mut self, base: &Path) {
        #[derive(Deserialize)]
        struct ToolchainFile {
            #[serde(default)]
            packages: Vec<Package>,
        }

        #[derive(Deserialize)]
        struct SystemFile {
            #[serde(default)]
            lfs_packages: Vec<Package>,
        }

        let toolchain_path = base.join(&self.build.toolchain_config);
        if toolchain_path.exists() {
            match read_toml::<ToolchainFile>(&toolchain_path) {
                Ok(file) => {
                    info!("loaded {} toolchain packages", file.packages.len());
                    self.toolchain_packages = file.packages;
                }
                Err(e) => warn!("failed to load toolchain config: {e:#}"),
            }
        }

        let system_path = base.join(&self.build.lfs_config);
        if system_path.exists() {
            match read_toml::<SystemFile>(&system_path) {
                Ok(file) => {
                    info!("loaded {} system packages", file.lfs_packages.len());
                    self.packages.extend(file.lfs_packages);
                }
                Err(e) => warn!("failed to load system package config: {e:#}"),
            }
        }
    }

    /// Environment variables override the manifest's paths and job count.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("WINDFALL_LFS_DIR") {
            self.build.lfs_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("WINDFALL_SOURCES_DIR") {
            self.build.sources_dir = PathBuf::from(dir);
        }
        if let Ok(jobs) = std::env::var("WINDFALL_JOBS") {
            match jobs.parse() {
                Ok(n) => self.build.jobs = n,
                Err(_) => warn!("ignoring non-numeric WINDFALL_JOBS={jobs}"),
            }
        }
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn default_distro_name() -> String {
    "WindfallLinux".to_string()
}

fn default_distro_version() -> String {
    "1.0".to_string()
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_lfs_dir() -> PathBuf {
    PathBuf::from("/mnt/lfs")
}

fn default_sources_dir() -> PathBuf {
    PathBuf::from("/sources")
}

fn default_tools_dir() -> PathBuf {
    PathBuf::from("/tools")
}

fn default_lfs_version() -> String {
    "12.2".to_string()
}

fn default_toolchain_config() -> PathBuf {
    PathBuf::from("LFS/toolchain.toml")
}

fn default_lfs_config() -> PathBuf {
    PathBuf::from("LFS/lfs_build.toml")
}

fn default_lfs_user() -> String {
    "lfs".to_string()
}
