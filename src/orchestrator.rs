//! Top-level build sequencing.
//!
//! Phases run strictly in order: stage the install-root layout, build the
//! toolchain, build the system packages, then generate the static system
//! configuration and bootloader artifacts. The first failure in a phase
//! aborts the phase, and a failed phase aborts the run — later packages
//! depend on a complete toolchain, so there is no partial-success mode.

use anyhow::{bail, Context, Result};
use std::fs;
use tracing::{debug, info};

use crate::bootloader;
use crate::builder::PackageBuilder;
use crate::config::Manifest;
use crate::rootfs;
use crate::sysconfig;

pub struct Orchestrator {
    manifest: Manifest,
    builder: PackageBuilder,
}

impl Orchestrator {
    pub fn new(manifest: Manifest) -> Self {
        let builder = PackageBuilder::new(
            manifest.build.sources_dir.clone(),
            manifest.build.lfs_dir.clone(),
            manifest.build.jobs,
        );
        Self { manifest, builder }
    }

    /// Run the whole build.
    pub fn build(&self) -> Result<()> {
        info!(
            "starting build of {} {}",
            self.manifest.meta.name, self.manifest.meta.version
        );

        self.stage_environment()?;
        self.build_toolchain()?;
        self.build_system_packages()?;

        let root = &self.manifest.build.lfs_dir;
        sysconfig::write_system_config(root, &self.manifest.meta)?;
        sysconfig::write_system_users(root, &self.manifest.users.system)?;
        bootloader::write_grub_config(root, &self.manifest.meta)?;

        info!("build complete: {}", root.display());
        Ok(())
    }

    /// Create the working directories and the install-root skeleton.
    fn stage_environment(&self) -> Result<()> {
        for dir in [
            &self.manifest.build.lfs_dir,
            &self.manifest.build.sources_dir,
            &self.manifest.build.tools_dir,
        ] {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            debug!("created directory {}", dir.display());
        }
        rootfs::stage_layout(&self.manifest.build.lfs_dir)
            .context("failed to stage install-root layout")?;
        Ok(())
    }

    /// Build the cross-compilation toolchain.
    ///
    /// Every declared archive is fetched up front, so a flaky mirror fails
    /// the run before any compile time is spent. Entries without build
    /// steps only declare a fetch or document a dependency and are skipped.
    pub fn build_toolchain(&self) -> Result<()> {
        info!("building cross-compilation toolchain");

        let packages = &self.manifest.toolchain_packages;
        if packages.is_empty() {
            bail!("no toolchain packages declared in configuration");
        }

        for package in packages {
            self.builder.fetch(package).with_context(|| {
                format!("failed to fetch toolchain package {}", package.name)
            })?;
        }

        for package in packages {
            if package.is_metadata_only() {
                debug!("skipping metadata-only entry {}", package.name);
                continue;
            }
            self.builder.build(package).with_context(|| {
                format!("failed to build toolchain package {}", package.name)
            })?;
        }

        info!("toolchain build complete");
        Ok(())
    }

    /// Build the system package list in declared order.
    pub fn build_system_packages(&self) -> Result<()> {
        info!("building system packages");

        for package in &self.manifest.packages {
            self.builder
                .build(package)
                .with_context(|| format!("failed to build package {}", package.name))?;
        }

        info!("system packages build complete");
        Ok(())
    }
}
