//! Build environment construction.
//!
//! Recipe steps run under a copy of the ambient environment with a fixed set
//! of overrides. The variable names are a stable contract with external
//! build tooling (configure scripts and Makefiles reference them directly),
//! so they must not be renamed.

use std::collections::BTreeMap;
use std::path::Path;

/// Installation root, exported to every recipe step.
pub const INSTALL_ROOT_VAR: &str = "LFS";
/// Cross-compilation target triple.
pub const TARGET_VAR: &str = "LFS_TGT";
/// Vendor/OS suffix appended to the host architecture.
const TARGET_SUFFIX: &str = "lfs-linux-gnu";
/// The only directories recipe steps may resolve tools from.
const RESTRICTED_PATH: &str = "/usr/bin:/bin";

/// Produce the environment for one package build.
///
/// Each call returns an independent map: overrides applied for one package
/// can never leak into another build.
pub fn build_env(install_root: &Path, jobs: usize) -> BTreeMap<String, String> {
    let mut env: BTreeMap<String, String> = std::env::vars().collect();
    env.insert(
        INSTALL_ROOT_VAR.to_string(),
        install_root.display().to_string(),
    );
    env.insert("LC_ALL".to_string(), "POSIX".to_string());
    env.insert(TARGET_VAR.to_string(), target_triple());
    env.insert("PATH".to_string(), RESTRICTED_PATH.to_string());
    env.insert("MAKEFLAGS".to_string(), format!("-j{jobs}"));
    env
}

/// Target triple for the host machine, e.g. `x86_64-lfs-linux-gnu`.
pub fn target_triple() -> String {
    format!("{}-{}", std::env::consts::ARCH, TARGET_SUFFIX)
}
