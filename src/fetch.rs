//! Source archive fetching with a shared on-disk cache.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::digest::{file_digest, Checksum};
use crate::error::BuildError;

/// Download `url` to `dest`, verifying `checksum` if one is declared.
///
/// If `dest` already exists the fetch is skipped entirely: the cache is
/// addressed by filename only, and a pre-existing entry is trusted without
/// re-hashing. A previously corrupted cache file is therefore never caught
/// on later runs; delete the file to force a re-fetch.
pub fn fetch_source(url: &str, dest: &Path, checksum: Option<&Checksum>) -> Result<(), BuildError> {
    if dest.exists() {
        debug!("already in source cache: {}", dest.display());
        return Ok(());
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    info!("fetching {}", url);
    let response = reqwest::blocking::get(url).map_err(|e| BuildError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if !response.status().is_success() {
        return Err(BuildError::Fetch {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().map_err(|e| BuildError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    fs::write(dest, &bytes)?;

    if let Some(expected) = checksum {
        verify_download(dest, expected)?;
    }

    info!("downloaded {}", dest.display());
    Ok(())
}

/// Check a downloaded file against its declared digest, deleting it on
/// mismatch so a later run re-fetches instead of trusting bad bytes.
fn verify_download(path: &Path, expected: &Checksum) -> Result<(), BuildError> {
    let actual = file_digest(path, expected.algorithm)?;
    if !expected.matches(&actual) {
        fs::remove_file(path)?;
        return Err(BuildError::HashMismatch {
            path: path.to_path_buf(),
            expected: expected.hex.clone(),
            actual,
        });
    }
    debug!("checksum verified for {}", path.display());
    Ok(())
}
