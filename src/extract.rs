//! Archive extraction into the shared source cache.
//!
//! Archives are unpacked with their leading directory intact; the package
//! builder locates the resulting tree by name afterwards, so nothing here
//! strips or renames path components.

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;
use xz2::read::XzDecoder;

use crate::error::BuildError;

/// Unpack `archive` into `dest`, dispatching on the filename suffix.
///
/// Supported: `.tar`, `.tgz`, `.tar.gz`, `.tar.bz2`, `.tar.xz`, `.zip`.
/// Partial output from a failed extraction is left on disk; the caller's
/// fresh-extract pass removes stale trees before the next attempt.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<(), BuildError> {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    info!("extracting {}", archive.display());
    fs::create_dir_all(dest)?;

    if name.ends_with(".zip") {
        unpack_zip(archive, dest)
    } else if name.ends_with(".tar") || name.ends_with(".tgz") || name.contains(".tar.") {
        unpack_tar(archive, &name, dest)
    } else {
        Err(BuildError::UnsupportedArchive(archive.to_path_buf()))
    }
}

fn extract_err(archive: &Path, e: impl std::fmt::Display) -> BuildError {
    BuildError::Extract {
        path: archive.to_path_buf(),
        reason: e.to_string(),
    }
}

fn unpack_tar(archive: &Path, name: &str, dest: &Path) -> Result<(), BuildError> {
    let file = File::open(archive).map_err(|e| extract_err(archive, e))?;
    let reader = BufReader::new(file);

    let decoder: Box<dyn Read> = if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Box::new(GzDecoder::new(reader))
    } else if name.ends_with(".tar.bz2") {
        Box::new(BzDecoder::new(reader))
    } else if name.ends_with(".tar.xz") {
        Box::new(XzDecoder::new(reader))
    } else if name.ends_with(".tar") {
        Box::new(reader)
    } else {
        return Err(extract_err(archive, "unrecognized tar compression"));
    };

    tar::Archive::new(decoder)
        .unpack(dest)
        .map_err(|e| extract_err(archive, e))
}

fn unpack_zip(archive: &Path, dest: &Path) -> Result<(), BuildError> {
    let file = File::open(archive).map_err(|e| extract_err(archive, e))?;
    let mut zip =
        zip::ZipArchive::new(BufReader::new(file)).map_err(|e| extract_err(archive, e))?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| extract_err(archive, e))?;
        let Some(path) = entry.enclosed_name() else {
            return Err(extract_err(archive, "zip entry escapes destination"));
        };
        let out_path = dest.join(path);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out).map_err(|e| extract_err(archive, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))?;
            }
        }
    }
    Ok(())
}
