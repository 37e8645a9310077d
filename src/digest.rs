//! Content digests for source archive verification.

use md5::Md5;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Digest algorithm declared alongside a package checksum.
///
/// Package manifests carry MD5 digests by default (the checksums published
/// upstream for most LFS-era tarballs); SHA-256 is the modern alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha256,
}

/// An expected content hash: algorithm plus hex digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    pub algorithm: HashAlgorithm,
    pub hex: String,
}

impl Checksum {
    pub fn md5(hex: impl Into<String>) -> Self {
        Self {
            algorithm: HashAlgorithm::Md5,
            hex: hex.into(),
        }
    }

    pub fn sha256(hex: impl Into<String>) -> Self {
        Self {
            algorithm: HashAlgorithm::Sha256,
            hex: hex.into(),
        }
    }

    /// Compare against an actual hex digest, ignoring case.
    pub fn matches(&self, actual: &str) -> bool {
        self.hex.eq_ignore_ascii_case(actual)
    }
}

/// Compute the hex digest of a file's contents.
pub fn file_digest(path: &Path, algorithm: HashAlgorithm) -> io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    match algorithm {
        HashAlgorithm::Md5 => digest_reader::<Md5>(&mut reader),
        HashAlgorithm::Sha256 => digest_reader::<Sha256>(&mut reader),
    }
}

fn digest_reader<D: Digest>(reader: &mut impl Read) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_md5_digest() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();

        let digest = file_digest(file.path(), HashAlgorithm::Md5).unwrap();
        assert_eq!(digest, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn test_sha256_digest() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();

        let digest = file_digest(file.path(), HashAlgorithm::Sha256).unwrap();
        assert_eq!(
            digest,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_checksum_matches_ignores_case() {
        let checksum = Checksum::md5("5EB63BBBE01EEED093CB22BB8F5ACDC3");
        assert!(checksum.matches("5eb63bbbe01eeed093cb22bb8f5acdc3"));
        assert!(!checksum.matches("00000000000000000000000000000000"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(file_digest(Path::new("/nonexistent/archive.tar"), HashAlgorithm::Md5).is_err());
    }
}
