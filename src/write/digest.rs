//! Content digests accumulated while bytes are copied.

use std::fmt;
use std::io::{self, Write};

use serde::Deserialize;
use sha2::{Digest, Sha256, Sha512};

/// Hash algorithm used for large-object content digests.
///
/// The algorithm name doubles as the prefix of the descriptor's
/// `messageDigest` attribute, so a future reader can tell which algorithm
/// produced the hex string that follows it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DigestAlgorithm {
    /// SHA-256 (default)
    #[default]
    #[serde(rename = "sha-256")]
    Sha256,
    /// SHA-512
    #[serde(rename = "sha-512")]
    Sha512,
}

impl DigestAlgorithm {
    /// The attribute prefix for this algorithm.
    pub fn prefix(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A finished content digest: algorithm plus uppercase hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDigest {
    /// Algorithm that produced the digest
    pub algorithm: DigestAlgorithm,
    /// Uppercase hexadecimal digest value
    pub hex: String,
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.algorithm.prefix(), self.hex)
    }
}

enum Hasher {
    Sha256(Sha256),
    Sha512(Sha512),
}

impl Hasher {
    fn update(&mut self, bytes: &[u8]) {
        match self {
            Hasher::Sha256(h) => h.update(bytes),
            Hasher::Sha512(h) => h.update(bytes),
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Hasher::Sha256(h) => hex::encode_upper(h.finalize()),
            Hasher::Sha512(h) => hex::encode_upper(h.finalize()),
        }
    }
}

/// Decorator over a writer that updates a running digest with every byte
/// passed through. The digest is extracted exactly once by consuming the
/// wrapper after the wrapped write completes.
pub struct DigestWriter<W: Write> {
    inner: W,
    hasher: Hasher,
    algorithm: DigestAlgorithm,
}

impl<W: Write> DigestWriter<W> {
    /// Wrap a writer with the given digest algorithm.
    pub fn new(inner: W, algorithm: DigestAlgorithm) -> Self {
        let hasher = match algorithm {
            DigestAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
            DigestAlgorithm::Sha512 => Hasher::Sha512(Sha512::new()),
        };
        Self {
            inner,
            hasher,
            algorithm,
        }
    }

    /// Consume the wrapper, returning the inner writer and the finished
    /// digest.
    pub fn finish(self) -> (W, ContentDigest) {
        let digest = ContentDigest {
            algorithm: self.algorithm,
            hex: self.hasher.finalize_hex(),
        };
        (self.inner, digest)
    }
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::Digest as _;

    #[test]
    fn test_digest_matches_direct_computation() {
        let payload = b"the quick brown fox jumps over the lazy dog".repeat(100);

        let mut writer = DigestWriter::new(Vec::new(), DigestAlgorithm::Sha256);
        writer.write_all(&payload).unwrap();
        let (bytes, digest) = writer.finish();

        assert_eq!(bytes, payload);
        assert_eq!(digest.hex, hex::encode_upper(Sha256::digest(&payload)));
        assert_eq!(digest.algorithm, DigestAlgorithm::Sha256);
    }

    #[test]
    fn test_digest_attribute_format() {
        let mut writer = DigestWriter::new(Vec::new(), DigestAlgorithm::Sha256);
        writer.write_all(b"abc").unwrap();
        let (_, digest) = writer.finish();

        let attr = digest.to_string();
        assert!(attr.starts_with("SHA-256"));
        let hex_part = &attr["SHA-256".len()..];
        assert_eq!(hex_part.len(), 64);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hex_part, hex_part.to_uppercase());
    }

    #[test]
    fn test_sha512_digest_length() {
        let mut writer = DigestWriter::new(Vec::new(), DigestAlgorithm::Sha512);
        writer.write_all(b"abc").unwrap();
        let (_, digest) = writer.finish();
        assert_eq!(digest.hex.len(), 128);
        assert!(digest.to_string().starts_with("SHA-512"));
    }
}
