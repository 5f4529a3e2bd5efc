use serde::Deserialize;

use crate::write::DigestAlgorithm;

/// Bytes per megabyte, the unit folder size limits are configured in.
pub const MB_TO_BYTES: u64 = 1024 * 1024;

/// Configuration for the export engine.
///
/// Deserializable so it can be loaded from a TOML config file as well as
/// assembled from CLI flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Maximum bytes per auxiliary LOB folder, in megabytes. 0 = unlimited.
    pub max_lob_folder_size_mb: u64,

    /// Maximum number of objects per auxiliary LOB folder.
    pub max_lobs_per_folder: u64,

    /// Indent the table XML for human readers. Cosmetic only.
    pub pretty_xml: bool,

    /// Hash algorithm for large-object content digests.
    pub digest: DigestAlgorithm,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            // 1000 MB and 1000 objects per folder keep auxiliary containers
            // manageable on archival filesystems and optical media.
            max_lob_folder_size_mb: 1000,
            max_lobs_per_folder: 1000,
            pretty_xml: false,
            digest: DigestAlgorithm::Sha256,
        }
    }
}

impl ExportConfig {
    /// The folder size limit in bytes. 0 = unlimited.
    pub fn max_folder_bytes(&self) -> u64 {
        self.max_lob_folder_size_mb * MB_TO_BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.max_lob_folder_size_mb, 1000);
        assert_eq!(config.max_lobs_per_folder, 1000);
        assert_eq!(config.max_folder_bytes(), 1000 * 1024 * 1024);
        assert!(!config.pretty_xml);
    }

    #[test]
    fn test_deserialize_from_toml() {
        let config: ExportConfig = toml::from_str(
            r#"
            max_lob_folder_size_mb = 1
            max_lobs_per_folder = 2
            pretty_xml = true
            digest = "sha-512"
        "#,
        )
        .unwrap();
        assert_eq!(config.max_lob_folder_size_mb, 1);
        assert_eq!(config.max_lobs_per_folder, 2);
        assert!(config.pretty_xml);
        assert_eq!(config.digest, DigestAlgorithm::Sha512);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ExportConfig = toml::from_str("max_lobs_per_folder = 7").unwrap();
        assert_eq!(config.max_lobs_per_folder, 7);
        assert_eq!(config.max_lob_folder_size_mb, 1000);
    }
}
