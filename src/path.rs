//! Deterministic mapping from table coordinates to storage paths.
//!
//! A path strategy is a pure function from (schema, table, column, row)
//! coordinates to relative paths inside a container, plus a naming scheme for
//! "the next auxiliary container". Strategies differ by format variant: one
//! keeps every large object inside the primary container, the other places
//! them in environment-relative sibling folders.

use std::path::{Path, PathBuf};

/// Maps export coordinates to relative storage paths.
///
/// All path methods are pure and deterministic: identical coordinates yield
/// identical paths. Only `next_container_path` carries state (a counter), and
/// successive calls yield a strictly increasing, non-repeating sequence.
pub trait ContentPathStrategy {
    /// Relative path of the content-descriptor XML for one table.
    fn table_xml_path(&self, schema_index: usize, table_index: usize) -> String;

    /// Relative path for an externalized binary object. `column_index` is
    /// 1-based, `row_number` is 1-based.
    fn blob_file_path(
        &self,
        schema_index: usize,
        table_index: usize,
        column_index: usize,
        row_number: u64,
    ) -> String;

    /// Relative path for an externalized character object. `column_index` is
    /// 1-based, `row_number` is 1-based.
    fn clob_file_path(
        &self,
        schema_index: usize,
        table_index: usize,
        column_index: usize,
        row_number: u64,
    ) -> String;

    /// Whether this strategy can name auxiliary LOB containers. Checked once
    /// at export start; exports that externalize LOBs refuse strategies that
    /// return `false` before any bytes are written.
    fn supports_external_containers(&self) -> bool {
        false
    }

    /// Path of the next auxiliary container, derived from the primary
    /// archive's base path. `None` when the strategy keeps all content in the
    /// primary container.
    fn next_container_path(&mut self, base: &Path) -> Option<PathBuf> {
        let _ = base;
        None
    }
}

/// Path layout shared by both strategies.
fn content_dir(schema_index: usize, table_index: usize) -> String {
    format!("content/schema{schema_index}/table{table_index}")
}

fn lob_record_path(
    schema_index: usize,
    table_index: usize,
    column_index: usize,
    row_number: u64,
    extension: &str,
) -> String {
    format!(
        "{}/lob{column_index}/record{row_number}.{extension}",
        content_dir(schema_index, table_index)
    )
}

/// Format variant that stores large objects alongside primary content.
///
/// Exports that externalize LOBs reject this strategy at start; it exists for
/// archive layouts whose LOBs stay inside the primary container.
#[derive(Debug, Default, Clone)]
pub struct InlineLobPathStrategy;

impl InlineLobPathStrategy {
    /// Create the inline-variant strategy.
    pub fn new() -> Self {
        Self
    }
}

impl ContentPathStrategy for InlineLobPathStrategy {
    fn table_xml_path(&self, schema_index: usize, table_index: usize) -> String {
        format!(
            "{}/table{table_index}.xml",
            content_dir(schema_index, table_index)
        )
    }

    fn blob_file_path(
        &self,
        schema_index: usize,
        table_index: usize,
        column_index: usize,
        row_number: u64,
    ) -> String {
        lob_record_path(schema_index, table_index, column_index, row_number, "bin")
    }

    fn clob_file_path(
        &self,
        schema_index: usize,
        table_index: usize,
        column_index: usize,
        row_number: u64,
    ) -> String {
        lob_record_path(schema_index, table_index, column_index, row_number, "txt")
    }
}

/// Format variant that places large objects in sibling auxiliary folders.
///
/// Auxiliary containers are named after the primary archive's base name with
/// a deterministic incrementing suffix: `report.rowpack` yields siblings
/// `report-lobs-0001`, `report-lobs-0002`, and so on.
#[derive(Debug, Default, Clone)]
pub struct ExternalLobPathStrategy {
    containers_issued: u32,
}

impl ExternalLobPathStrategy {
    /// Create the external-variant strategy with its container counter at
    /// zero.
    pub fn new() -> Self {
        Self {
            containers_issued: 0,
        }
    }

    /// Number of auxiliary container paths issued so far.
    pub fn containers_issued(&self) -> u32 {
        self.containers_issued
    }
}

impl ContentPathStrategy for ExternalLobPathStrategy {
    fn table_xml_path(&self, schema_index: usize, table_index: usize) -> String {
        format!(
            "{}/table{table_index}.xml",
            content_dir(schema_index, table_index)
        )
    }

    fn blob_file_path(
        &self,
        schema_index: usize,
        table_index: usize,
        column_index: usize,
        row_number: u64,
    ) -> String {
        lob_record_path(schema_index, table_index, column_index, row_number, "bin")
    }

    fn clob_file_path(
        &self,
        schema_index: usize,
        table_index: usize,
        column_index: usize,
        row_number: u64,
    ) -> String {
        lob_record_path(schema_index, table_index, column_index, row_number, "txt")
    }

    fn supports_external_containers(&self) -> bool {
        true
    }

    fn next_container_path(&mut self, base: &Path) -> Option<PathBuf> {
        self.containers_issued += 1;
        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive".to_string());
        let parent = base.parent().unwrap_or_else(|| Path::new("."));
        Some(parent.join(format!("{stem}-lobs-{:04}", self.containers_issued)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_deterministic() {
        let strategy = ExternalLobPathStrategy::new();
        let a = strategy.blob_file_path(0, 2, 3, 41);
        let b = strategy.blob_file_path(0, 2, 3, 41);
        assert_eq!(a, b);
        assert_eq!(a, "content/schema0/table2/lob3/record41.bin");
        assert_eq!(
            strategy.clob_file_path(1, 0, 2, 1),
            "content/schema1/table0/lob2/record1.txt"
        );
        assert_eq!(
            strategy.table_xml_path(0, 7),
            "content/schema0/table7/table7.xml"
        );
    }

    #[test]
    fn test_next_container_paths_strictly_increase() {
        let mut strategy = ExternalLobPathStrategy::new();
        let base = Path::new("/archives/personnel.rowpack");

        let issued: Vec<PathBuf> = (0..3)
            .map(|_| strategy.next_container_path(base).unwrap())
            .collect();

        assert_eq!(issued[0], Path::new("/archives/personnel-lobs-0001"));
        assert_eq!(issued[1], Path::new("/archives/personnel-lobs-0002"));
        assert_eq!(issued[2], Path::new("/archives/personnel-lobs-0003"));
        assert!(issued.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_inline_variant_has_no_external_containers() {
        let mut strategy = InlineLobPathStrategy::new();
        assert!(!strategy.supports_external_containers());
        assert!(strategy
            .next_container_path(Path::new("x.rowpack"))
            .is_none());
    }
}
