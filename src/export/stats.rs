use std::fmt;

/// Statistics from a completed export.
#[derive(Debug, Clone, Default)]
pub struct ExportStats {
    /// Number of tables written
    pub tables_written: usize,
    /// Number of rows written across all tables
    pub rows_written: u64,
    /// Number of cells inlined into table XML
    pub cells_inlined: u64,
    /// Number of large objects externalized
    pub lobs_externalized: u64,
    /// Total bytes of externalized large-object content
    pub lob_bytes_written: u64,
    /// Number of auxiliary LOB containers created
    pub lob_containers_created: usize,
}

impl fmt::Display for ExportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} rows across {} table(s); {} large objects ({} bytes) in {} auxiliary container(s)",
            self.rows_written,
            self.tables_written,
            self.lobs_externalized,
            self.lob_bytes_written,
            self.lob_containers_created
        )
    }
}
