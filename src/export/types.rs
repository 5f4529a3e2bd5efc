use crate::model::LobSource;
use crate::write::ContentDigest;

/// Addressing coordinates of one cell within the export.
///
/// Schema and table indices are 0-based positions supplied by the caller;
/// `column_index` is 1-based (matching the `c1`..`cN` descriptor elements);
/// `row_index` is 0-based and becomes 1-based in LOB record paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellCoords {
    /// 0-based schema position
    pub schema_index: usize,
    /// 0-based table position within the schema
    pub table_index: usize,
    /// 1-based column position within the row
    pub column_index: usize,
    /// 0-based row number within the table
    pub row_index: u64,
}

/// What the XML writer records for one cell.
#[derive(Debug)]
pub enum CellDescriptor {
    /// SQL NULL; the cell element is omitted from the row.
    Null,
    /// Inline text payload (simple text or hex-encoded small binary).
    Inline(String),
    /// Reference to an externalized large object.
    Lob {
        /// Path relative to the primary archive (`../<container>/<path>`)
        file: String,
        /// Declared content length in bytes
        length: u64,
        /// Content digest, when the destination sink computed one
        digest: Option<ContentDigest>,
    },
}

/// Binding between a large object's byte source and its destination path
/// inside the current auxiliary container.
///
/// Constructed per externalized cell and consumed exactly once by the write
/// step; the source's cleanup runs whether the write succeeds or fails.
pub struct LargeObject {
    source: Box<dyn LobSource>,
    target_path: String,
}

impl LargeObject {
    /// Bind a source to a container-relative destination path.
    pub fn new(source: Box<dyn LobSource>, target_path: String) -> Self {
        Self {
            source,
            target_path,
        }
    }

    /// The container-relative destination path.
    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    /// Split into source and path for the write step.
    pub(super) fn into_parts(self) -> (Box<dyn LobSource>, String) {
        (self.source, self.target_path)
    }
}
