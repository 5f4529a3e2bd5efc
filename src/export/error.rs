use crate::write::WriteError;

/// Errors that can occur during an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error while emitting content descriptors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the write layer
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    /// The configured write strategy cannot keep LOB sinks open while the
    /// primary archive stream is open, which external LOB export requires
    #[error("write strategy does not support simultaneous writing")]
    UnsupportedWriteStrategy,

    /// The configured path strategy cannot name auxiliary LOB containers
    #[error("path strategy does not support external LOB containers")]
    UnsupportedPathStrategy,

    /// A large-object write failed partway
    #[error("could not write large object to {path}")]
    LobWrite {
        /// Relative destination path of the failed object
        path: String,
        /// Underlying I/O cause
        #[source]
        source: std::io::Error,
    },

    /// A row operation was attempted with no table open
    #[error("no table is open")]
    TableNotOpen,

    /// A table operation was attempted while another table is still open
    #[error("a table is still open")]
    TableStillOpen,

    /// A row's cell count does not match the table's column count
    #[error("row has {actual} cells, table has {expected} columns")]
    ColumnCountMismatch {
        /// Number of columns in the table structure
        expected: usize,
        /// Number of cells in the offending row
        actual: usize,
    },
}
