//! Data model for exported database content.
//!
//! The export engine is fed one [`Cell`] per (row, column) position, paired
//! with the static [`ColumnStructure`] describing that column. Cells carry
//! either inline text or a lazily opened byte stream ([`LobSource`]); the
//! engine decides per column whether the value is inlined into the table XML
//! or externalized into an auxiliary LOB container.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;

use tempfile::NamedTempFile;

/// Sized character/binary columns above this declared length (in bytes) are
/// treated as large objects and externalized.
pub const LARGE_OBJECT_THRESHOLD: u32 = 8_000;

/// Logical SQL type of a column.
///
/// Only the properties the export engine cares about are modeled: whether the
/// type holds binary data, and whether values are large enough to be stored
/// outside the row descriptor stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    /// BOOLEAN
    Boolean,
    /// SMALLINT
    SmallInt,
    /// INTEGER
    Integer,
    /// BIGINT
    BigInt,
    /// DECIMAL(precision, scale)
    Decimal {
        /// Total number of digits
        precision: u8,
        /// Digits after the decimal point
        scale: u8,
    },
    /// REAL (single precision float)
    Real,
    /// DOUBLE PRECISION
    Double,
    /// CHARACTER(n), fixed length in bytes
    Char(u32),
    /// CHARACTER VARYING(n), maximum length in bytes
    Varchar(u32),
    /// BINARY(n), fixed length in bytes
    Binary(u32),
    /// BINARY VARYING(n), maximum length in bytes
    Varbinary(u32),
    /// CHARACTER LARGE OBJECT
    Clob,
    /// BINARY LARGE OBJECT
    Blob,
    /// DATE
    Date,
    /// TIME
    Time,
    /// TIMESTAMP
    Timestamp,
}

impl SqlType {
    /// Whether values of this type are stored outside the table XML.
    ///
    /// LOB types always qualify; sized character/binary types qualify once
    /// their declared capacity exceeds [`LARGE_OBJECT_THRESHOLD`]. The
    /// decision is per column, never per cell.
    pub fn is_large_object(&self) -> bool {
        match self {
            SqlType::Clob | SqlType::Blob => true,
            SqlType::Char(n) | SqlType::Varchar(n) | SqlType::Binary(n) | SqlType::Varbinary(n) => {
                *n > LARGE_OBJECT_THRESHOLD
            }
            _ => false,
        }
    }

    /// Whether values of this type are raw bytes rather than text.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            SqlType::Binary(_) | SqlType::Varbinary(_) | SqlType::Blob
        )
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Boolean => write!(f, "BOOLEAN"),
            SqlType::SmallInt => write!(f, "SMALLINT"),
            SqlType::Integer => write!(f, "INTEGER"),
            SqlType::BigInt => write!(f, "BIGINT"),
            SqlType::Decimal { precision, scale } => write!(f, "DECIMAL({precision},{scale})"),
            SqlType::Real => write!(f, "REAL"),
            SqlType::Double => write!(f, "DOUBLE PRECISION"),
            SqlType::Char(n) => write!(f, "CHARACTER({n})"),
            SqlType::Varchar(n) => write!(f, "CHARACTER VARYING({n})"),
            SqlType::Binary(n) => write!(f, "BINARY({n})"),
            SqlType::Varbinary(n) => write!(f, "BINARY VARYING({n})"),
            SqlType::Clob => write!(f, "CHARACTER LARGE OBJECT"),
            SqlType::Blob => write!(f, "BINARY LARGE OBJECT"),
            SqlType::Date => write!(f, "DATE"),
            SqlType::Time => write!(f, "TIME"),
            SqlType::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

/// Static per-column metadata.
#[derive(Debug, Clone)]
pub struct ColumnStructure {
    /// Column name as it appears in the source database
    pub name: String,
    /// Logical SQL type
    pub sql_type: SqlType,
    /// Whether NULL values are permitted
    pub nullable: bool,
}

impl ColumnStructure {
    /// Create a nullable column of the given type.
    pub fn new<S: Into<String>>(name: S, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable: true,
        }
    }

    /// Mark the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Static table metadata: name plus ordered column structures.
#[derive(Debug, Clone)]
pub struct TableStructure {
    /// Table name as it appears in the source database
    pub name: String,
    /// Column structures in source column order
    pub columns: Vec<ColumnStructure>,
}

impl TableStructure {
    /// Create a table structure from an ordered column list.
    pub fn new<S: Into<String>>(name: S, columns: Vec<ColumnStructure>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

/// Static schema metadata.
#[derive(Debug, Clone)]
pub struct SchemaStructure {
    /// Schema name as it appears in the source database
    pub name: String,
}

impl SchemaStructure {
    /// Create a schema structure.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into() }
    }
}

/// One row of cells, in source column order.
pub type Row = Vec<Cell>;

/// A byte source backing a binary cell, opened on demand.
///
/// `open` must yield a fresh reader over the object's bytes each time it is
/// called. `cleanup` releases whatever backs the source (temp files, buffers)
/// and is called exactly once after the object has been consumed, on success
/// and failure alike; implementations log and swallow their own failures.
pub trait LobSource {
    /// Open a fresh reader over the source bytes.
    fn open(&mut self) -> io::Result<Box<dyn Read + '_>>;

    /// Release resources backing the source. Best-effort.
    fn cleanup(&mut self) {}
}

impl fmt::Debug for dyn LobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LobSource")
    }
}

/// In-memory byte source.
#[derive(Debug, Clone)]
pub struct MemoryLobSource {
    bytes: Vec<u8>,
}

impl MemoryLobSource {
    /// Wrap an owned byte buffer.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl LobSource for MemoryLobSource {
    fn open(&mut self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.bytes.as_slice())))
    }
}

/// Byte source reading from an existing file. The file is not owned and is
/// left in place on cleanup.
#[derive(Debug, Clone)]
pub struct FileLobSource {
    path: PathBuf,
}

impl FileLobSource {
    /// Reference a file on disk.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl LobSource for FileLobSource {
    fn open(&mut self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(&self.path)?))
    }
}

/// Byte source spooled from a live stream into a named temp file.
///
/// Database drivers frequently hand out LOB streams that are only valid while
/// the current result-set row is active; spooling decouples the LOB write
/// from the driver's cursor. The temp file is deleted on cleanup.
pub struct TempLobSource {
    file: Option<NamedTempFile>,
    size: u64,
}

impl TempLobSource {
    /// Drain `reader` into a fresh temp file and return a source over it.
    pub fn spool<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut file = NamedTempFile::new()?;
        let size = io::copy(reader, &mut file)?;
        Ok(Self {
            file: Some(file),
            size,
        })
    }

    /// Number of bytes spooled.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl LobSource for TempLobSource {
    fn open(&mut self) -> io::Result<Box<dyn Read + '_>> {
        match &self.file {
            Some(file) => Ok(Box::new(file.reopen()?)),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "temp-spooled LOB source already cleaned up",
            )),
        }
    }

    fn cleanup(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = file.close() {
                log::warn!("failed to remove spooled LOB temp file: {e}");
            }
        }
    }
}

/// A tagged value produced for one (row, column) position.
///
/// Exactly one variant is active. A `Simple` or `Binary` cell's declared
/// byte length, when non-negative, matches the bytes its source produces.
pub enum Cell {
    /// SQL NULL; no payload.
    Null,
    /// UTF-8 text payload with a known byte length.
    Simple(String),
    /// A lazily opened byte stream plus a declared byte length. A negative
    /// length marks NULL content carried by a driver that could not report
    /// nullability up front.
    Binary {
        /// The byte source, consumed at most once by the export.
        source: Box<dyn LobSource>,
        /// Declared length in bytes; negative means NULL content.
        size: i64,
    },
}

impl Cell {
    /// Create a text cell.
    pub fn simple<S: Into<String>>(text: S) -> Self {
        Cell::Simple(text.into())
    }

    /// Create a binary cell over an arbitrary source.
    pub fn binary(source: Box<dyn LobSource>, size: i64) -> Self {
        Cell::Binary { source, size }
    }

    /// Create a binary cell over an in-memory buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let size = bytes.len() as i64;
        Cell::Binary {
            source: Box::new(MemoryLobSource::new(bytes)),
            size,
        }
    }

    /// Declared payload length in bytes; negative for NULL content.
    pub fn declared_size(&self) -> i64 {
        match self {
            Cell::Null => -1,
            Cell::Simple(text) => text.len() as i64,
            Cell::Binary { size, .. } => *size,
        }
    }
}

// Cell holds a trait object, so Debug is spelled out by hand.
impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("Cell::Null"),
            Cell::Simple(text) => f.debug_tuple("Cell::Simple").field(text).finish(),
            Cell::Binary { size, .. } => {
                f.debug_struct("Cell::Binary").field("size", size).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lob_classification_is_per_type() {
        assert!(SqlType::Blob.is_large_object());
        assert!(SqlType::Clob.is_large_object());
        assert!(SqlType::Varchar(LARGE_OBJECT_THRESHOLD + 1).is_large_object());
        assert!(!SqlType::Varchar(LARGE_OBJECT_THRESHOLD).is_large_object());
        assert!(!SqlType::Integer.is_large_object());
        assert!(!SqlType::Varbinary(16).is_large_object());
    }

    #[test]
    fn test_binary_classification() {
        assert!(SqlType::Blob.is_binary());
        assert!(SqlType::Varbinary(16).is_binary());
        assert!(!SqlType::Clob.is_binary());
        assert!(!SqlType::Varchar(16).is_binary());
    }

    #[test]
    fn test_memory_source_yields_fresh_readers() {
        let mut source = MemoryLobSource::new(b"abcdef".to_vec());
        for _ in 0..2 {
            let mut buf = Vec::new();
            source.open().unwrap().read_to_end(&mut buf).unwrap();
            assert_eq!(buf, b"abcdef");
        }
    }

    #[test]
    fn test_temp_source_spool_and_cleanup() {
        let mut input = Cursor::new(b"spooled payload".to_vec());
        let mut source = TempLobSource::spool(&mut input).unwrap();
        assert_eq!(source.size(), 15);

        let mut buf = Vec::new();
        source.open().unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"spooled payload");

        source.cleanup();
        assert!(source.open().is_err());
    }

    #[test]
    fn test_declared_sizes() {
        assert_eq!(Cell::Null.declared_size(), -1);
        assert_eq!(Cell::simple("héllo").declared_size(), 6);
        assert_eq!(Cell::from_bytes(vec![0u8; 42]).declared_size(), 42);
    }
}
