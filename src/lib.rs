//! # rowPack - A Self-Contained Database Archival Format
//!
//! `rowpack` is the reference implementation for the rowPack archival format,
//! designed to keep relational database content readable decades after the
//! source database engine is gone.
//!
//! ## Key Features
//!
//! - **Self-Contained Archives**: A single ZIP container (or a plain
//!   directory tree) holding one XML content descriptor per table, readable
//!   with nothing but an XML parser.
//!
//! - **External Large Objects**: BLOB/CLOB content is streamed into size- and
//!   count-bounded sibling folders and referenced by relative path, keeping
//!   the primary archive small and the whole bundle relocatable.
//!
//! - **Digests as a Side Effect**: Every externalized object's SHA-2 digest
//!   is accumulated while its bytes are copied and recorded in the
//!   descriptor, so integrity checks never re-read the source.
//!
//! - **Streaming Throughout**: One row of XML state at most; LOB bytes are
//!   copied straight from source to sink.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rowpack::export::{ContentExporter, ExportConfig};
//! use rowpack::model::{Cell, ColumnStructure, SchemaStructure, SqlType, TableStructure};
//! use rowpack::path::ExternalLobPathStrategy;
//! use rowpack::write::ZipWriteStrategy;
//!
//! let schema = SchemaStructure::new("hr");
//! let table = TableStructure::new(
//!     "personnel",
//!     vec![
//!         ColumnStructure::new("id", SqlType::Integer),
//!         ColumnStructure::new("name", SqlType::Varchar(120)),
//!         ColumnStructure::new("badge_photo", SqlType::Blob),
//!     ],
//! );
//!
//! let mut exporter = ContentExporter::new(
//!     Box::new(ExternalLobPathStrategy::new()),
//!     Box::new(ZipWriteStrategy::default()),
//!     "personnel.rowpack",
//!     ExportConfig::default(),
//! )?;
//!
//! exporter.begin_table(&schema, 0, &table, 0)?;
//! exporter.write_row(vec![
//!     Cell::simple("1"),
//!     Cell::simple("Ada Lovelace"),
//!     Cell::from_bytes(std::fs::read("badge.png")?),
//! ])?;
//! exporter.finish_table()?;
//!
//! let stats = exporter.finish()?;
//! println!("{stats}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! This produces:
//!
//! ```text
//! personnel.rowpack            # ZIP: mimetype + content/schema0/table0/table0.xml
//! personnel-lobs-0001/         # sibling folder with externalized LOBs
//! └── content/schema0/table0/lob3/record1.bin
//! ```
//!
//! Each externalized cell is recorded in the table XML as
//!
//! ```text
//! <c3 file="../personnel-lobs-0001/content/schema0/table0/lob3/record1.bin"
//!     length="24576" messageDigest="SHA-256..."/>
//! ```
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`model`]: cells, LOB sources, and table structure metadata
//! - [`container`]: container identities (primary archive, auxiliary folders)
//! - [`path`]: deterministic coordinate-to-path mapping per format variant
//! - [`write`]: write strategies, byte sinks, and digest tracking
//! - [`export`]: the export engine: cell dispatch, LOB externalization,
//!   rollover, and XML content descriptors

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod container;
pub mod export;
pub mod model;
pub mod path;
pub mod write;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::container::{ArchiveContainer, ContainerRole};
    pub use crate::export::{
        CellCoords, CellDescriptor, ContentExporter, ExportConfig, ExportError, ExportStats,
        LargeObject, LobPolicy, TableXmlWriter, CONTENT_XMLNS,
    };
    pub use crate::model::{
        Cell, ColumnStructure, FileLobSource, LobSource, MemoryLobSource, Row, SchemaStructure,
        SqlType, TableStructure, TempLobSource, LARGE_OBJECT_THRESHOLD,
    };
    pub use crate::path::{
        ContentPathStrategy, ExternalLobPathStrategy, InlineLobPathStrategy,
    };
    pub use crate::write::{
        ContainerSink, ContentDigest, DigestAlgorithm, DigestWriter, FolderWriteStrategy,
        WriteError, WriteStrategy, ZipWriteStrategy, ROWPACK_MIMETYPE,
    };
}
