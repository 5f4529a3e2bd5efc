//! # Write strategies
//!
//! A [`WriteStrategy`] owns the physical destination of an export and is
//! polymorphic over the capability set the engine needs: prepare a container,
//! hand out byte sinks into it, and seal it when writing is done. Two
//! concrete strategies are provided:
//!
//! - [`FolderWriteStrategy`]: every container is a directory tree.
//! - [`ZipWriteStrategy`]: the primary container is a single `.rowpack` ZIP
//!   archive; auxiliary LOB containers are plain sibling folders, so LOB
//!   writes never touch the ZIP stream.
//!
//! Sinks for auxiliary containers are digest-wrapped ([`DigestWriter`]): the
//! content digest accumulates while the bytes are copied and is surrendered
//! exactly once when the sink is finished.

use std::io::Write;

use crate::container::ArchiveContainer;

mod digest;
mod error;
mod folder;
mod zip;

pub use self::digest::{ContentDigest, DigestAlgorithm, DigestWriter};
pub use self::error::WriteError;
pub use self::folder::FolderWriteStrategy;
pub use self::zip::{ZipWriteStrategy, ROWPACK_MIMETYPE};

/// A byte sink scoped to one relative path inside one container.
///
/// The caller owns the sink and must finish it on every exit path, success or
/// failure. `finish` flushes and closes the destination and surrenders the
/// content digest when the destination computes one; it consumes the sink, so
/// a digest can never leak into the next object's descriptor.
pub trait ContainerSink: Write {
    /// Flush, close, and return the accumulated digest if the sink digests.
    fn finish(self: Box<Self>) -> Result<Option<ContentDigest>, WriteError>;
}

/// Capability set over a physical archive destination.
pub trait WriteStrategy {
    /// Prepare a container for writing. Safe to call once per container
    /// before any sink is created inside it.
    fn setup(&mut self, container: &ArchiveContainer) -> Result<(), WriteError>;

    /// Flush and seal a container. Mandatory before the container is
    /// considered complete; no further writes are expected afterwards.
    fn finish(&mut self, container: &ArchiveContainer) -> Result<(), WriteError>;

    /// Open a byte sink for one relative path inside a prepared container.
    fn create_sink(
        &mut self,
        container: &ArchiveContainer,
        relative_path: &str,
    ) -> Result<Box<dyn ContainerSink>, WriteError>;

    /// Whether a sink may be open while the primary archive stream is still
    /// open elsewhere. A structural property of the destination format,
    /// checked once at export start.
    fn supports_simultaneous_writing(&self) -> bool;
}
