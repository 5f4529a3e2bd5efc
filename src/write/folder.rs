//! Directory-tree write strategy.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::container::{ArchiveContainer, ContainerRole};

use super::digest::{ContentDigest, DigestAlgorithm, DigestWriter};
use super::error::WriteError;
use super::{ContainerSink, WriteStrategy};

/// Writes every container as a plain directory tree.
///
/// Auxiliary sinks are digest-wrapped; primary sinks (table XML, archive
/// metadata) are plain buffered files. Directory destinations allow LOB sinks
/// to be open while the primary content stream is, so simultaneous writing is
/// always supported.
#[derive(Debug, Clone)]
pub struct FolderWriteStrategy {
    digest: DigestAlgorithm,
}

impl FolderWriteStrategy {
    /// Create a folder strategy digesting LOBs with the given algorithm.
    pub fn new(digest: DigestAlgorithm) -> Self {
        Self { digest }
    }
}

impl Default for FolderWriteStrategy {
    fn default() -> Self {
        Self::new(DigestAlgorithm::Sha256)
    }
}

impl WriteStrategy for FolderWriteStrategy {
    fn setup(&mut self, container: &ArchiveContainer) -> Result<(), WriteError> {
        fs::create_dir_all(container.path())?;
        Ok(())
    }

    fn finish(&mut self, container: &ArchiveContainer) -> Result<(), WriteError> {
        // Files are flushed as their sinks finish; sealing a directory is a
        // bookkeeping event only.
        log::debug!("sealed container {}", container.path().display());
        Ok(())
    }

    fn create_sink(
        &mut self,
        container: &ArchiveContainer,
        relative_path: &str,
    ) -> Result<Box<dyn ContainerSink>, WriteError> {
        let digest = match container.role() {
            ContainerRole::Auxiliary => Some(self.digest),
            ContainerRole::Primary => None,
        };
        Ok(Box::new(file_sink(container.path(), relative_path, digest)?))
    }

    fn supports_simultaneous_writing(&self) -> bool {
        true
    }
}

/// Buffered file sink, optionally digest-wrapped.
pub(super) enum FileSink {
    Plain(BufWriter<File>),
    Digesting(DigestWriter<BufWriter<File>>),
}

/// Open a file sink under `root/relative_path`, creating parent directories.
pub(super) fn file_sink(
    root: &Path,
    relative_path: &str,
    digest: Option<DigestAlgorithm>,
) -> Result<FileSink, WriteError> {
    let full = root.join(relative_path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(&full)?);
    Ok(match digest {
        Some(algorithm) => FileSink::Digesting(DigestWriter::new(writer, algorithm)),
        None => FileSink::Plain(writer),
    })
}

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileSink::Plain(w) => w.write(buf),
            FileSink::Digesting(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileSink::Plain(w) => w.flush(),
            FileSink::Digesting(w) => w.flush(),
        }
    }
}

impl ContainerSink for FileSink {
    fn finish(self: Box<Self>) -> Result<Option<ContentDigest>, WriteError> {
        match *self {
            FileSink::Plain(mut w) => {
                w.flush()?;
                Ok(None)
            }
            FileSink::Digesting(w) => {
                let (mut inner, digest) = w.finish();
                inner.flush()?;
                Ok(Some(digest))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerRole;
    use tempfile::tempdir;

    #[test]
    fn test_auxiliary_sinks_digest_primary_sinks_do_not() {
        let dir = tempdir().unwrap();
        let mut strategy = FolderWriteStrategy::default();

        let primary = ArchiveContainer::new(dir.path().join("archive"), ContainerRole::Primary);
        let aux = ArchiveContainer::new(
            dir.path().join("archive-lobs-0001"),
            ContainerRole::Auxiliary,
        );
        strategy.setup(&primary).unwrap();
        strategy.setup(&aux).unwrap();

        let mut sink = strategy.create_sink(&primary, "content/table0.xml").unwrap();
        sink.write_all(b"<table/>").unwrap();
        assert!(sink.finish().unwrap().is_none());

        let mut sink = strategy.create_sink(&aux, "content/lob1/record1.bin").unwrap();
        sink.write_all(b"payload").unwrap();
        let digest = sink.finish().unwrap().expect("auxiliary sink digests");
        assert!(digest.to_string().starts_with("SHA-256"));

        assert_eq!(
            fs::read(dir.path().join("archive-lobs-0001/content/lob1/record1.bin")).unwrap(),
            b"payload"
        );
    }

    #[test]
    fn test_setup_is_repeat_safe() {
        let dir = tempdir().unwrap();
        let mut strategy = FolderWriteStrategy::default();
        let container = ArchiveContainer::new(dir.path().join("c"), ContainerRole::Auxiliary);
        strategy.setup(&container).unwrap();
        strategy.setup(&container).unwrap();
        assert!(container.path().is_dir());
    }
}
