//! ZIP-based write strategy: single-file primary archive, folder auxiliaries.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::sync::{Arc, Mutex};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

use crate::container::{ArchiveContainer, ContainerRole};

use super::digest::ContentDigest;
use super::error::WriteError;
use super::folder::file_sink;
use super::{ContainerSink, DigestAlgorithm, WriteStrategy};

/// MIME type of a rowPack container, written as the archive's first entry.
pub const ROWPACK_MIMETYPE: &str = "application/vnd.rowpack";

type SharedZip = Arc<Mutex<Option<ZipWriter<BufWriter<File>>>>>;

/// Writes the primary container as a single ZIP archive and auxiliary LOB
/// containers as plain sibling folders.
///
/// The first archive entry is an uncompressed `mimetype` so the format stays
/// identifiable by inspection. Primary sinks buffer in memory and append a
/// Deflate-compressed entry when finished; auxiliary sinks are digest-wrapped
/// files. Because auxiliary writes never touch the ZIP stream, simultaneous
/// writing is supported.
pub struct ZipWriteStrategy {
    digest: DigestAlgorithm,
    zip: SharedZip,
}

impl ZipWriteStrategy {
    /// Create a ZIP strategy digesting LOBs with the given algorithm.
    pub fn new(digest: DigestAlgorithm) -> Self {
        Self {
            digest,
            zip: Arc::new(Mutex::new(None)),
        }
    }
}

impl Default for ZipWriteStrategy {
    fn default() -> Self {
        Self::new(DigestAlgorithm::Sha256)
    }
}

impl WriteStrategy for ZipWriteStrategy {
    fn setup(&mut self, container: &ArchiveContainer) -> Result<(), WriteError> {
        match container.role() {
            ContainerRole::Primary => {
                let mut guard = self.zip.lock().map_err(|_| WriteError::Poisoned)?;
                if guard.is_some() {
                    // already prepared
                    return Ok(());
                }
                if let Some(parent) = container.path().parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                let file = File::create(container.path())?;
                let mut writer = ZipWriter::new(BufWriter::new(file));

                // mimetype must be the first entry and stored uncompressed
                let options = SimpleFileOptions::default()
                    .compression_method(CompressionMethod::Stored)
                    .unix_permissions(0o644);
                writer.start_file("mimetype", options)?;
                writer.write_all(ROWPACK_MIMETYPE.as_bytes())?;

                *guard = Some(writer);
                Ok(())
            }
            ContainerRole::Auxiliary => {
                fs::create_dir_all(container.path())?;
                Ok(())
            }
        }
    }

    fn finish(&mut self, container: &ArchiveContainer) -> Result<(), WriteError> {
        match container.role() {
            ContainerRole::Primary => {
                let mut guard = self.zip.lock().map_err(|_| WriteError::Poisoned)?;
                let writer = guard
                    .take()
                    .ok_or_else(|| WriteError::NotPrepared(container.folder_name()))?;
                let inner = writer.finish()?;
                inner.into_inner().map_err(|e| {
                    WriteError::Io(io::Error::new(
                        io::ErrorKind::Other,
                        format!("failed to flush archive buffer: {}", e.error()),
                    ))
                })?;
                log::debug!("sealed archive {}", container.path().display());
                Ok(())
            }
            ContainerRole::Auxiliary => {
                log::debug!("sealed container {}", container.path().display());
                Ok(())
            }
        }
    }

    fn create_sink(
        &mut self,
        container: &ArchiveContainer,
        relative_path: &str,
    ) -> Result<Box<dyn ContainerSink>, WriteError> {
        match container.role() {
            ContainerRole::Primary => {
                let guard = self.zip.lock().map_err(|_| WriteError::Poisoned)?;
                if guard.is_none() {
                    return Err(WriteError::NotPrepared(container.folder_name()));
                }
                drop(guard);
                Ok(Box::new(ZipEntrySink {
                    zip: Arc::clone(&self.zip),
                    entry_path: relative_path.to_string(),
                    buffer: Vec::new(),
                }))
            }
            ContainerRole::Auxiliary => Ok(Box::new(file_sink(
                container.path(),
                relative_path,
                Some(self.digest),
            )?)),
        }
    }

    fn supports_simultaneous_writing(&self) -> bool {
        true
    }
}

/// Buffers entry bytes in memory and appends them to the shared archive when
/// finished. The ZIP stream needs each entry written contiguously, so the
/// buffer is the price of keeping LOB sinks open at the same time.
struct ZipEntrySink {
    zip: SharedZip,
    entry_path: String,
    buffer: Vec<u8>,
}

impl Write for ZipEntrySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ContainerSink for ZipEntrySink {
    fn finish(self: Box<Self>) -> Result<Option<ContentDigest>, WriteError> {
        let mut guard = self.zip.lock().map_err(|_| WriteError::Poisoned)?;
        let writer = guard
            .as_mut()
            .ok_or_else(|| WriteError::AlreadyFinalized(self.entry_path.clone()))?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        writer.start_file(self.entry_path.as_str(), options)?;
        writer.write_all(&self.buffer)?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_mimetype_is_first_uncompressed_entry() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("out.rowpack");
        let primary = ArchiveContainer::new(&archive_path, ContainerRole::Primary);

        let mut strategy = ZipWriteStrategy::default();
        strategy.setup(&primary).unwrap();

        let mut sink = strategy.create_sink(&primary, "content/schema0/t.xml").unwrap();
        sink.write_all(b"<table/>").unwrap();
        sink.finish().unwrap();

        strategy.finish(&primary).unwrap();

        let file = File::open(&archive_path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();

        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
        drop(first);

        let mut entry = archive.by_name("content/schema0/t.xml").unwrap();
        let mut contents = String::new();
        entry.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "<table/>");
    }

    #[test]
    fn test_auxiliary_containers_are_folders_with_digests() {
        let dir = tempdir().unwrap();
        let primary = ArchiveContainer::new(dir.path().join("out.rowpack"), ContainerRole::Primary);
        let aux = ArchiveContainer::new(dir.path().join("out-lobs-0001"), ContainerRole::Auxiliary);

        let mut strategy = ZipWriteStrategy::default();
        strategy.setup(&primary).unwrap();
        strategy.setup(&aux).unwrap();

        let mut sink = strategy.create_sink(&aux, "content/lob2/record1.bin").unwrap();
        sink.write_all(b"blob bytes").unwrap();
        let digest = sink.finish().unwrap().expect("auxiliary sink digests");
        assert!(digest.to_string().starts_with("SHA-256"));

        strategy.finish(&aux).unwrap();
        strategy.finish(&primary).unwrap();

        assert!(dir.path().join("out-lobs-0001/content/lob2/record1.bin").is_file());
        assert!(strategy.supports_simultaneous_writing());
    }

    #[test]
    fn test_primary_sink_after_finish_is_rejected() {
        let dir = tempdir().unwrap();
        let primary = ArchiveContainer::new(dir.path().join("out.rowpack"), ContainerRole::Primary);

        let mut strategy = ZipWriteStrategy::default();
        strategy.setup(&primary).unwrap();
        let sink = strategy.create_sink(&primary, "late.xml").unwrap();
        strategy.finish(&primary).unwrap();

        assert!(matches!(
            sink.finish(),
            Err(WriteError::AlreadyFinalized(_))
        ));
    }
}
