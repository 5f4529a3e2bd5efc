//! Large-object externalization policy.
//!
//! Owns the current auxiliary container and its occupancy counters, decides
//! when to roll over to a fresh container, and performs the actual byte copy
//! through a digest-tracking sink. Rollover is decided strictly before a
//! write begins; an object's bytes are never split across two containers.

use std::io;

use crate::container::{ArchiveContainer, ContainerRole};
use crate::model::{Cell, LobSource, MemoryLobSource};
use crate::path::ContentPathStrategy;
use crate::write::{ContentDigest, WriteStrategy};

use super::config::{ExportConfig, MB_TO_BYTES};
use super::error::ExportError;
use super::types::{CellCoords, CellDescriptor, LargeObject};

/// Externalizes cells of large-object columns into auxiliary containers.
///
/// The policy is the sole owner of the current auxiliary container and its
/// two occupancy counters: cumulative bytes written and cumulative object
/// count since the container was opened. Both reset to zero exactly when a
/// new container is opened.
pub struct LobPolicy {
    /// Folder size limit in bytes; 0 = unlimited.
    max_folder_bytes: u64,
    /// Objects-per-folder limit.
    max_lobs_per_folder: u64,

    current_container: Option<ArchiveContainer>,
    folder_bytes: u64,
    lobs_in_folder: u64,
    containers_created: usize,
}

impl LobPolicy {
    /// Create a policy from export configuration.
    pub fn new(config: &ExportConfig) -> Self {
        Self::with_limits(config.max_folder_bytes(), config.max_lobs_per_folder)
    }

    /// Create a policy with explicit byte-granular limits. A byte limit of 0
    /// means unlimited.
    pub fn with_limits(max_folder_bytes: u64, max_lobs_per_folder: u64) -> Self {
        Self {
            max_folder_bytes,
            max_lobs_per_folder,
            current_container: None,
            folder_bytes: 0,
            lobs_in_folder: 0,
            containers_created: 0,
        }
    }

    /// Number of auxiliary containers opened so far.
    pub fn containers_created(&self) -> usize {
        self.containers_created
    }

    /// Current occupancy of the open container: (bytes, object count).
    pub fn occupancy(&self) -> (u64, u64) {
        (self.folder_bytes, self.lobs_in_folder)
    }

    /// Externalize one cell of a large-object column.
    ///
    /// Returns the descriptor the XML writer records for the cell: a NULL
    /// descriptor for negative declared lengths (no bytes written, counters
    /// untouched), otherwise a file reference relative to the primary
    /// archive, with the declared length and the content digest when the
    /// sink computed one.
    pub fn externalize(
        &mut self,
        cell: Cell,
        coords: CellCoords,
        base: &ArchiveContainer,
        paths: &mut dyn ContentPathStrategy,
        strategy: &mut dyn WriteStrategy,
    ) -> Result<CellDescriptor, ExportError> {
        let mut container = match &self.current_container {
            Some(current) => current.clone(),
            None => self.roll_container(base, paths, strategy)?,
        };

        let declared = cell.declared_size();
        if declared < 0 {
            // NULL content: nothing is written and no counters change.
            if let Cell::Binary { mut source, .. } = cell {
                source.cleanup();
            }
            return Ok(CellDescriptor::Null);
        }
        let declared = declared as u64;

        if self.max_folder_bytes > 0 && declared >= self.max_folder_bytes {
            log::warn!(
                "large object is {} MB, at or above the {} MB folder limit; it will occupy a folder by itself",
                declared / MB_TO_BYTES,
                self.max_folder_bytes / MB_TO_BYTES
            );
        }

        // Rollover test, strictly before the write: a fresh container when
        // this object would push the folder to its byte limit, or the folder
        // already holds the maximum number of objects.
        if (self.max_folder_bytes > 0 && declared + self.folder_bytes >= self.max_folder_bytes)
            || self.lobs_in_folder >= self.max_lobs_per_folder
        {
            container = self.roll_container(base, paths, strategy)?;
        }

        let (source, target_path): (Box<dyn LobSource>, String) = match cell {
            Cell::Binary { source, .. } => (
                source,
                paths.blob_file_path(
                    coords.schema_index,
                    coords.table_index,
                    coords.column_index,
                    coords.row_index + 1,
                ),
            ),
            Cell::Simple(text) => (
                Box::new(MemoryLobSource::new(text.into_bytes())),
                paths.clob_file_path(
                    coords.schema_index,
                    coords.table_index,
                    coords.column_index,
                    coords.row_index + 1,
                ),
            ),
            Cell::Null => return Ok(CellDescriptor::Null),
        };

        let lob = LargeObject::new(source, target_path.clone());
        let digest = self.write_lob(lob, &container, strategy)?;

        // Reference path relative to the primary archive: ascend one level,
        // descend into the auxiliary folder. Forward slashes keep the
        // reference stable when the archive is relocated across platforms.
        let file = format!("../{}/{}", container.folder_name(), target_path);

        self.folder_bytes += declared;
        self.lobs_in_folder += 1;

        Ok(CellDescriptor::Lob {
            file,
            length: declared,
            digest,
        })
    }

    /// Finalize the current auxiliary container, if one is open.
    pub fn finish(&mut self, strategy: &mut dyn WriteStrategy) -> Result<(), ExportError> {
        if let Some(container) = self.current_container.take() {
            strategy.finish(&container)?;
        }
        Ok(())
    }

    /// Seal the current container (if any), open the next one, and reset
    /// both occupancy counters.
    fn roll_container(
        &mut self,
        base: &ArchiveContainer,
        paths: &mut dyn ContentPathStrategy,
        strategy: &mut dyn WriteStrategy,
    ) -> Result<ArchiveContainer, ExportError> {
        if let Some(old) = self.current_container.take() {
            strategy.finish(&old)?;
        }

        let path = paths
            .next_container_path(base.path())
            .ok_or(ExportError::UnsupportedPathStrategy)?;
        let container = ArchiveContainer::new(path, ContainerRole::Auxiliary);
        strategy.setup(&container)?;

        self.folder_bytes = 0;
        self.lobs_in_folder = 0;
        self.containers_created += 1;
        self.current_container = Some(container.clone());

        log::debug!("opened LOB container {}", container.path().display());
        Ok(container)
    }

    /// Copy one object's bytes into the container through the strategy sink.
    ///
    /// The source's cleanup runs on every exit path, and the sink is closed
    /// on every exit path; a cleanup failure never masks a write failure.
    fn write_lob(
        &self,
        lob: LargeObject,
        container: &ArchiveContainer,
        strategy: &mut dyn WriteStrategy,
    ) -> Result<Option<ContentDigest>, ExportError> {
        log::debug!("writing large object to {}", lob.target_path());

        let mut sink = strategy.create_sink(container, lob.target_path())?;
        let (mut source, target_path) = lob.into_parts();

        let copied: io::Result<u64> = source
            .open()
            .and_then(|mut reader| io::copy(&mut reader, &mut sink));
        source.cleanup();

        match copied {
            Ok(_) => Ok(sink.finish()?),
            Err(e) => {
                if let Err(close_err) = sink.finish() {
                    log::warn!("failed to close LOB sink after write failure: {close_err}");
                }
                Err(ExportError::LobWrite {
                    path: target_path,
                    source: e,
                })
            }
        }
    }
}
