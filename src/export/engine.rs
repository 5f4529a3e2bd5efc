//! Table-by-table export orchestration.

use std::io::Read;
use std::path::PathBuf;

use crate::container::{ArchiveContainer, ContainerRole};
use crate::model::{Cell, ColumnStructure, Row, SchemaStructure, TableStructure};
use crate::path::ContentPathStrategy;
use crate::write::WriteStrategy;

use super::config::ExportConfig;
use super::error::ExportError;
use super::lobs::LobPolicy;
use super::stats::ExportStats;
use super::types::{CellCoords, CellDescriptor};
use super::xml::TableXmlWriter;

/// State of the table currently being written.
struct OpenTable {
    schema_index: usize,
    table_index: usize,
    columns: Vec<ColumnStructure>,
    row_index: u64,
    xml: TableXmlWriter,
}

/// Streams table content into an archive.
///
/// One logical writer: tables are exported one at a time, rows in source
/// order, columns in row order. Construction fails fast when the configured
/// strategies lack a required capability, before any bytes are written.
///
/// ```rust,no_run
/// use rowpack::export::{ContentExporter, ExportConfig};
/// use rowpack::model::{Cell, ColumnStructure, SchemaStructure, SqlType, TableStructure};
/// use rowpack::path::ExternalLobPathStrategy;
/// use rowpack::write::ZipWriteStrategy;
///
/// let schema = SchemaStructure::new("hr");
/// let table = TableStructure::new(
///     "personnel",
///     vec![
///         ColumnStructure::new("id", SqlType::Integer),
///         ColumnStructure::new("photo", SqlType::Blob),
///     ],
/// );
///
/// let mut exporter = ContentExporter::new(
///     Box::new(ExternalLobPathStrategy::new()),
///     Box::new(ZipWriteStrategy::default()),
///     "personnel.rowpack",
///     ExportConfig::default(),
/// )?;
///
/// exporter.begin_table(&schema, 0, &table, 0)?;
/// exporter.write_row(vec![
///     Cell::simple("1"),
///     Cell::from_bytes(vec![0u8; 64 * 1024]),
/// ])?;
/// exporter.finish_table()?;
///
/// let stats = exporter.finish()?;
/// println!("{stats}");
/// # Ok::<(), rowpack::export::ExportError>(())
/// ```
pub struct ContentExporter {
    paths: Box<dyn ContentPathStrategy>,
    strategy: Box<dyn WriteStrategy>,
    base: ArchiveContainer,
    config: ExportConfig,
    lobs: LobPolicy,
    stats: ExportStats,
    current: Option<OpenTable>,
}

impl ContentExporter {
    /// Create an exporter over the given strategies and primary archive path.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the write strategy cannot write
    /// LOB sinks while the primary stream is open, or the path strategy
    /// cannot name auxiliary containers. Both are checked here so a
    /// misconfiguration surfaces before the first byte, not mid-export.
    pub fn new<P: Into<PathBuf>>(
        paths: Box<dyn ContentPathStrategy>,
        strategy: Box<dyn WriteStrategy>,
        base_path: P,
        config: ExportConfig,
    ) -> Result<Self, ExportError> {
        if !strategy.supports_simultaneous_writing() {
            return Err(ExportError::UnsupportedWriteStrategy);
        }
        if !paths.supports_external_containers() {
            return Err(ExportError::UnsupportedPathStrategy);
        }

        let base = ArchiveContainer::new(base_path, ContainerRole::Primary);
        let mut strategy = strategy;
        strategy.setup(&base)?;

        let lobs = LobPolicy::new(&config);
        Ok(Self {
            paths,
            strategy,
            base,
            config,
            lobs,
            stats: ExportStats::default(),
            current: None,
        })
    }

    /// Write an arbitrary file into the primary container (archive manifests
    /// and similar metadata produced outside the content engine).
    pub fn write_archive_file(
        &mut self,
        relative_path: &str,
        bytes: &[u8],
    ) -> Result<(), ExportError> {
        use std::io::Write as _;
        let mut sink = self.strategy.create_sink(&self.base, relative_path)?;
        sink.write_all(bytes)?;
        sink.finish()?;
        Ok(())
    }

    /// Begin exporting one table. Opens the table's XML descriptor in the
    /// primary container.
    pub fn begin_table(
        &mut self,
        schema: &SchemaStructure,
        schema_index: usize,
        table: &TableStructure,
        table_index: usize,
    ) -> Result<(), ExportError> {
        if self.current.is_some() {
            return Err(ExportError::TableStillOpen);
        }

        let xml_path = self.paths.table_xml_path(schema_index, table_index);
        log::debug!(
            "exporting table {}.{} to {xml_path}",
            schema.name,
            table.name
        );

        let sink = self.strategy.create_sink(&self.base, &xml_path)?;
        let xml = TableXmlWriter::new(sink, self.config.pretty_xml, &schema.name, &table.name)?;

        self.current = Some(OpenTable {
            schema_index,
            table_index,
            columns: table.columns.clone(),
            row_index: 0,
            xml,
        });
        Ok(())
    }

    /// Write one row of cells, in column order.
    pub fn write_row(&mut self, row: Row) -> Result<(), ExportError> {
        let Self {
            paths,
            strategy,
            base,
            lobs,
            stats,
            current,
            ..
        } = self;
        let table = current.as_mut().ok_or(ExportError::TableNotOpen)?;

        if row.len() != table.columns.len() {
            return Err(ExportError::ColumnCountMismatch {
                expected: table.columns.len(),
                actual: row.len(),
            });
        }

        table.xml.begin_row()?;

        for (position, (cell, column)) in row.into_iter().zip(table.columns.iter()).enumerate() {
            let column_index = position + 1;

            let descriptor = if column.sql_type.is_large_object() {
                let coords = CellCoords {
                    schema_index: table.schema_index,
                    table_index: table.table_index,
                    column_index,
                    row_index: table.row_index,
                };
                lobs.externalize(cell, coords, base, paths.as_mut(), strategy.as_mut())?
            } else {
                match cell {
                    Cell::Null => CellDescriptor::Null,
                    Cell::Simple(text) => CellDescriptor::Inline(text),
                    Cell::Binary { mut source, .. } => {
                        // Small binary columns inline as hex text: stable,
                        // whitespace-free, and safe inside XML.
                        let bytes = source.open().and_then(|mut reader| {
                            let mut buf = Vec::new();
                            reader.read_to_end(&mut buf)?;
                            Ok(buf)
                        });
                        source.cleanup();
                        CellDescriptor::Inline(hex::encode(bytes?))
                    }
                }
            };

            match &descriptor {
                CellDescriptor::Inline(_) => stats.cells_inlined += 1,
                CellDescriptor::Lob { length, .. } => {
                    stats.lobs_externalized += 1;
                    stats.lob_bytes_written += length;
                }
                CellDescriptor::Null => {}
            }

            table.xml.write_cell(column_index, &descriptor)?;
        }

        table.xml.end_row()?;
        table.row_index += 1;
        stats.rows_written += 1;
        Ok(())
    }

    /// Close the current table's XML descriptor.
    pub fn finish_table(&mut self) -> Result<(), ExportError> {
        let table = self.current.take().ok_or(ExportError::TableNotOpen)?;
        table.xml.finish()?;
        self.stats.tables_written += 1;
        Ok(())
    }

    /// Finalize the export: seal the current auxiliary container (if any)
    /// and the primary archive, and return the final statistics.
    pub fn finish(mut self) -> Result<ExportStats, ExportError> {
        if self.current.is_some() {
            return Err(ExportError::TableStillOpen);
        }

        self.lobs.finish(self.strategy.as_mut())?;
        self.strategy.finish(&self.base)?;

        self.stats.lob_containers_created = self.lobs.containers_created();
        Ok(self.stats)
    }

    /// Statistics accumulated so far.
    pub fn stats(&self) -> ExportStats {
        let mut stats = self.stats.clone();
        stats.lob_containers_created = self.lobs.containers_created();
        stats
    }
}
