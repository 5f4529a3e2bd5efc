//! # rowPack Exporter
//!
//! A command-line tool for producing rowPack database archives.
//!
//! ## Usage
//!
//! ```bash
//! # Export a deterministic demo dataset to a single-file archive
//! rowpack demo personnel.rowpack
//!
//! # Directory destination, pretty XML, tight folder limits
//! rowpack -v demo personnel --directory --pretty --max-folder-size-mb 1
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Deserialize;

use rowpack::export::{ContentExporter, ExportConfig, ExportStats};
use rowpack::model::{Cell, ColumnStructure, Row, SchemaStructure, SqlType, TableStructure};
use rowpack::path::ExternalLobPathStrategy;
use rowpack::write::{FolderWriteStrategy, WriteStrategy, ZipWriteStrategy};

/// rowPack - Self-Contained Database Archival Format Exporter
#[derive(Parser)]
#[command(name = "rowpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a deterministic demo dataset (personnel records with photos)
    Demo {
        /// Output archive path
        #[arg(value_name = "OUTPUT", default_value = "demo_personnel.rowpack")]
        output: PathBuf,

        /// Number of rows to generate
        #[arg(short, long, default_value = "100")]
        rows: u64,

        /// Size of each generated photo BLOB in KiB
        #[arg(long, default_value = "256")]
        lob_size_kib: u64,

        /// Maximum bytes per LOB folder in MB (0 = unlimited)
        #[arg(long)]
        max_folder_size_mb: Option<u64>,

        /// Maximum number of objects per LOB folder
        #[arg(long)]
        lobs_per_folder: Option<u64>,

        /// Indent the table XML for human readers
        #[arg(long)]
        pretty: bool,

        /// Write a directory tree instead of a single-file ZIP archive
        #[arg(long)]
        directory: bool,

        /// TOML config file with an [export] section
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

/// Root structure of a rowpack.toml config file.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    /// Export engine settings.
    #[serde(default)]
    export: ExportConfig,
}

impl ConfigFile {
    fn load(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse TOML configuration")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Demo {
            output,
            rows,
            lob_size_kib,
            max_folder_size_mb,
            lobs_per_folder,
            pretty,
            directory,
            config,
        } => {
            let mut export_config = match config {
                Some(path) => ConfigFile::load(&path)?.export,
                None => ExportConfig::default(),
            };
            if let Some(mb) = max_folder_size_mb {
                export_config.max_lob_folder_size_mb = mb;
            }
            if let Some(count) = lobs_per_folder {
                export_config.max_lobs_per_folder = count;
            }
            if pretty {
                export_config.pretty_xml = true;
            }

            let stats = run_demo(&output, rows, lob_size_kib, directory, export_config)?;
            info!("{stats}");
            println!("{stats}");
            Ok(())
        }
    }
}

fn run_demo(
    output: &PathBuf,
    rows: u64,
    lob_size_kib: u64,
    directory: bool,
    config: ExportConfig,
) -> Result<ExportStats> {
    info!("rowPack Demo Export");
    info!("Output: {}", output.display());
    info!(
        "Rows: {rows}, photo size: {lob_size_kib} KiB, destination: {}",
        if directory { "directory" } else { "zip" }
    );

    let digest = config.digest;
    let strategy: Box<dyn WriteStrategy> = if directory {
        Box::new(FolderWriteStrategy::new(digest))
    } else {
        Box::new(ZipWriteStrategy::new(digest))
    };

    let mut exporter = ContentExporter::new(
        Box::new(ExternalLobPathStrategy::new()),
        strategy,
        output.clone(),
        config,
    )?;

    let manifest = serde_json::json!({
        "format_version": "1.0",
        "created": chrono::Utc::now().to_rfc3339(),
        "tool": format!("rowpack-rs v{}", env!("CARGO_PKG_VERSION")),
        "schemas": [{ "name": "hr", "tables": ["personnel"] }],
    });
    exporter.write_archive_file(
        "metadata.json",
        serde_json::to_string_pretty(&manifest)?.as_bytes(),
    )?;

    let schema = SchemaStructure::new("hr");
    let table = TableStructure::new(
        "personnel",
        vec![
            ColumnStructure::new("id", SqlType::Integer).not_null(),
            ColumnStructure::new("name", SqlType::Varchar(120)),
            ColumnStructure::new("hired", SqlType::Date),
            ColumnStructure::new("notes", SqlType::Clob),
            ColumnStructure::new("badge_photo", SqlType::Blob),
            ColumnStructure::new("pin", SqlType::Varbinary(8)),
        ],
    );

    exporter.begin_table(&schema, 0, &table, 0)?;
    for row_number in 0..rows {
        exporter.write_row(demo_row(row_number, lob_size_kib * 1024))?;
    }
    exporter.finish_table()?;

    let stats = exporter.finish()?;
    Ok(stats)
}

/// Build one deterministic demo row. Every third row has NULL notes and every
/// fifth row a NULL photo, so the export exercises all descriptor shapes.
fn demo_row(row_number: u64, photo_bytes: u64) -> Row {
    let names = ["Ada", "Grace", "Radia", "Hedy", "Katherine", "Annie"];
    let name = names[(row_number as usize) % names.len()];

    let notes = if row_number % 3 == 0 {
        Cell::Null
    } else {
        Cell::simple(format!(
            "Employee {name} joined in cohort {} and holds badge {row_number}.",
            row_number / 10
        ))
    };

    let photo = if row_number % 5 == 0 {
        Cell::Null
    } else {
        Cell::from_bytes(pseudo_random_bytes(row_number, photo_bytes as usize))
    };

    vec![
        Cell::simple(format!("{}", row_number + 1)),
        Cell::simple(name),
        Cell::simple(format!("20{:02}-03-14", 10 + row_number % 15)),
        notes,
        photo,
        Cell::from_bytes(pseudo_random_bytes(row_number ^ 0x5EED, 8)),
    ]
}

/// Deterministic xorshift filler so repeated runs produce identical archives.
fn pseudo_random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    let mut bytes = Vec::with_capacity(len);
    while bytes.len() < len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        bytes.extend_from_slice(&state.to_le_bytes());
    }
    bytes.truncate(len);
    bytes
}
