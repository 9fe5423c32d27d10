#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Complaint record loading.
//!
//! Reads a complaints export from a `.csv` file or from a `.zip` archive
//! (nested archives included) into [`RawComplaintRecord`]s. Records are
//! passed through unvalidated; coordinate checks belong to the engine.

pub mod archive;
pub mod config;
pub mod csv_records;

use std::path::Path;

use hotspot_map_complaint_models::RawComplaintRecord;

pub use config::{ColumnNames, Encoding, LoaderConfig};

/// Errors that can occur while loading records.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error opening or reading a file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV parsing error.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path or archive entry being read.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// The file is not a readable zip archive.
    #[error("Zip error in {path}: {source}")]
    Zip {
        /// Path to the archive.
        path: String,
        /// Underlying zip error.
        source: zip::result::ZipError,
    },

    /// A required column is absent from the header row.
    #[error("{path} has no '{column}' column")]
    MissingColumn {
        /// Path or archive entry being read.
        path: String,
        /// Configured column name.
        column: String,
    },

    /// The archive holds no CSV entries at any nesting level.
    #[error("No CSV file found in {0}")]
    NoCsvInArchive(String),

    /// Neither a `.csv` nor a `.zip` file.
    #[error("Unsupported input {0}: expected a .csv or .zip file")]
    UnsupportedFormat(String),
}

/// Loads all complaint records from `path`.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be opened or parsed, a
/// required column is missing, or an archive contains no CSV.
pub fn load_records(path: &Path, config: &LoaderConfig) -> Result<Vec<RawComplaintRecord>, SourceError> {
    let display = path.display().to_string();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    let file = || {
        std::fs::File::open(path).map_err(|e| SourceError::Io {
            path: display.clone(),
            source: e,
        })
    };

    let records = match extension.as_deref() {
        Some("csv") => {
            log::info!("Loading complaints from {display}");
            csv_records::read_csv(file()?, config, &display, config.max_records, &mut 0)?
        }
        Some("zip") => {
            log::info!("Loading complaints from zip archive {display}");
            let mut archive = zip::ZipArchive::new(file()?).map_err(|e| SourceError::Zip {
                path: display.clone(),
                source: e,
            })?;

            let mut records = Vec::new();
            let stats = archive::read_archive(&mut archive, config, &display, 0, &mut records, &mut 0)?;
            if stats.csv_entries == 0 {
                return Err(SourceError::NoCsvInArchive(display));
            }
            log::info!(
                "  zip complete: {} CSV files in {} nested archives",
                stats.csv_entries,
                stats.nested_archives
            );
            records
        }
        _ => return Err(SourceError::UnsupportedFormat(display)),
    };

    log::info!("Loaded {} complaint records from {display}", records.len());

    Ok(records)
}
