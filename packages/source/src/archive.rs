//! Zip archive reading, including zips nested inside zips.
//!
//! Entries are read sequentially; nothing is extracted to disk. Nested
//! archives are buffered in memory.

use std::io::{Cursor, Read, Seek};

use hotspot_map_complaint_models::RawComplaintRecord;

use crate::SourceError;
use crate::config::LoaderConfig;
use crate::csv_records::read_csv;

/// Nesting depth beyond which inner archives are skipped.
pub const MAX_NESTING: usize = 4;

/// Entry counters for one archive walk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveStats {
    /// CSV entries read, at any nesting level.
    pub csv_entries: usize,
    /// Inner archives descended into.
    pub nested_archives: usize,
}

/// Reads every `.csv` entry of `archive`, descending into `.zip` entries.
///
/// `next_row` numbers rows across all entries; see [`read_csv`].
///
/// # Errors
///
/// Propagates [`SourceError::MissingColumn`] and [`SourceError::Csv`] from
/// any CSV entry. Corrupt entries and unreadable inner archives are skipped
/// with a warning.
pub fn read_archive<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    config: &LoaderConfig,
    source: &str,
    depth: usize,
    records: &mut Vec<RawComplaintRecord>,
    next_row: &mut u64,
) -> Result<ArchiveStats, SourceError> {
    let mut stats = ArchiveStats::default();

    for i in 0..archive.len() {
        let remaining = config
            .max_records
            .map(|max| max.saturating_sub(records.len() as u64));
        if remaining == Some(0) {
            break;
        }

        let mut entry = match archive.by_index(i) {
            Ok(e) => e,
            Err(e) => {
                log::warn!("[{source}] skipping corrupt zip entry {i}: {e}");
                continue;
            }
        };

        let entry_name = entry.name().to_string();
        let lower = entry_name.to_ascii_lowercase();
        let label = format!("{source}/{entry_name}");

        if entry.is_dir() || lower.starts_with("__macosx/") {
            continue;
        }

        if lower.ends_with(".csv") {
            stats.csv_entries += 1;
            log::info!("[{source}] Reading {entry_name}");
            records.extend(read_csv(&mut entry, config, &label, remaining, next_row)?);
        } else if lower.ends_with(".zip") {
            if depth >= MAX_NESTING {
                log::warn!("[{source}] skipping {entry_name}: nested deeper than {MAX_NESTING}");
                continue;
            }

            let mut bytes = Vec::new();
            if let Err(e) = entry.read_to_end(&mut bytes) {
                log::warn!("[{source}] skipping {entry_name}: {e}");
                continue;
            }
            drop(entry);

            let mut inner = match zip::ZipArchive::new(Cursor::new(bytes)) {
                Ok(inner) => inner,
                Err(e) => {
                    log::warn!("[{source}] skipping {entry_name}: {e}");
                    continue;
                }
            };

            stats.nested_archives += 1;
            let inner_stats = read_archive(&mut inner, config, &label, depth + 1, records, next_row)?;
            stats.csv_entries += inner_stats.csv_entries;
            stats.nested_archives += inner_stats.nested_archives;
        }
    }

    Ok(stats)
}
