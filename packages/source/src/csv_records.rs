//! CSV parsing into [`RawComplaintRecord`]s.
//!
//! Fields are read as bytes and decoded with the configured encoding, so a
//! Latin-1 export never fails on invalid UTF-8. Rows are not validated here.

use std::io::Read;

use csv::ByteRecord;
use hotspot_map_complaint_models::RawComplaintRecord;

use crate::SourceError;
use crate::config::{ColumnNames, Encoding, LoaderConfig};

/// Column indices resolved against one file's header row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnLayout {
    offence: usize,
    position: usize,
    location: usize,
    timestamp: Option<usize>,
    status: Option<usize>,
    resolve_image: Option<usize>,
    offence_image: Option<usize>,
    id: Option<usize>,
}

impl ColumnLayout {
    fn resolve(headers: &[String], names: &ColumnNames, source: &str) -> Result<Self, SourceError> {
        let find = |name: &str| headers.iter().position(|h| h == name.trim());
        let require = |name: &str| {
            find(name).ok_or_else(|| SourceError::MissingColumn {
                path: source.to_owned(),
                column: name.to_owned(),
            })
        };

        Ok(Self {
            offence: require(&names.offence)?,
            position: require(&names.position)?,
            location: require(&names.location)?,
            timestamp: find(&names.timestamp),
            status: find(&names.status),
            resolve_image: find(&names.resolve_image),
            offence_image: find(&names.offence_image),
            id: names.id.as_deref().and_then(find),
        })
    }

    fn extract(&self, row: &ByteRecord, index: u64, encoding: Encoding) -> RawComplaintRecord {
        let field = |column: usize| row.get(column).map(|bytes| encoding.decode(bytes));
        let optional = |column: Option<usize>| column.and_then(field);

        RawComplaintRecord {
            id: optional(self.id).unwrap_or_else(|| index.to_string()),
            offence_type: field(self.offence).unwrap_or_default(),
            position: field(self.position),
            location_label: field(self.location).unwrap_or_default(),
            timestamp: optional(self.timestamp),
            status: optional(self.status),
            resolution_image_ref: optional(self.resolve_image),
            offence_image_ref: optional(self.offence_image),
        }
    }
}

/// Reads complaint rows from any CSV byte source.
///
/// `source` names the input in errors and logs. At most `limit` rows are
/// read when set. `next_row` is a row counter shared by every file of one
/// load; records without an id column take it as their id, so ids stay
/// unique across the files of an archive.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if the header row cannot be read and
/// [`SourceError::MissingColumn`] if a required column is absent.
pub fn read_csv(
    reader: impl Read,
    config: &LoaderConfig,
    source: &str,
    limit: Option<u64>,
    next_row: &mut u64,
) -> Result<Vec<RawComplaintRecord>, SourceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte())
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .byte_headers()
        .map_err(|e| SourceError::Csv {
            path: source.to_owned(),
            source: e,
        })?
        .iter()
        .map(|h| config.encoding.decode(h).trim().to_owned())
        .collect();

    let layout = ColumnLayout::resolve(&headers, &config.columns, source)?;

    let mut records = Vec::new();
    let mut row = ByteRecord::new();
    let mut read = 0u64;

    loop {
        if let Some(limit) = limit
            && read >= limit
        {
            log::info!("[{source}] Reached limit of {limit} records");
            break;
        }

        match csv_reader.read_byte_record(&mut row) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                log::warn!("[{source}] skipping malformed row {read}: {e}");
                read += 1;
                *next_row += 1;
                continue;
            }
        }

        records.push(layout.extract(&row, *next_row, config.encoding));
        read += 1;
        *next_row += 1;
    }

    log::debug!("[{source}] {} records", records.len());

    Ok(records)
}
