//! Subcommand implementations.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use dialoguer::Select;
use hotspot_map_complaint_models::{KNOWN_OFFENCE_TYPES, RawComplaintRecord};
use hotspot_map_hotspot::{
    DatasetFingerprint, HotspotCache, compute_hotspots, distinct_offence_types,
    to_feature_collection,
};
use hotspot_map_hotspot_models::{HotspotParams, HotspotReport};

/// Prints every offence type in the dataset with its record count.
pub fn categories(records: &[RawComplaintRecord]) {
    let types = distinct_offence_types(records);
    let width = types.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    println!("{} offence types, {} records", types.len(), records.len());
    for (name, count) in &types {
        println!("  {name:<width$}  {count:>7}");
    }
}

/// Computes one offence type, prints its table and writes optional outputs.
///
/// # Errors
///
/// Returns an error if the parameters are invalid or an output file cannot
/// be written.
pub fn hotspots(
    records: &[RawComplaintRecord],
    offence: &str,
    params: &HotspotParams,
    rows: usize,
    json: Option<&Path>,
    geojson: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = compute_hotspots(records, offence, params)?;

    print!("{}", format_table(&report, rows));

    if let Some(path) = json {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        log::info!("Wrote report to {}", path.display());
    }

    if let Some(path) = geojson {
        write_geojson(&report, path)?;
    }

    Ok(())
}

/// Computes every offence type in the dataset concurrently and writes one
/// `GeoJSON` file per type into `output_dir`.
///
/// # Errors
///
/// Returns an error if the parameters are invalid, a task panics, or an
/// output file cannot be written.
pub async fn all(
    records: Arc<Vec<RawComplaintRecord>>,
    params: HotspotParams,
    output_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(output_dir)?;

    let types = distinct_offence_types(&records);
    log::info!("Computing hotspots for {} offence types", types.len());

    let tasks: Vec<_> = types
        .into_iter()
        .map(|(offence, _)| {
            let records = Arc::clone(&records);
            let name = offence.clone();
            let task =
                tokio::task::spawn_blocking(move || compute_hotspots(&records, &offence, &params));
            (name, task)
        })
        .collect();

    let mut used_stems = BTreeSet::new();
    for (offence, task) in tasks {
        let report = task.await??;
        let stem = unique_stem(&offence, &mut used_stems);
        let path = output_dir.join(format!("{stem}.geojson"));
        write_geojson(&report, &path)?;
        println!(
            "{offence}: {} hotspots from {} complaints",
            report.hotspots.len(),
            report.valid_records
        );
    }

    Ok(())
}

/// Menu over the known offence types until the user quits. Repeated
/// selections are answered from a cache.
///
/// # Errors
///
/// Returns an error if the terminal prompt fails or the parameters are
/// invalid.
pub fn interactive(
    records: &[RawComplaintRecord],
    params: &HotspotParams,
    rows: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let fingerprint = DatasetFingerprint::of(records);
    let mut cache = HotspotCache::new();

    let mut labels: Vec<&str> = KNOWN_OFFENCE_TYPES.to_vec();
    labels.push("Quit");

    let mut selected = 0;
    loop {
        selected = Select::new()
            .with_prompt("Select an offence type")
            .items(&labels)
            .default(selected)
            .interact()?;

        let Some(offence) = KNOWN_OFFENCE_TYPES.get(selected) else {
            break;
        };

        let report = cache.get_or_compute(&fingerprint, records, offence, params)?;
        print!("{}", format_table(&report, rows));
        println!();
    }

    log::debug!(
        "Hotspot cache: {} hits, {} misses",
        cache.hits(),
        cache.misses()
    );

    Ok(())
}

fn write_geojson(report: &HotspotReport, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let collection = to_feature_collection(&report.hotspots);
    std::fs::write(path, serde_json::to_string(&collection)?)?;
    log::info!("Wrote {} features to {}", collection.features.len(), path.display());
    Ok(())
}

/// Renders the first `rows` hotspots as a plain-text table.
#[must_use]
pub fn format_table(report: &HotspotReport, rows: usize) -> String {
    let mut out = String::new();

    if report.is_empty() {
        let _ = writeln!(out, "No hotspots for '{}'", report.offence_type);
        return out;
    }

    let _ = writeln!(
        out,
        "Top {} of {} hotspots for '{}' ({} complaints, {} rejected)",
        report.top(rows).len(),
        report.hotspots.len(),
        report.offence_type,
        report.valid_records,
        report.rejected_records
    );
    let _ = writeln!(
        out,
        "{:>4}  {:>11}  {:>10}  {:>10}  Location",
        "Rank", "Occurrences", "Latitude", "Longitude"
    );

    for hotspot in report.top(rows) {
        let summary = &hotspot.summary;
        let _ = writeln!(
            out,
            "{:>4}  {:>11}  {:>10.6}  {:>10.6}  {}",
            hotspot.rank,
            summary.member_count,
            summary.centroid_latitude,
            summary.centroid_longitude,
            summary.representative_location_label
        );
    }

    out
}

/// Filesystem-safe name for an offence type.
#[must_use]
pub fn file_stem(offence: &str) -> String {
    let mut stem = String::with_capacity(offence.len());
    for c in offence.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "unnamed".to_string()
    } else {
        stem.to_string()
    }
}

/// [`file_stem`] with a numeric suffix when the stem is already in `used`.
pub fn unique_stem(offence: &str, used: &mut BTreeSet<String>) -> String {
    let base = file_stem(offence);
    let mut stem = base.clone();
    let mut suffix = 2;
    while used.contains(&stem) {
        stem = format!("{base}_{suffix}");
        suffix += 1;
    }
    used.insert(stem.clone());
    stem
}
