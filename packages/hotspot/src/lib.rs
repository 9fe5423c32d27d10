#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geospatial hotspot clustering, aggregation and ranking engine.
//!
//! A run takes the loaded complaint records, keeps those of one offence
//! type, drops malformed positions, clusters the rest under a great-circle
//! distance threshold, summarizes each cluster, ranks the clusters by size
//! and derives color and marker attributes for the top-K.
//!
//! Runs are synchronous and own no state between calls. Independent
//! offence types can be computed concurrently by the caller; a single run
//! is inherently sequential.

pub mod aggregate;
pub mod cache;
pub mod cluster;
pub mod export;
pub mod intensity;
pub mod rank;
pub mod sphere;
pub mod validate;

use std::collections::BTreeMap;

use hotspot_map_complaint_models::{ComplaintRecord, RadianCoordinate, RawComplaintRecord};
use hotspot_map_hotspot_models::{HotspotParams, HotspotReport, InvalidParamsError};

pub use cache::{DatasetFingerprint, HotspotCache};
pub use export::to_feature_collection;

/// Computes the ranked hotspots of one offence type.
///
/// Records are matched on exact offence-type equality. An offence type
/// that matches nothing yields an empty report, not an error.
///
/// # Errors
///
/// Returns [`InvalidParamsError`] if `params` fail validation. Record data
/// never causes an error.
pub fn compute_hotspots(
    records: &[RawComplaintRecord],
    offence_type: &str,
    params: &HotspotParams,
) -> Result<HotspotReport, InvalidParamsError> {
    params.validate()?;

    let matched: Vec<&RawComplaintRecord> = records
        .iter()
        .filter(|record| record.offence_type == offence_type)
        .collect();

    if matched.is_empty() {
        log::info!("No complaints of type '{offence_type}'");
        return Ok(HotspotReport::empty(offence_type));
    }

    let validated = validate::validate_records(matched.iter().copied());
    let report = hotspots_from_valid(&validated.records, offence_type, params);

    Ok(HotspotReport {
        matched_records: matched.len(),
        rejected_records: validated.rejected.len(),
        ..report
    })
}

/// Runs clustering, aggregation, ranking and intensity on records that
/// already passed validation.
#[must_use]
pub fn hotspots_from_valid(
    records: &[ComplaintRecord],
    offence_type: &str,
    params: &HotspotParams,
) -> HotspotReport {
    let points: Vec<RadianCoordinate> = records
        .iter()
        .map(|record| record.coordinate.to_radians())
        .collect();

    let assignment = cluster::cluster_points(&points, params.epsilon_radians, params.min_points);
    let summaries = aggregate::aggregate(records, &assignment);
    let cluster_count = summaries.len();

    let ranked = rank::top_k(summaries, params.top_k);
    let hotspots = intensity::apply_intensity(ranked, params, &intensity::YL_OR_RD);

    if let Some(largest) = hotspots.first() {
        log::info!(
            "'{offence_type}': {} complaints in {cluster_count} clusters, largest has {} at {}",
            records.len(),
            largest.member_count(),
            largest.summary.representative_location_label
        );
    }

    HotspotReport {
        offence_type: offence_type.to_owned(),
        matched_records: records.len(),
        valid_records: records.len(),
        rejected_records: 0,
        noise_records: assignment.noise_count(),
        cluster_count,
        hotspots,
    }
}

/// Distinct offence types with their record counts, most frequent first
/// and ties in name order.
#[must_use]
pub fn distinct_offence_types(records: &[RawComplaintRecord]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.offence_type.as_str()).or_default() += 1;
    }

    let mut types: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_owned(), count))
        .collect();
    types.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use hotspot_map_hotspot_models::{DEFAULT_EPSILON_RADIANS, meters_to_radians};

    const OFFENCE: &str = "Illegal dumping of Garbage on road sides/ vacant land";
    const BASE_LAT: f64 = 28.6139;
    const BASE_LON: f64 = 77.2090;

    /// A record `north_m` meters north and `east_m` meters east of the base
    /// point, expressed as a degree position string.
    fn record_at(id: usize, north_m: f64, east_m: f64) -> RawComplaintRecord {
        let lat = BASE_LAT + meters_to_radians(north_m).to_degrees();
        let lon = BASE_LON + (meters_to_radians(east_m) / BASE_LAT.to_radians().cos()).to_degrees();
        RawComplaintRecord {
            id: id.to_string(),
            offence_type: OFFENCE.to_string(),
            position: Some(format!("{lat},{lon}")),
            location_label: format!("Block {id}"),
            timestamp: Some(format!("2024-05-{:02}", id % 28 + 1)),
            status: Some("Open".to_string()),
            resolution_image_ref: None,
            offence_image_ref: None,
        }
    }

    fn run(records: &[RawComplaintRecord]) -> HotspotReport {
        compute_hotspots(records, OFFENCE, &HotspotParams::default()).unwrap()
    }

    #[test]
    fn identical_coordinates_make_one_full_intensity_hotspot() {
        let records: Vec<_> = (0..3).map(|id| record_at(id, 0.0, 0.0)).collect();
        let report = run(&records);

        assert_eq!(report.hotspots.len(), 1);
        let hotspot = &report.hotspots[0];
        assert_eq!(hotspot.member_count(), 3);
        assert_eq!(hotspot.rank, 1);
        assert!((hotspot.color_intensity - 1.0).abs() < f64::EPSILON);
        assert_eq!(hotspot.summary.representative_location_label, "Block 0");
    }

    #[test]
    fn ten_meters_apart_are_two_singletons() {
        let records = vec![record_at(0, 0.0, 0.0), record_at(1, 10.0, 0.0)];
        let report = run(&records);

        assert_eq!(report.cluster_count, 2);
        assert!(report.hotspots.iter().all(|h| h.member_count() == 1));
        assert!(
            report
                .hotspots
                .iter()
                .all(|h| (h.color_intensity - 1.0).abs() < f64::EPSILON)
        );
    }

    #[test]
    fn chained_spacing_forms_one_cluster() {
        let records = vec![
            record_at(0, 0.0, 0.0),
            record_at(1, 3.0, 0.0),
            record_at(2, 6.0, 0.0),
        ];
        let report = run(&records);

        assert_eq!(report.cluster_count, 1);
        assert_eq!(report.hotspots[0].member_count(), 3);
    }

    #[test]
    fn unknown_offence_type_is_empty() {
        let records = vec![record_at(0, 0.0, 0.0)];
        let report = compute_hotspots(&records, "Not a category", &HotspotParams::default())
            .unwrap();

        assert!(report.is_empty());
        assert_eq!(report.matched_records, 0);
        assert_eq!(report.offence_type, "Not a category");
    }

    #[test]
    fn empty_dataset_is_empty() {
        assert!(run(&[]).is_empty());
    }

    /// 150 well separated sites; site `s` gets `s % 9 + 1` complaints, and
    /// site 149 gets 20 so that the global maximum is unique.
    fn many_sites() -> Vec<RawComplaintRecord> {
        let mut records = Vec::new();
        let mut id = 0;
        for site in 0..150 {
            let copies = if site == 149 { 20 } else { site % 9 + 1 };
            for _ in 0..copies {
                records.push(record_at(id, f64::from(site) * 100.0, 0.0));
                id += 1;
            }
        }
        records
    }

    #[test]
    fn truncates_to_hundred_largest() {
        let report = run(&many_sites());

        assert_eq!(report.cluster_count, 150);
        assert_eq!(report.hotspots.len(), 100);
        assert_eq!(report.hotspots[0].member_count(), 20);
        assert_eq!(report.hotspots[0].rank, 1);
        assert!(
            report
                .hotspots
                .windows(2)
                .all(|w| w[0].member_count() >= w[1].member_count())
        );
        assert!(
            report
                .hotspots
                .iter()
                .all(|h| (0.0..=1.0).contains(&h.color_intensity))
        );
        assert_eq!(report.top(10).len(), 10);
    }

    #[test]
    fn equal_counts_rank_by_first_appearance() {
        let records = vec![
            record_at(0, 500.0, 0.0),
            record_at(1, 0.0, 0.0),
            record_at(2, 500.0, 0.0),
            record_at(3, 0.0, 0.0),
        ];
        let report = run(&records);

        let labels: Vec<&str> = report
            .hotspots
            .iter()
            .map(|h| h.summary.representative_location_label.as_str())
            .collect();
        assert_eq!(labels, vec!["Block 0", "Block 1"]);
    }

    #[test]
    fn clusters_partition_the_valid_records() {
        let mut records = many_sites();
        records.push(RawComplaintRecord {
            position: Some("garbage".to_string()),
            ..record_at(10_000, 0.0, 0.0)
        });

        let params = HotspotParams {
            top_k: usize::MAX,
            ..HotspotParams::default()
        };
        let report = compute_hotspots(&records, OFFENCE, &params).unwrap();

        assert_eq!(report.rejected_records, 1);
        assert_eq!(report.valid_records, records.len() - 1);

        let member_ids: Vec<&str> = report
            .hotspots
            .iter()
            .flat_map(|h| h.summary.member_records.iter().map(|r| r.id.as_str()))
            .collect();
        let unique: BTreeSet<&str> = member_ids.iter().copied().collect();
        assert_eq!(member_ids.len(), report.valid_records);
        assert_eq!(unique.len(), report.valid_records);
        assert!(!unique.contains("10000"));
    }

    #[test]
    fn members_of_a_cluster_are_chain_connected() {
        let records: Vec<_> = (0..40u32)
            .map(|i| record_at(i as usize, f64::from(i * 37 % 11) * 2.5, f64::from(i % 3) * 4.0))
            .collect();
        let report = compute_hotspots(
            &records,
            OFFENCE,
            &HotspotParams {
                top_k: usize::MAX,
                ..HotspotParams::default()
            },
        )
        .unwrap();

        let to_rad = |r: &ComplaintRecord| r.coordinate.to_radians();
        for hotspot in &report.hotspots {
            let members = &hotspot.summary.member_records;
            // Every member reaches the first one through same-cluster hops.
            let mut reached = vec![false; members.len()];
            reached[0] = true;
            let mut frontier = vec![0];
            while let Some(i) = frontier.pop() {
                for j in 0..members.len() {
                    if !reached[j]
                        && sphere::central_angle(to_rad(&members[i]), to_rad(&members[j]))
                            <= DEFAULT_EPSILON_RADIANS
                    {
                        reached[j] = true;
                        frontier.push(j);
                    }
                }
            }
            assert!(reached.iter().all(|r| *r));
        }

        // No member of one hotspot is within epsilon of another hotspot.
        for (a, first) in report.hotspots.iter().enumerate() {
            for second in &report.hotspots[a + 1..] {
                for x in &first.summary.member_records {
                    for y in &second.summary.member_records {
                        assert!(
                            sphere::central_angle(to_rad(x), to_rad(y)) > DEFAULT_EPSILON_RADIANS
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn repeated_runs_are_identical() {
        let records = many_sites();
        assert_eq!(run(&records), run(&records));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let params = HotspotParams {
            epsilon_radians: f64::NAN,
            ..HotspotParams::default()
        };
        assert!(compute_hotspots(&[], OFFENCE, &params).is_err());
    }

    #[test]
    fn min_points_reports_noise() {
        let records = vec![
            record_at(0, 0.0, 0.0),
            record_at(1, 1.0, 0.0),
            record_at(2, 300.0, 0.0),
        ];
        let params = HotspotParams {
            min_points: 2,
            ..HotspotParams::default()
        };
        let report = compute_hotspots(&records, OFFENCE, &params).unwrap();

        assert_eq!(report.noise_records, 1);
        assert_eq!(report.cluster_count, 1);
        assert_eq!(report.hotspots[0].member_count(), 2);
    }

    #[test]
    fn counts_distinct_offence_types() {
        let mut records = vec![record_at(0, 0.0, 0.0), record_at(1, 0.0, 0.0)];
        records.push(RawComplaintRecord {
            offence_type: "Road Dust".to_string(),
            ..record_at(2, 0.0, 0.0)
        });
        records.push(RawComplaintRecord {
            offence_type: "Potholes on Roads".to_string(),
            ..record_at(3, 0.0, 0.0)
        });

        assert_eq!(
            distinct_offence_types(&records),
            vec![
                (OFFENCE.to_string(), 2),
                ("Potholes on Roads".to_string(), 1),
                ("Road Dust".to_string(), 1),
            ]
        );
    }

    #[test]
    fn epsilon_is_configurable() {
        let records = vec![record_at(0, 0.0, 0.0), record_at(1, 10.0, 0.0)];
        let params = HotspotParams {
            epsilon_radians: meters_to_radians(12.0),
            ..HotspotParams::default()
        };
        let report = compute_hotspots(&records, OFFENCE, &params).unwrap();
        assert_eq!(report.cluster_count, 1);
    }
}
