//! Per-cluster summary statistics.

use hotspot_map_complaint_models::ComplaintRecord;
use hotspot_map_hotspot_models::{ClusterAssignment, ClusterId, HotspotDetails, HotspotSummary};

/// Builds one [`HotspotSummary`] per cluster, in ascending cluster id order.
///
/// `records[i]` must be the record clustered as point `i`. The centroid is
/// the plain mean of member degrees, which is accurate enough at the
/// meter-scale extent epsilon allows. Noise points contribute to no
/// summary.
#[must_use]
pub fn aggregate(records: &[ComplaintRecord], assignment: &ClusterAssignment) -> Vec<HotspotSummary> {
    debug_assert_eq!(records.len(), assignment.len());

    assignment
        .members()
        .into_iter()
        .enumerate()
        .filter(|(_, members)| !members.is_empty())
        .map(|(id, members)| {
            let members: Vec<&ComplaintRecord> = members.iter().map(|&i| &records[i]).collect();
            summarize(ClusterId(id), &members)
        })
        .collect()
}

fn summarize(cluster_id: ClusterId, members: &[&ComplaintRecord]) -> HotspotSummary {
    #[allow(clippy::cast_precision_loss)]
    let count = members.len() as f64;

    let (lat_sum, lon_sum) = members.iter().fold((0.0, 0.0), |(lat, lon), record| {
        (lat + record.latitude(), lon + record.longitude())
    });

    HotspotSummary {
        cluster_id,
        centroid_latitude: lat_sum / count,
        centroid_longitude: lon_sum / count,
        member_count: members.len(),
        representative_location_label: members
            .first()
            .map(|record| record.location_label.clone())
            .unwrap_or_default(),
        details: collect_details(members),
        member_records: members.iter().map(|&record| record.clone()).collect(),
    }
}

/// Gathers member detail fields, skipping missing values.
#[must_use]
pub fn collect_details(members: &[&ComplaintRecord]) -> HotspotDetails {
    fn gather(
        members: &[&ComplaintRecord],
        field: impl Fn(&ComplaintRecord) -> Option<&String>,
    ) -> Vec<String> {
        members
            .iter()
            .filter_map(|&record| field(record))
            .filter(|value| !value.trim().is_empty())
            .cloned()
            .collect()
    }

    HotspotDetails {
        timestamps: gather(members, |r| r.timestamp.as_ref()),
        statuses: gather(members, |r| r.status.as_ref()),
        resolution_images: gather(members, |r| r.resolution_image_ref.as_ref()),
        offence_images: gather(members, |r| r.offence_image_ref.as_ref()),
    }
}
