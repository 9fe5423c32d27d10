//! Ordering clusters by significance.

use std::cmp::Ordering;

use hotspot_map_hotspot_models::HotspotSummary;

/// Orders summaries by member count, largest first, ties broken by
/// ascending cluster id.
#[must_use]
pub fn by_significance(a: &HotspotSummary, b: &HotspotSummary) -> Ordering {
    b.member_count
        .cmp(&a.member_count)
        .then_with(|| a.cluster_id.cmp(&b.cluster_id))
}

/// Sorts summaries by significance and keeps the first `k`.
///
/// The rank of each returned summary is its 1-based position.
#[must_use]
pub fn top_k(mut summaries: Vec<HotspotSummary>, k: usize) -> Vec<HotspotSummary> {
    summaries.sort_by(by_significance);
    summaries.truncate(k);
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotspot_map_hotspot_models::{ClusterId, HotspotDetails};

    fn summary(id: usize, count: usize) -> HotspotSummary {
        HotspotSummary {
            cluster_id: ClusterId(id),
            centroid_latitude: 28.6,
            centroid_longitude: 77.2,
            member_count: count,
            representative_location_label: format!("Cluster {id}"),
            details: HotspotDetails::default(),
            member_records: Vec::new(),
        }
    }

    fn ids(summaries: &[HotspotSummary]) -> Vec<usize> {
        summaries.iter().map(|s| s.cluster_id.0).collect()
    }

    #[test]
    fn sorts_by_count_descending() {
        let ranked = top_k(vec![summary(0, 1), summary(1, 5), summary(2, 3)], 10);
        assert_eq!(ids(&ranked), vec![1, 2, 0]);
    }

    #[test]
    fn ties_keep_ascending_cluster_id() {
        // Input deliberately out of id order to show the tie-break is explicit.
        let ranked = top_k(
            vec![summary(3, 2), summary(1, 2), summary(2, 4), summary(0, 2)],
            10,
        );
        assert_eq!(ids(&ranked), vec![2, 0, 1, 3]);
    }

    #[test]
    fn truncates_to_k() {
        let summaries = (0..150).map(|id| summary(id, id % 7 + 1)).collect();
        let ranked = top_k(summaries, 100);
        assert_eq!(ranked.len(), 100);
        assert_eq!(ranked[0].member_count, 7);
        assert!(
            ranked
                .windows(2)
                .all(|w| w[0].member_count >= w[1].member_count)
        );
    }

    #[test]
    fn fewer_than_k_keeps_all() {
        assert_eq!(top_k(vec![summary(0, 1), summary(1, 1)], 100).len(), 2);
        assert!(top_k(Vec::new(), 100).is_empty());
    }

    #[test]
    fn zero_k_keeps_none() {
        assert!(top_k(vec![summary(0, 1)], 0).is_empty());
    }
}
