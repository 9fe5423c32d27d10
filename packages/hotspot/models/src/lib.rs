#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hotspot clustering parameters, cluster summaries and ranked results.
//!
//! These are the value types flowing between the stages of the hotspot
//! engine and out to the rendering layer. They carry no behavior beyond
//! small derived accessors; all algorithms live in `hotspot_map_hotspot`.

use hotspot_map_complaint_models::ComplaintRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Default clustering distance threshold, about 5.4 meters on the ground.
pub const DEFAULT_EPSILON_RADIANS: f64 = 8.5e-7;

/// Default minimum neighbourhood size. At 1 no point is ever noise.
pub const DEFAULT_MIN_POINTS: usize = 1;

/// Default number of ranked hotspots kept.
pub const DEFAULT_TOP_K: usize = 100;

/// Default marker radius before the count contribution.
pub const DEFAULT_MARKER_BASE_RADIUS: f64 = 5.0;

/// Default number of members per extra unit of marker radius.
pub const DEFAULT_MARKER_COUNT_DIVISOR: f64 = 10.0;

/// Converts a ground distance to a central angle.
#[must_use]
pub fn meters_to_radians(meters: f64) -> f64 {
    meters / EARTH_RADIUS_METERS
}

/// Converts a central angle to a ground distance.
#[must_use]
pub fn radians_to_meters(radians: f64) -> f64 {
    radians * EARTH_RADIUS_METERS
}

/// Identifier of one cluster within a single clustering run.
///
/// Ids are dense and assigned in the order each cluster's first point
/// appears in the clustered input.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ClusterId(pub usize);

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The cluster label of every point in one clustering run.
///
/// `labels[i]` is the cluster of input point `i`, or `None` if the point
/// is noise (only possible when `min_points > 1`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<Option<ClusterId>>,
    cluster_count: usize,
}

impl ClusterAssignment {
    /// Wraps a label vector produced by the clustering engine.
    #[must_use]
    pub const fn new(labels: Vec<Option<ClusterId>>, cluster_count: usize) -> Self {
        Self {
            labels,
            cluster_count,
        }
    }

    /// The label of point `index`.
    #[must_use]
    pub fn label(&self, index: usize) -> Option<ClusterId> {
        self.labels.get(index).copied().flatten()
    }

    /// All labels in input order.
    #[must_use]
    pub fn labels(&self) -> &[Option<ClusterId>] {
        &self.labels
    }

    /// Number of points that were labelled.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the run had no input points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of distinct clusters.
    #[must_use]
    pub const fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Number of points that belong to no cluster.
    #[must_use]
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_none()).count()
    }

    /// Whether every point belongs to some cluster.
    #[must_use]
    pub fn is_total(&self) -> bool {
        self.labels.iter().all(Option::is_some)
    }

    /// Member indices per cluster, indexed by cluster id.
    ///
    /// Members within each cluster are in ascending input order.
    #[must_use]
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.cluster_count];
        for (index, label) in self.labels.iter().enumerate() {
            if let Some(ClusterId(id)) = label {
                members[*id].push(index);
            }
        }
        members
    }
}

/// Per-member detail fields collected for a hotspot popup.
///
/// Each list is in member order with missing or blank values removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotDetails {
    /// Complaint timestamps.
    pub timestamps: Vec<String>,
    /// Complaint statuses.
    pub statuses: Vec<String>,
    /// Resolution image references.
    pub resolution_images: Vec<String>,
    /// Offence image references.
    pub offence_images: Vec<String>,
}

impl HotspotDetails {
    /// Timestamps joined for display.
    #[must_use]
    pub fn joined_timestamps(&self) -> String {
        self.timestamps.join(", ")
    }

    /// Statuses joined for display.
    #[must_use]
    pub fn joined_statuses(&self) -> String {
        self.statuses.join(", ")
    }
}

/// Aggregate statistics of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotSummary {
    /// Cluster this summary describes.
    pub cluster_id: ClusterId,
    /// Arithmetic mean of member latitudes in degrees.
    pub centroid_latitude: f64,
    /// Arithmetic mean of member longitudes in degrees.
    pub centroid_longitude: f64,
    /// Number of member records.
    pub member_count: usize,
    /// Location label of the first member in input order.
    pub representative_location_label: String,
    /// Detail fields collected from the members.
    pub details: HotspotDetails,
    /// Member records in input order.
    pub member_records: Vec<ComplaintRecord>,
}

/// A [`HotspotSummary`] that made it into the top-K.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedHotspot {
    /// 1-based rank; 1 is the largest cluster.
    pub rank: usize,
    /// Min-max normalized member count in `[0, 1]`.
    pub color_intensity: f64,
    /// `#rrggbb` color for the intensity on the sequential scale.
    pub color: String,
    /// Marker radius, increasing with member count.
    pub marker_radius: f64,
    /// The underlying cluster summary.
    #[serde(flatten)]
    pub summary: HotspotSummary,
}

impl RankedHotspot {
    /// Number of records in the hotspot.
    #[must_use]
    pub const fn member_count(&self) -> usize {
        self.summary.member_count
    }
}

/// Errors from invalid [`HotspotParams`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidParamsError {
    /// Epsilon must be a positive, finite angle.
    #[error("epsilon must be positive and finite, got {0}")]
    Epsilon(f64),

    /// At least one point is needed to form a neighbourhood.
    #[error("min_points must be at least 1")]
    MinPoints,

    /// The marker divisor must be positive and finite.
    #[error("marker_count_divisor must be positive and finite, got {0}")]
    MarkerDivisor(f64),

    /// The marker base radius must be non-negative and finite.
    #[error("marker_base_radius must be non-negative and finite, got {0}")]
    MarkerBaseRadius(f64),
}

/// Tunable parameters of a hotspot run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotspotParams {
    /// Maximum central angle, in radians, between directly connected points.
    pub epsilon_radians: f64,
    /// Minimum neighbourhood size (self included) for a core point.
    pub min_points: usize,
    /// Number of ranked hotspots to keep.
    pub top_k: usize,
    /// Marker radius for a cluster of zero members.
    pub marker_base_radius: f64,
    /// Members per extra unit of marker radius.
    pub marker_count_divisor: f64,
}

impl Default for HotspotParams {
    fn default() -> Self {
        Self {
            epsilon_radians: DEFAULT_EPSILON_RADIANS,
            min_points: DEFAULT_MIN_POINTS,
            top_k: DEFAULT_TOP_K,
            marker_base_radius: DEFAULT_MARKER_BASE_RADIUS,
            marker_count_divisor: DEFAULT_MARKER_COUNT_DIVISOR,
        }
    }
}

impl HotspotParams {
    /// Checks that the parameters describe a meaningful run.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParamsError`] for the first invalid field.
    pub fn validate(&self) -> Result<(), InvalidParamsError> {
        if !(self.epsilon_radians.is_finite() && self.epsilon_radians > 0.0) {
            return Err(InvalidParamsError::Epsilon(self.epsilon_radians));
        }
        if self.min_points == 0 {
            return Err(InvalidParamsError::MinPoints);
        }
        if !(self.marker_count_divisor.is_finite() && self.marker_count_divisor > 0.0) {
            return Err(InvalidParamsError::MarkerDivisor(self.marker_count_divisor));
        }
        if !(self.marker_base_radius.is_finite() && self.marker_base_radius >= 0.0) {
            return Err(InvalidParamsError::MarkerBaseRadius(
                self.marker_base_radius,
            ));
        }
        Ok(())
    }

    /// Epsilon expressed as a ground distance.
    #[must_use]
    pub fn epsilon_meters(&self) -> f64 {
        radians_to_meters(self.epsilon_radians)
    }

    /// A string that is equal for two parameter sets iff they are
    /// bit-identical, suitable as part of a cache key.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "{:016x}:{}:{}:{:016x}:{:016x}",
            self.epsilon_radians.to_bits(),
            self.min_points,
            self.top_k,
            self.marker_base_radius.to_bits(),
            self.marker_count_divisor.to_bits(),
        )
    }
}

/// The result of one hotspot run for a single offence type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotReport {
    /// The offence type the records were filtered by.
    pub offence_type: String,
    /// Records whose offence type matched.
    pub matched_records: usize,
    /// Matched records with a valid position.
    pub valid_records: usize,
    /// Matched records dropped for a malformed position.
    pub rejected_records: usize,
    /// Valid records that ended up in no cluster.
    pub noise_records: usize,
    /// Number of clusters before truncation to the top-K.
    pub cluster_count: usize,
    /// Ranked hotspots, at most `top_k` of them.
    pub hotspots: Vec<RankedHotspot>,
}

impl HotspotReport {
    /// A report with no hotspots.
    #[must_use]
    pub fn empty(offence_type: &str) -> Self {
        Self {
            offence_type: offence_type.to_owned(),
            matched_records: 0,
            valid_records: 0,
            rejected_records: 0,
            noise_records: 0,
            cluster_count: 0,
            hotspots: Vec::new(),
        }
    }

    /// The first `n` ranked hotspots, for tabular display.
    #[must_use]
    pub fn top(&self, n: usize) -> &[RankedHotspot] {
        &self.hotspots[..n.min(self.hotspots.len())]
    }

    /// Whether the run produced no hotspots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hotspots.is_empty()
    }
}
