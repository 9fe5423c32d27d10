//! `GeoJSON` export of ranked hotspots for the map layer.
//!
//! Each hotspot becomes a `Point` feature at its centroid carrying the
//! attributes a marker and its popup need.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, feature::Id};
use hotspot_map_hotspot_models::RankedHotspot;
use serde_json::Value;

/// Converts one hotspot to a `GeoJSON` feature.
#[must_use]
pub fn to_feature(hotspot: &RankedHotspot) -> Feature {
    let summary = &hotspot.summary;
    let centroid = geo::Point::new(summary.centroid_longitude, summary.centroid_latitude);

    let mut properties = JsonObject::new();
    properties.insert("rank".to_owned(), Value::from(hotspot.rank));
    properties.insert("clusterId".to_owned(), Value::from(summary.cluster_id.0));
    properties.insert("occurrences".to_owned(), Value::from(summary.member_count));
    properties.insert(
        "location".to_owned(),
        Value::from(summary.representative_location_label.clone()),
    );
    properties.insert(
        "colorIntensity".to_owned(),
        Value::from(hotspot.color_intensity),
    );
    properties.insert("color".to_owned(), Value::from(hotspot.color.clone()));
    properties.insert("markerRadius".to_owned(), Value::from(hotspot.marker_radius));
    properties.insert(
        "dates".to_owned(),
        Value::from(summary.details.timestamps.clone()),
    );
    properties.insert(
        "statuses".to_owned(),
        Value::from(summary.details.statuses.clone()),
    );
    properties.insert(
        "resolveImages".to_owned(),
        Value::from(summary.details.resolution_images.clone()),
    );
    properties.insert(
        "offenceImages".to_owned(),
        Value::from(summary.details.offence_images.clone()),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&centroid))),
        id: Some(Id::Number(hotspot.rank.into())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Converts ranked hotspots to a `GeoJSON` feature collection, in rank order.
#[must_use]
pub fn to_feature_collection(hotspots: &[RankedHotspot]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: hotspots.iter().map(to_feature).collect(),
        foreign_members: None,
    }
}
