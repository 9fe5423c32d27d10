#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Civic complaint record types and coordinate validation.
//!
//! A [`RawComplaintRecord`] is what the record loader hands over: every
//! field is still text and the position is the combined `"lat,long"`
//! column. [`ComplaintRecord`] is the validated form that the hotspot
//! engine clusters on. Conversion between the two is the only place a
//! position string is parsed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The offence categories offered by the complaint portal's selector.
///
/// The engine never validates against this list; an unknown category
/// simply matches no records.
pub const KNOWN_OFFENCE_TYPES: &[&str] = &[
    "Illegal dumping of Garbage on road sides/ vacant land",
    "Burning of garbage/plastic waste",
    "Air pollution from the sources other than Industry",
    "Potholes on Roads",
    "Road Dust",
    "Dust Pollution due to Construction/ Demolition activity",
    "Sale and Storage of banned SUP items",
    "Mfg. of banned SUP items in non Industrial Area",
    "Noise pollution from the sources other than Industry",
    "Visible smoke from vehicle exhaust",
];

/// Separator between the latitude and longitude halves of a position field.
pub const POSITION_SEPARATOR: char = ',';

/// Reasons a position field cannot be turned into a [`Coordinate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedCoordinateError {
    /// The position field is absent or blank.
    #[error("position is missing")]
    Missing,

    /// The position field has no `,` separating latitude and longitude.
    #[error("position '{0}' has no separator")]
    MissingSeparator(String),

    /// The position field splits into more than two parts.
    #[error("position '{0}' has more than two parts")]
    TooManyParts(String),

    /// One half of the position is not a decimal number.
    #[error("{half} '{value}' is not a number")]
    NotANumber {
        /// Which half failed (`"latitude"` or `"longitude"`).
        half: &'static str,
        /// The offending text.
        value: String,
    },

    /// One half parsed to `NaN` or an infinity.
    #[error("{0} is not finite")]
    NotFinite(&'static str),

    /// Latitude outside `[-90, 90]`.
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// Longitude outside `[-180, 180]`.
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A WGS84 position in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, within `[-90, 90]`.
    pub latitude: f64,
    /// Longitude in degrees, within `[-180, 180]`.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate after checking both degree ranges.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedCoordinateError`] if either value is not finite
    /// or lies outside its valid range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, MalformedCoordinateError> {
        if !latitude.is_finite() {
            return Err(MalformedCoordinateError::NotFinite("latitude"));
        }
        if !longitude.is_finite() {
            return Err(MalformedCoordinateError::NotFinite("longitude"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(MalformedCoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(MalformedCoordinateError::LongitudeOutOfRange(longitude));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Converts to the angular representation the clustering metric uses.
    #[must_use]
    pub fn to_radians(self) -> RadianCoordinate {
        RadianCoordinate {
            latitude: self.latitude.to_radians(),
            longitude: self.longitude.to_radians(),
        }
    }
}

/// A position on the unit sphere in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadianCoordinate {
    /// Latitude in radians.
    pub latitude: f64,
    /// Longitude in radians.
    pub longitude: f64,
}

/// Parses a combined `"lat,long"` position field.
///
/// Each half is trimmed before parsing, so `"28.61, 77.20"` is accepted.
///
/// # Errors
///
/// Returns [`MalformedCoordinateError`] if the separator is missing, the
/// field has extra parts, either half is not numeric, or the values are out
/// of range.
pub fn parse_position(text: &str) -> Result<Coordinate, MalformedCoordinateError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(MalformedCoordinateError::Missing);
    }

    let Some((lat_str, lon_str)) = trimmed.split_once(POSITION_SEPARATOR) else {
        return Err(MalformedCoordinateError::MissingSeparator(trimmed.to_owned()));
    };

    if lon_str.contains(POSITION_SEPARATOR) {
        return Err(MalformedCoordinateError::TooManyParts(trimmed.to_owned()));
    }

    let latitude = parse_half("latitude", lat_str)?;
    let longitude = parse_half("longitude", lon_str)?;

    Coordinate::new(latitude, longitude)
}

fn parse_half(half: &'static str, value: &str) -> Result<f64, MalformedCoordinateError> {
    let value = value.trim();
    value
        .parse::<f64>()
        .map_err(|_| MalformedCoordinateError::NotANumber {
            half,
            value: value.to_owned(),
        })
}

/// Returns `None` for absent or whitespace-only values.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// A complaint record exactly as supplied by the record loader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComplaintRecord {
    /// Opaque, stable identifier.
    pub id: String,
    /// Offence category label.
    pub offence_type: String,
    /// Combined `"lat,long"` position text.
    pub position: Option<String>,
    /// Free-text representative address.
    pub location_label: String,
    /// Date and time the complaint was filed, verbatim.
    pub timestamp: Option<String>,
    /// Current complaint status.
    pub status: Option<String>,
    /// Image attached when the complaint was resolved.
    pub resolution_image_ref: Option<String>,
    /// Image attached when the complaint was filed.
    pub offence_image_ref: Option<String>,
}

/// A complaint whose position passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintRecord {
    /// Opaque, stable identifier.
    pub id: String,
    /// Offence category label.
    pub offence_type: String,
    /// Validated position in degrees.
    pub coordinate: Coordinate,
    /// Free-text representative address.
    pub location_label: String,
    /// Date and time the complaint was filed, verbatim.
    pub timestamp: Option<String>,
    /// Current complaint status.
    pub status: Option<String>,
    /// Image attached when the complaint was resolved.
    pub resolution_image_ref: Option<String>,
    /// Image attached when the complaint was filed.
    pub offence_image_ref: Option<String>,
}

impl ComplaintRecord {
    /// Validates a raw record. Blank optional fields become `None`; present
    /// values are kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedCoordinateError`] if the position field is
    /// missing or malformed.
    pub fn from_raw(raw: &RawComplaintRecord) -> Result<Self, MalformedCoordinateError> {
        let position =
            non_blank(raw.position.as_deref()).ok_or(MalformedCoordinateError::Missing)?;
        let coordinate = parse_position(position)?;

        Ok(Self {
            id: raw.id.clone(),
            offence_type: raw.offence_type.clone(),
            coordinate,
            location_label: raw.location_label.clone(),
            timestamp: owned_non_blank(raw.timestamp.as_deref()),
            status: owned_non_blank(raw.status.as_deref()),
            resolution_image_ref: owned_non_blank(raw.resolution_image_ref.as_deref()),
            offence_image_ref: owned_non_blank(raw.offence_image_ref.as_deref()),
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.coordinate.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.coordinate.longitude
    }
}

impl TryFrom<&RawComplaintRecord> for ComplaintRecord {
    type Error = MalformedCoordinateError;

    fn try_from(raw: &RawComplaintRecord) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

fn owned_non_blank(value: Option<&str>) -> Option<String> {
    non_blank(value).map(str::to_owned)
}
