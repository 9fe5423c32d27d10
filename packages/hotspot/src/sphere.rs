//! Great-circle geometry on the unit sphere.
//!
//! All angles are in radians. Distances are central angles, so multiplying
//! by a planet radius gives a ground distance.

use std::f64::consts::{FRAC_PI_2, PI};

use hotspot_map_complaint_models::RadianCoordinate;

/// Relative slack added to query windows so that points whose computed
/// distance rounds to exactly epsilon are never pruned.
const WINDOW_SLACK: f64 = 1.0e-6;

/// Central angle between two points using the haversine formula.
#[must_use]
pub fn central_angle(a: RadianCoordinate, b: RadianCoordinate) -> f64 {
    let half_dlat = (b.latitude - a.latitude) / 2.0;
    let half_dlon = (b.longitude - a.longitude) / 2.0;

    let h = half_dlat.sin().powi(2)
        + a.latitude.cos() * b.latitude.cos() * half_dlon.sin().powi(2);

    2.0 * h.sqrt().min(1.0).asin()
}

/// An axis-aligned `[latitude, longitude]` window in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    /// Lower `[latitude, longitude]` corner.
    pub lower: [f64; 2],
    /// Upper `[latitude, longitude]` corner.
    pub upper: [f64; 2],
}

/// Windows that together contain every point within `epsilon` of `center`.
///
/// The latitude band is `center ± epsilon`. The longitude half-width comes
/// from the haversine identity
/// `sin²(d/2) >= cos φ1 · cos φ2 · sin²(Δλ/2)`, bounding `cos φ2` from below
/// over the latitude band. Near a pole the bound degenerates and the whole
/// longitude range is returned. Windows that run past ±π are split and
/// wrapped so that neighbours across the antimeridian are found.
#[must_use]
pub fn neighbourhood_windows(center: RadianCoordinate, epsilon: f64) -> Vec<Window> {
    let reach = epsilon * (1.0 + WINDOW_SLACK);

    let lat_lo = (center.latitude - reach).max(-FRAC_PI_2);
    let lat_hi = (center.latitude + reach).min(FRAC_PI_2);

    let Some(half_width) = longitude_half_width(center.latitude, reach) else {
        return vec![Window {
            lower: [lat_lo, -PI],
            upper: [lat_hi, PI],
        }];
    };

    let lon_lo = center.longitude - half_width;
    let lon_hi = center.longitude + half_width;

    let mut windows = vec![Window {
        lower: [lat_lo, lon_lo.max(-PI)],
        upper: [lat_hi, lon_hi.min(PI)],
    }];

    if lon_lo < -PI {
        windows.push(Window {
            lower: [lat_lo, lon_lo + 2.0 * PI],
            upper: [lat_hi, PI],
        });
    }
    if lon_hi > PI {
        windows.push(Window {
            lower: [lat_lo, -PI],
            upper: [lat_hi, lon_hi - 2.0 * PI],
        });
    }

    windows
}

/// Longitude half-width of the epsilon ball, or `None` if every longitude
/// may be within reach.
fn longitude_half_width(latitude: f64, reach: f64) -> Option<f64> {
    let farthest_latitude = (latitude.abs() + reach).min(FRAC_PI_2);
    let cos_product = latitude.cos() * farthest_latitude.cos();
    if cos_product <= 0.0 {
        return None;
    }

    let ratio = (reach / 2.0).sin() / cos_product.sqrt();
    if !ratio.is_finite() || ratio >= 1.0 {
        return None;
    }

    let half_width = 2.0 * ratio.asin() * (1.0 + WINDOW_SLACK);
    (half_width < PI).then_some(half_width)
}
