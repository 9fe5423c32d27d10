//! Visual attributes derived from ranked member counts.
//!
//! Color intensity is a min-max normalization over the kept hotspots.
//! When every kept hotspot has the same count there is nothing to
//! normalize against and all of them get full intensity.

use hotspot_map_hotspot_models::{HotspotParams, HotspotSummary, RankedHotspot};

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Creates a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Formats as `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A sequential color ramp sampled at evenly spaced stops.
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    stops: &'static [Rgb],
}

/// The 9-class `ColorBrewer` yellow-orange-red ramp.
pub const YL_OR_RD: ColorScale = ColorScale {
    stops: &[
        Rgb::new(0xff, 0xff, 0xcc),
        Rgb::new(0xff, 0xed, 0xa0),
        Rgb::new(0xfe, 0xd9, 0x76),
        Rgb::new(0xfe, 0xb2, 0x4c),
        Rgb::new(0xfd, 0x8d, 0x3c),
        Rgb::new(0xfc, 0x4e, 0x2a),
        Rgb::new(0xe3, 0x1a, 0x1c),
        Rgb::new(0xbd, 0x00, 0x26),
        Rgb::new(0x80, 0x00, 0x26),
    ],
};

impl ColorScale {
    /// Color at position `t`, linearly interpolated between stops.
    ///
    /// `t` is clamped to `[0, 1]`; `NaN` maps to the low end.
    #[must_use]
    pub fn color_at(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let last = self.stops.len() - 1;

        #[allow(clippy::cast_precision_loss)]
        let position = t * last as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let lower = (position.floor() as usize).min(last);
        let upper = (lower + 1).min(last);
        #[allow(clippy::cast_precision_loss)]
        let frac = position - lower as f64;

        let (a, b) = (self.stops[lower], self.stops[upper]);
        Rgb::new(lerp(a.r, b.r, frac), lerp(a.g, b.g, frac), lerp(a.b, b.b, frac))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp(a: u8, b: u8, frac: f64) -> u8 {
    let (a, b) = (f64::from(a), f64::from(b));
    (frac.mul_add(b - a, a)).round().clamp(0.0, 255.0) as u8
}

/// Min-max normalizes `count` against `[min, max]`.
///
/// A degenerate range (`min == max`) yields 1.0.
#[must_use]
pub fn normalize(count: usize, min: usize, max: usize) -> f64 {
    if max <= min {
        return 1.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let value = (count.saturating_sub(min)) as f64 / (max - min) as f64;
    value.clamp(0.0, 1.0)
}

/// Marker radius: `base + count / divisor`.
#[must_use]
pub fn marker_radius(count: usize, params: &HotspotParams) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let count = count as f64;
    params.marker_base_radius + count / params.marker_count_divisor
}

/// Turns ranked summaries into [`RankedHotspot`]s.
///
/// `ranked` must already be in rank order; rank `i + 1` is given to the
/// summary at position `i`.
#[must_use]
pub fn apply_intensity(
    ranked: Vec<HotspotSummary>,
    params: &HotspotParams,
    scale: &ColorScale,
) -> Vec<RankedHotspot> {
    let min = ranked.iter().map(|s| s.member_count).min().unwrap_or(0);
    let max = ranked.iter().map(|s| s.member_count).max().unwrap_or(0);

    ranked
        .into_iter()
        .enumerate()
        .map(|(position, summary)| {
            let color_intensity = normalize(summary.member_count, min, max);
            RankedHotspot {
                rank: position + 1,
                color_intensity,
                color: scale.color_at(color_intensity).to_hex(),
                marker_radius: marker_radius(summary.member_count, params),
                summary,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotspot_map_hotspot_models::{ClusterId, HotspotDetails};

    fn summary(id: usize, count: usize) -> HotspotSummary {
        HotspotSummary {
            cluster_id: ClusterId(id),
            centroid_latitude: 0.0,
            centroid_longitude: 0.0,
            member_count: count,
            representative_location_label: String::new(),
            details: HotspotDetails::default(),
            member_records: Vec::new(),
        }
    }

    #[test]
    fn normalizes_between_min_and_max() {
        assert!((normalize(1, 1, 11) - 0.0).abs() < f64::EPSILON);
        assert!((normalize(6, 1, 11) - 0.5).abs() < f64::EPSILON);
        assert!((normalize(11, 1, 11) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn degenerate_range_is_full_intensity() {
        assert!((normalize(4, 4, 4) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn scale_endpoints_match_ramp() {
        assert_eq!(YL_OR_RD.color_at(0.0).to_hex(), "#ffffcc");
        assert_eq!(YL_OR_RD.color_at(1.0).to_hex(), "#800026");
        assert_eq!(YL_OR_RD.color_at(0.5).to_hex(), "#fd8d3c");
        assert_eq!(YL_OR_RD.color_at(f64::NAN).to_hex(), "#ffffcc");
        assert_eq!(YL_OR_RD.color_at(7.0).to_hex(), "#800026");
    }

    #[test]
    fn scale_interpolates_between_stops() {
        // Halfway between #ffffcc and #ffeda0.
        assert_eq!(YL_OR_RD.color_at(1.0 / 16.0), Rgb::new(0xff, 0xf6, 0xb6));
    }

    #[test]
    fn marker_radius_grows_with_count() {
        let params = HotspotParams::default();
        assert!((marker_radius(0, &params) - 5.0).abs() < f64::EPSILON);
        assert!((marker_radius(25, &params) - 7.5).abs() < f64::EPSILON);
        assert!(marker_radius(26, &params) > marker_radius(25, &params));
    }

    #[test]
    fn assigns_ranks_and_intensities() {
        let ranked = vec![summary(4, 9), summary(0, 5), summary(2, 1)];
        let hotspots = apply_intensity(ranked, &HotspotParams::default(), &YL_OR_RD);

        let ranks: Vec<usize> = hotspots.iter().map(|h| h.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert!((hotspots[0].color_intensity - 1.0).abs() < f64::EPSILON);
        assert!((hotspots[1].color_intensity - 0.5).abs() < f64::EPSILON);
        assert!(hotspots[2].color_intensity.abs() < f64::EPSILON);
        assert_eq!(hotspots[0].color, "#800026");
        assert_eq!(hotspots[2].color, "#ffffcc");
    }

    #[test]
    fn single_hotspot_is_full_intensity() {
        let hotspots = apply_intensity(vec![summary(0, 3)], &HotspotParams::default(), &YL_OR_RD);
        assert!((hotspots[0].color_intensity - 1.0).abs() < f64::EPSILON);
    }
}
