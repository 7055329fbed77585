//! Fixed styling for the overlay layers: the score color ramp, the outline
//! stroke, and the candidate marker.

use image::Rgba;

/// Score-to-color ramp for the fill layer. Piecewise-linear between stops,
/// clamped at the extremes.
pub const SCORE_RAMP: [(f64, &str); 11] = [
    (0.0, "#006837"),
    (100_000.0, "#31a354"),
    (500_000.0, "#78c679"),
    (1_000_000.0, "#c2e699"),
    (2_500_000.0, "#ffffcc"),
    (5_000_000.0, "#fee08b"),
    (10_000_000.0, "#fdae61"),
    (15_000_000.0, "#f46d43"),
    (20_000_000.0, "#d73027"),
    (30_000_000.0, "#a50026"),
    (40_000_000.0, "#800026"),
];

pub const FILL_OPACITY: f64 = 0.6;

pub const OUTLINE_COLOR: &str = "#c0392b";
pub const OUTLINE_WIDTH: f64 = 1.0;

/// Candidate facility marker, anchored at its bottom point.
pub const MARKER_COLOR: &str = "#2ecc71";

pub fn hex_to_rgba(hex: &str) -> Rgba<u8> {
    let hex = hex.trim_start_matches('#');
    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
    Rgba([r, g, b, 255])
}

/// Interpolated fill color for an underserved score.
pub fn ramp_color(score: f64) -> Rgba<u8> {
    let (first_stop, first_color) = SCORE_RAMP[0];
    if score <= first_stop {
        return hex_to_rgba(first_color);
    }

    for window in SCORE_RAMP.windows(2) {
        let (lo, lo_hex) = window[0];
        let (hi, hi_hex) = window[1];
        if score <= hi {
            let t = (score - lo) / (hi - lo);
            return lerp_rgba(hex_to_rgba(lo_hex), hex_to_rgba(hi_hex), t);
        }
    }

    let (_, last_color) = SCORE_RAMP[SCORE_RAMP.len() - 1];
    hex_to_rgba(last_color)
}

fn lerp_rgba(a: Rgba<u8>, b: Rgba<u8>, t: f64) -> Rgba<u8> {
    let mut out = [0u8; 4];
    for i in 0..4 {
        let lo = a.0[i] as f64;
        let hi = b.0[i] as f64;
        out[i] = (lo + (hi - lo) * t).round() as u8;
    }
    Rgba(out)
}
