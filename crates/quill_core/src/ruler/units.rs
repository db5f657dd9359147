//! Length conversions between inches and on-screen pixels.

use crate::constants::{PIXELS_PER_INCH, SNAP_INCREMENT_INCHES};

fn scale(zoom_percent: f64) -> f64 {
    PIXELS_PER_INCH * (zoom_percent / 100.0)
}

/// Convert a length in inches to pixels at the given zoom.
pub fn to_pixels(inches: f64, zoom_percent: f64) -> f64 {
    inches * scale(zoom_percent)
}

/// Convert a pixel offset back to inches at the given zoom.
///
/// Non-positive zoom values map every offset to `0.0`.
pub fn to_inches(pixels: f64, zoom_percent: f64) -> f64 {
    let scale = scale(zoom_percent);
    if scale <= 0.0 || !scale.is_finite() {
        return 0.0;
    }
    pixels / scale
}

/// Round a length to the nearest snap increment.
pub fn snap(inches: f64) -> f64 {
    (inches / SNAP_INCREMENT_INCHES).round() * SNAP_INCREMENT_INCHES
}

/// Clamp `value` into `[low, high]`, preferring `low` if the range is empty.
pub(crate) fn clamp_lenient(value: f64, low: f64, high: f64) -> f64 {
    if high < low {
        return low;
    }
    value.clamp(low, high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_inch_is_ninety_six_pixels_at_full_zoom() {
        assert_eq!(to_pixels(1.0, 100.0), 96.0);
        assert_eq!(to_pixels(1.0, 50.0), 48.0);
        assert_eq!(to_pixels(2.5, 200.0), 480.0);
    }

    #[test]
    fn to_inches_guards_degenerate_zoom() {
        assert_eq!(to_inches(120.0, 0.0), 0.0);
        assert_eq!(to_inches(120.0, -10.0), 0.0);
    }

    #[test]
    fn snap_rounds_to_quarter_inches() {
        assert_eq!(snap(1.38), 1.5);
        assert_eq!(snap(1.12), 1.0);
        assert_eq!(snap(1.125), 1.25);
        assert_eq!(snap(0.1), 0.0);
    }

    #[test]
    fn clamp_lenient_prefers_low_bound_for_empty_range() {
        assert_eq!(clamp_lenient(5.0, 1.0, 3.0), 3.0);
        assert_eq!(clamp_lenient(5.0, 4.0, 3.0), 4.0);
    }
}
