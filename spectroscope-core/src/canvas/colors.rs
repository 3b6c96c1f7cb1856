use crate::canvas::surface::Rgba;

/// Magnitudes at or above this map to the hottest colour.
pub const COLOR_SATURATION: f32 = 0.3;

/// Bins quieter than this are not drawn at all.
pub const MIN_VISIBLE_MAGNITUDE: f32 = 0.001;

pub const BACKGROUND: Rgba = Rgba::new(12, 6, 22, 1.0);
pub const GRID_LINE: Rgba = Rgba::new(255, 255, 255, 0.12);
pub const LABEL: Rgba = Rgba::new(200, 200, 210, 0.9);

/// Control points: normalised magnitude → RGB.
const COLOR_STOPS: [(f32, [u8; 3]); 5] = [
    (0.0, [25, 5, 50]),     // deep purple
    (0.25, [90, 30, 140]),  // purple
    (0.5, [215, 50, 140]),  // pink
    (0.75, [225, 35, 45]),  // red
    (1.0, [250, 140, 30]),  // orange
];

pub const COLD: [u8; 3] = COLOR_STOPS[0].1;
pub const HOT: [u8; 3] = COLOR_STOPS[COLOR_STOPS.len() - 1].1;

/// Map a compressed magnitude to a colour on the purple→orange ramp.
pub fn magnitude_to_color(mag: f32) -> [u8; 3] {
    // max/min rather than clamp so NaN lands on the cold end
    let n = (mag / COLOR_SATURATION).max(0.0).min(1.0);

    for pair in COLOR_STOPS.windows(2) {
        let (lo, lo_rgb) = pair[0];
        let (hi, hi_rgb) = pair[1];
        if n <= hi {
            let t = (n - lo) / (hi - lo);
            return [
                lerp(lo_rgb[0], hi_rgb[0], t),
                lerp(lo_rgb[1], hi_rgb[1], t),
                lerp(lo_rgb[2], hi_rgb[2], t),
            ];
        }
    }
    HOT
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

/// Opacity for a bin: quiet bins fade out but never vanish entirely.
pub fn magnitude_to_alpha(mag: f32) -> f32 {
    (0.05 + mag * 3.5).max(0.05).min(1.0)
}

pub fn is_visible(mag: f32) -> bool {
    mag >= MIN_VISIBLE_MAGNITUDE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_endpoints() {
        assert_eq!(magnitude_to_color(0.0), COLD);
        assert_eq!(magnitude_to_color(0.3), HOT);
        assert_eq!(magnitude_to_color(5.0), HOT);
        assert_eq!(magnitude_to_color(f32::NAN), COLD);
    }

    #[test]
    fn test_color_hits_intermediate_stops() {
        // 0.15 / 0.3 = 0.5 → pink
        assert_eq!(magnitude_to_color(0.15), [215, 50, 140]);
    }

    #[test]
    fn test_color_interpolates() {
        let c = magnitude_to_color(0.0375); // halfway between first two stops
        for (got, want) in c.iter().zip([57u8, 17, 95]) {
            assert!(got.abs_diff(want) <= 1, "{c:?}");
        }
    }

    #[test]
    fn test_alpha_range() {
        assert_eq!(magnitude_to_alpha(0.0), 0.05);
        assert_eq!(magnitude_to_alpha(1.0), 1.0);
        assert!((magnitude_to_alpha(0.1) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_visibility_cutoff() {
        assert!(!is_visible(0.0005));
        assert!(is_visible(0.001));
    }
}
