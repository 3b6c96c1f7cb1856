//! Spectrogram coordinates → canvas coordinates.
//!
//! Frequency runs on a log axis from 20 Hz (bottom) to 16 kHz (top); time runs
//! linearly left to right with one column per slice.

use crate::config::Padding;

pub const MIN_DISPLAY_FREQ: f64 = 20.0;
pub const MAX_DISPLAY_FREQ: f64 = 16_000.0;

/// Vertical position of `freq` on a canvas `draw_height` pixels tall.
pub fn frequency_to_y(freq: f64, draw_height: f64, padding: &Padding) -> f64 {
    let log_min = MIN_DISPLAY_FREQ.log10();
    let log_max = MAX_DISPLAY_FREQ.log10();
    let clamped = freq.clamp(MIN_DISPLAY_FREQ, MAX_DISPLAY_FREQ);
    let ratio = 1.0 - (clamped.log10() - log_min) / (log_max - log_min);
    padding.top + ratio * (draw_height - padding.top - padding.bottom)
}

/// `[start, end)` in Hz covered by `bin`, each end floored at 20 Hz.
pub fn bin_to_frequency_range(bin: usize, bin_count: usize, nyquist: f64) -> (f64, f64) {
    let width = nyquist / bin_count as f64;
    let start = (bin as f64 * width).max(MIN_DISPLAY_FREQ);
    let end = ((bin + 1) as f64 * width).max(MIN_DISPLAY_FREQ);
    (start, end)
}

/// Left edge and width of the column for `slice_index` on a canvas
/// `draw_width` pixels wide.
pub fn time_to_x(slice_index: usize, total_slices: usize, draw_width: f64, padding: &Padding) -> (f64, f64) {
    let plot_width = draw_width - padding.left - padding.right;
    let column_width = plot_width / total_slices.max(1) as f64;
    (padding.left + slice_index as f64 * column_width, column_width)
}

/// `50`, `500`, `1k`, `2.5k`, `16k`.
pub fn format_frequency_label(hz: f64) -> String {
    if hz >= 1000.0 {
        let k = hz / 1000.0;
        if (k - k.round()).abs() < 1e-6 {
            format!("{}k", k.round() as u32)
        } else {
            format!("{:.1}k", k)
        }
    } else {
        format!("{}", hz.round() as u32)
    }
}
