use crate::canvas::colors::{
    is_visible, magnitude_to_alpha, magnitude_to_color, BACKGROUND, GRID_LINE, LABEL,
};
use crate::canvas::glyphs::GLYPH_HEIGHT;
use crate::canvas::mapping::{
    bin_to_frequency_range, format_frequency_label, frequency_to_y, time_to_x, MAX_DISPLAY_FREQ,
    MIN_DISPLAY_FREQ,
};
use crate::canvas::surface::{Rgba, Surface};
use crate::canvas::time_markers::draw_time_markers;
use crate::config::RenderConfig;
use crate::error::{EngineError, Result};
use crate::types::SpectrogramGrid;

/// Sample rate most recordings are assumed to have.
const REFERENCE_SAMPLE_RATE: u32 = 44_100;

/// What a render pass drew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub columns: usize,
    /// Bin rectangles filled (bins under the visibility cutoff are skipped).
    pub cells: usize,
}

/// Vertical extent of one bin row, in CSS pixels.
#[derive(Clone, Copy, Debug)]
struct BinRow {
    y: f32,
    height: f32,
}

/// Paint the whole spectrogram, axes and labels onto `surface`.
///
/// The surface is resized to the config's device size first; everything is
/// then drawn in CSS pixels under a `device_pixel_ratio` scale.
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    grid: &SpectrogramGrid,
    config: &RenderConfig,
) -> Result<RenderStats> {
    let p = config.padding;
    let width = config.width as f64;
    let height = config.height as f64;
    if width - p.left - p.right <= 0.0 || height - p.top - p.bottom <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "{}x{} canvas leaves no room inside the padding",
            config.width, config.height
        )));
    }

    let (device_w, device_h) = config.device_size();
    surface.resize(device_w, device_h)?;
    surface.set_scale((device_w as f64 / width) as f32);
    surface.clear(BACKGROUND);

    let nyquist = grid.nyquist();
    if grid.sample_rate() != REFERENCE_SAMPLE_RATE {
        log::info!(
            "grid sampled at {} Hz; frequency axis uses its own Nyquist of {nyquist} Hz",
            grid.sample_rate()
        );
    }
    if (config.duration - grid.span_secs()).abs() > grid.time_slice_secs() {
        log::warn!(
            "render duration {:.3}s does not match grid span {:.3}s",
            config.duration,
            grid.span_secs()
        );
    }

    let rows = bin_rows(grid.bin_count(), nyquist, height, config);
    let total = grid.len();
    let mut stats = RenderStats::default();

    for (col, frame) in grid.frames().iter().enumerate() {
        let (x, column_width) = time_to_x(col, total, width, &p);
        for (&mag, row) in frame.magnitudes.iter().zip(rows.iter()) {
            let Some(row) = row else { continue };
            if !is_visible(mag) {
                continue;
            }
            let color = Rgba::from_rgb(magnitude_to_color(mag), magnitude_to_alpha(mag));
            surface.fill_rect(x as f32, row.y, column_width as f32, row.height, color);
            stats.cells += 1;
        }
        stats.columns += 1;
    }

    draw_frequency_markers(surface, config, nyquist);
    draw_time_markers(surface, config);

    log::debug!(
        "rendered {} columns, {} cells at {}x{}",
        stats.columns,
        stats.cells,
        device_w,
        device_h
    );
    Ok(stats)
}

/// Row geometry for every bin, `None` for bins wholly outside the display range.
fn bin_rows(bin_count: usize, nyquist: f64, height: f64, config: &RenderConfig) -> Vec<Option<BinRow>> {
    (0..bin_count)
        .map(|bin| {
            let (start, end) = bin_to_frequency_range(bin, bin_count, nyquist);
            if end <= MIN_DISPLAY_FREQ || start >= MAX_DISPLAY_FREQ {
                return None;
            }
            let top = frequency_to_y(end, height, &config.padding);
            let bottom = frequency_to_y(start, height, &config.padding);
            Some(BinRow {
                y: top as f32,
                height: (bottom - top).max(1.0) as f32,
            })
        })
        .collect()
}

/// Horizontal grid lines and labels at each configured frequency.
pub fn draw_frequency_markers<S: Surface + ?Sized>(surface: &mut S, config: &RenderConfig, nyquist: f64) {
    let p = config.padding;
    let height = config.height as f64;
    let right = config.width as f64 - p.right;

    for &freq in &config.frequency_labels {
        if !(MIN_DISPLAY_FREQ..=MAX_DISPLAY_FREQ).contains(&freq) || freq > nyquist {
            continue;
        }
        let y = frequency_to_y(freq, height, &p);
        surface.stroke_line((p.left as f32, y as f32), (right as f32, y as f32), 1.0, GRID_LINE);

        let label = format_frequency_label(freq);
        let tw = surface.text_width(&label) as f64;
        let lx = (p.left - 6.0 - tw).max(0.0);
        let ly = y - GLYPH_HEIGHT as f64 / 2.0;
        surface.fill_text(&label, lx as f32, ly as f32, LABEL);
    }
}
