use crate::canvas::colors::{GRID_LINE, LABEL};
use crate::canvas::surface::Surface;
use crate::config::RenderConfig;

/// Upper bound on labelled time divisions along the bottom axis.
pub const MAX_TIME_DIVISIONS: usize = 10;

/// `mm:ss`, seconds truncated.
pub fn format_time_label(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Evenly spaced tick times from 0 to `duration` inclusive, at most
/// `MAX_TIME_DIVISIONS` intervals (fewer for clips under ten seconds).
pub fn time_ticks(duration: f64) -> Vec<f64> {
    if !(duration.is_finite() && duration > 0.0) {
        return Vec::new();
    }
    let divisions = (duration.ceil() as usize).clamp(1, MAX_TIME_DIVISIONS);
    (0..=divisions)
        .map(|i| duration * i as f64 / divisions as f64)
        .collect()
}

/// Draw vertical grid lines and `mm:ss` labels under the plot.
pub fn draw_time_markers<S: Surface + ?Sized>(surface: &mut S, config: &RenderConfig) {
    let p = config.padding;
    let width = config.width as f64;
    let height = config.height as f64;
    let plot_width = width - p.left - p.right;
    let plot_bottom = height - p.bottom;
    if plot_width <= 0.0 {
        return;
    }

    for t in time_ticks(config.duration) {
        let x = p.left + plot_width * t / config.duration;
        surface.stroke_line(
            (x as f32, p.top as f32),
            (x as f32, plot_bottom as f32),
            1.0,
            GRID_LINE,
        );

        let label = format_time_label(t);
        let tw = surface.text_width(&label) as f64;
        // keep the first and last labels inside the canvas
        let lx = (x - tw / 2.0).clamp(0.0, (width - tw).max(0.0));
        surface.fill_text(&label, lx as f32, (plot_bottom + 6.0) as f32, LABEL);
    }
}
