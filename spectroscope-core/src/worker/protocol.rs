//! Messages exchanged with the analysis and draw tasks.
//!
//! Every payload is owned: sample buffers are moved into a request, and a
//! grid travels to the draw task behind its own `Arc`, so no task ever sees
//! memory another task can still mutate.

use crate::canvas::spectrogram_renderer::RenderStats;
use crate::config::{Padding, RenderConfig};
use crate::types::{ProgressEvent, SpectrogramGrid};

#[derive(Clone, Debug)]
pub struct AnalysisRequest {
    pub channel_buffers: Vec<Vec<f32>>,
    pub sample_rate: u32,
    pub duration: f64,
    /// Slice length in seconds; `None` uses the analysis config's.
    pub time_slice: Option<f64>,
    pub channel_count: usize,
}

impl AnalysisRequest {
    /// Request with the configured slice length; duration derived from the sample count.
    pub fn new(channel_buffers: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        let len = channel_buffers.first().map(Vec::len).unwrap_or(0);
        let duration = if sample_rate > 0 {
            len as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            channel_count: channel_buffers.len(),
            channel_buffers,
            sample_rate,
            duration,
            time_slice: None,
        }
    }

    pub fn with_time_slice(mut self, time_slice: f64) -> Self {
        self.time_slice = Some(time_slice);
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }
}

/// Events from an analysis task: progress in slice order, then exactly one
/// `Result` or `Error`.
#[derive(Clone, Debug)]
pub enum AnalysisEvent {
    Progress(ProgressEvent),
    Result(SpectrogramGrid),
    Error(String),
}

impl AnalysisEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AnalysisEvent::Progress(_))
    }
}

#[derive(Clone, Debug)]
pub struct DrawRequest {
    pub grid: SpectrogramGrid,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub device_pixel_ratio: f64,
    pub duration: f64,
    pub padding: Padding,
    pub frequency_labels: Vec<f64>,
}

impl DrawRequest {
    pub fn new(grid: SpectrogramGrid, config: &RenderConfig) -> Self {
        Self {
            grid,
            pixel_width: config.width,
            pixel_height: config.height,
            device_pixel_ratio: config.device_pixel_ratio,
            duration: config.duration,
            padding: config.padding,
            frequency_labels: config.frequency_labels.clone(),
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            width: self.pixel_width,
            height: self.pixel_height,
            device_pixel_ratio: self.device_pixel_ratio,
            padding: self.padding,
            frequency_labels: self.frequency_labels.clone(),
            duration: self.duration,
        }
    }
}

/// Acknowledgments from the draw task. `Ready` once after the surface is
/// handed over, then one `DrawComplete` or `Error` per request.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawAck {
    Ready,
    DrawComplete(RenderStats),
    Error(String),
}
