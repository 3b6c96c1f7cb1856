//! Analysis and render configuration.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

pub const DEFAULT_TIME_SLICE_SECS: f64 = 0.05;
pub const DEFAULT_FFT_SIZE: usize = 4096;

/// How per-bin magnitudes are scaled before log compression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Gain then log compression. Intensities stay comparable across frames.
    #[default]
    Absolute,
    /// Each quarter of the spectrum is divided by its own peak before compression.
    PerBandPeak,
}

/// Analysis configuration parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Slice length in seconds (default: 0.05)
    pub time_slice_secs: f64,

    /// FFT length, must be a power of two (default: 4096)
    pub fft_size: usize,

    /// Uniform gain applied to every magnitude (default: 2.0)
    pub gain: f32,

    /// `k` in `log10(1 + m * k)` (default: 25.0)
    pub compression: f32,

    /// Weighting strategy (default: Absolute)
    pub normalization: Normalization,

    /// Slices processed between cooperative yields (default: 50)
    pub yield_every: usize,

    /// Approximate number of progress events per run (default: 20)
    pub progress_updates: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            time_slice_secs: DEFAULT_TIME_SLICE_SECS,
            fft_size: DEFAULT_FFT_SIZE,
            gain: 2.0,
            compression: 25.0,
            normalization: Normalization::Absolute,
            yield_every: 50,
            progress_updates: 20,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two() {
            return Err(EngineError::InvalidInputSize { len: self.fft_size });
        }
        if !(self.time_slice_secs.is_finite() && self.time_slice_secs > 0.0) {
            return Err(EngineError::InvalidInput(format!(
                "time slice must be positive, got {}",
                self.time_slice_secs
            )));
        }
        if self.yield_every == 0 {
            return Err(EngineError::InvalidInput("yield_every must be at least 1".into()));
        }
        // Negative weights would make log10(1 + m * k) negative or NaN.
        if !(self.gain.is_finite() && self.gain >= 0.0)
            || !(self.compression.is_finite() && self.compression >= 0.0)
        {
            return Err(EngineError::InvalidInput(
                "gain and compression must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 40.0,
            left: 60.0,
        }
    }
}

/// Everything the renderer needs besides the grid itself.
/// Width and height are in CSS pixels; the surface is sized
/// `width * device_pixel_ratio` by `height * device_pixel_ratio`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f64,
    pub padding: Padding,
    /// Frequencies (Hz) that get a grid line and label.
    pub frequency_labels: Vec<f64>,
    /// Total audio duration in seconds, used for the time axis.
    pub duration: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            device_pixel_ratio: 1.0,
            padding: Padding::default(),
            frequency_labels: vec![
                50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0, 16000.0,
            ],
            duration: 0.0,
        }
    }
}

impl RenderConfig {
    /// Surface size in device pixels.
    pub fn device_size(&self) -> (u32, u32) {
        let dpr = if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        };
        (
            (self.width as f64 * dpr).round() as u32,
            (self.height as f64 * dpr).round() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_power_of_two_fft() {
        let config = AnalysisConfig {
            fft_size: 3000,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(EngineError::InvalidInputSize { len: 3000 }));
    }

    #[test]
    fn test_rejects_zero_yield_interval() {
        let config = AnalysisConfig {
            yield_every: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::InvalidInput(msg)) if msg.contains("yield_every")));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "fft_size": 2048, "normalization": "per_band_peak" }"#).unwrap();
        assert_eq!(config.fft_size, 2048);
        assert_eq!(config.normalization, Normalization::PerBandPeak);
        assert_eq!(config.time_slice_secs, DEFAULT_TIME_SLICE_SECS);
    }

    #[test]
    fn test_device_size_scales_by_ratio() {
        let config = RenderConfig {
            width: 400,
            height: 200,
            device_pixel_ratio: 2.0,
            ..Default::default()
        };
        assert_eq!(config.device_size(), (800, 400));
    }
}
