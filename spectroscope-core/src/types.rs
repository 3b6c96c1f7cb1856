//! Audio input, spectrogram frames and the grid they form.

use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Decoded audio handed to the analyzer: one sample vector per channel.
#[derive(Clone, Debug)]
pub struct AudioChannelSet {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
    duration_secs: f64,
}

impl AudioChannelSet {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32, duration_secs: f64) -> Result<Self> {
        if channels.is_empty() {
            return Err(EngineError::InvalidInput("audio has no channels".into()));
        }
        if sample_rate == 0 {
            return Err(EngineError::InvalidInput("sample rate must be positive".into()));
        }
        if !(duration_secs.is_finite() && duration_secs >= 0.0) {
            return Err(EngineError::InvalidInput(format!(
                "duration {duration_secs} is not a finite non-negative number"
            )));
        }
        let len = channels[0].len();
        if let Some(bad) = channels.iter().position(|c| c.len() != len) {
            return Err(EngineError::InvalidInput(format!(
                "channel {bad} has {} samples, channel 0 has {len}",
                channels[bad].len()
            )));
        }
        Ok(Self {
            channels,
            sample_rate,
            duration_secs,
        })
    }

    /// Build a set whose duration is derived from the sample count.
    pub fn from_samples(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        let len = channels.first().map(Vec::len).unwrap_or(0);
        let duration = if sample_rate > 0 {
            len as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self::new(channels, sample_rate, duration)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample-wise average of all channels. Mono input is copied as-is.
    /// Never touches the caller's buffers.
    pub fn downmix(&self) -> Vec<f32> {
        if self.channels.len() == 1 {
            return self.channels[0].clone();
        }
        let scale = 1.0 / self.channels.len() as f32;
        let mut mono = vec![0.0f32; self.len()];
        for channel in &self.channels {
            for (out, &s) in mono.iter_mut().zip(channel.iter()) {
                *out += s;
            }
        }
        for s in mono.iter_mut() {
            *s *= scale;
        }
        mono
    }
}

/// One fixed-duration window of the time-domain signal.
#[derive(Clone, Debug)]
pub struct TimeSlice<'a> {
    pub index: usize,
    pub range: Range<usize>,
    pub samples: &'a [f32],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpectrogramFrame {
    /// One non-negative value per bin, bin 0 = DC.
    pub magnitudes: Vec<f32>,
    pub time_offset: f64,
}

impl SpectrogramFrame {
    pub fn zeroed(bins: usize, time_offset: f64) -> Self {
        Self {
            magnitudes: vec![0.0; bins],
            time_offset,
        }
    }
}

/// Time-ordered spectra for a whole analysis run.
///
/// Frames sit behind an `Arc` so the grid can be handed to the draw task
/// without copying; nothing exposes a mutable view once it is built.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectrogramGrid {
    frames: Arc<[SpectrogramFrame]>,
    sample_rate: u32,
    fft_size: usize,
    time_slice_secs: f64,
}

impl SpectrogramGrid {
    pub fn new(
        frames: Vec<SpectrogramFrame>,
        sample_rate: u32,
        fft_size: usize,
        time_slice_secs: f64,
    ) -> Self {
        Self {
            frames: frames.into(),
            sample_rate,
            fft_size,
            time_slice_secs,
        }
    }

    pub fn frames(&self) -> &[SpectrogramFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn time_slice_secs(&self) -> f64 {
        self.time_slice_secs
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    /// Width of one bin in Hz.
    pub fn frequency_resolution(&self) -> f64 {
        self.sample_rate as f64 / self.fft_size as f64
    }

    /// Time covered by all frames.
    pub fn span_secs(&self) -> f64 {
        self.frames.len() as f64 * self.time_slice_secs
    }
}

/// Snapshot emitted while an analysis is running.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressEvent {
    pub processed_slices: usize,
    pub total_slices: usize,
    pub percentage_complete: f32,
    /// Copy of every frame produced so far.
    pub frames: Vec<SpectrogramFrame>,
}
