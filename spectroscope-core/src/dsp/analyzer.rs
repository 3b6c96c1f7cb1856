//! Slice-by-slice spectrogram analysis of a decoded buffer.

use crate::config::{AnalysisConfig, Normalization};
use crate::dsp::fft::{apply_window, compute_magnitude_spectrum, hann_window};
use crate::error::{EngineError, Result};
use crate::types::{AudioChannelSet, ProgressEvent, SpectrogramFrame, SpectrogramGrid, TimeSlice};

/// Ratios this close to an integer are snapped before ceil/floor, so that
/// 1.0 / 0.05 counts as 20 slices rather than 21.
const RATIO_EPSILON: f64 = 1e-9;

fn snapped(x: f64) -> f64 {
    let r = x.round();
    if (x - r).abs() < RATIO_EPSILON {
        r
    } else {
        x
    }
}

/// Number of slices a buffer of `duration_secs` is cut into.
pub fn slice_count(duration_secs: f64, time_slice_secs: f64) -> usize {
    if duration_secs <= 0.0 || time_slice_secs <= 0.0 {
        return 0;
    }
    snapped(duration_secs / time_slice_secs).ceil() as usize
}

/// Samples in one full slice; the last slice of a buffer may hold fewer.
pub fn samples_per_slice(sample_rate: u32, time_slice_secs: f64) -> usize {
    snapped(sample_rate as f64 * time_slice_secs).floor().max(0.0) as usize
}

/// Emit progress every this many slices (≈ `updates` events per run).
pub fn progress_interval(total_slices: usize, updates: usize) -> usize {
    (total_slices / updates.max(1)).max(1)
}

/// Turns an [`AudioChannelSet`] into a [`SpectrogramGrid`] with a fixed
/// config and a Hann window precomputed for its FFT size.
pub struct Analyzer {
    config: AnalysisConfig,
    window: Vec<f32>,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let window = hann_window(config.fft_size);
        Ok(Self { config, window })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the analysis, calling `on_progress` with a copy of the frames so far
    /// roughly `progress_updates` times. Yields to the scheduler every
    /// `yield_every` slices.
    pub async fn analyze<F>(&self, audio: &AudioChannelSet, mut on_progress: F) -> Result<SpectrogramGrid>
    where
        F: FnMut(ProgressEvent),
    {
        let cfg = &self.config;
        let sample_rate = audio.sample_rate();
        let per_slice = samples_per_slice(sample_rate, cfg.time_slice_secs);
        if per_slice == 0 {
            return Err(EngineError::InvalidInput(format!(
                "a {}s slice at {} Hz holds no samples",
                cfg.time_slice_secs, sample_rate
            )));
        }

        let mono = audio.downmix();
        let planned = slice_count(audio.duration_secs(), cfg.time_slice_secs);
        let available = mono.len().div_ceil(per_slice);
        let total = planned.min(available);
        if total < planned {
            log::debug!(
                "duration implies {planned} slices but samples only fill {available}; stopping at {total}"
            );
        }

        let interval = progress_interval(total, cfg.progress_updates);
        let bins = cfg.fft_size / 2;
        let mut frames: Vec<SpectrogramFrame> = Vec::with_capacity(total);
        let mut failed = 0usize;

        for index in 0..total {
            let start = index * per_slice;
            let end = (start + per_slice).min(mono.len());
            if start >= end {
                break;
            }
            let slice = TimeSlice {
                index,
                range: start..end,
                samples: &mono[start..end],
            };
            let time_offset = start as f64 / sample_rate as f64;

            let frame = match self.analyze_slice(&slice) {
                Ok(magnitudes) => SpectrogramFrame {
                    magnitudes,
                    time_offset,
                },
                Err(e @ EngineError::InvalidInputSize { .. }) => return Err(e),
                Err(e) => {
                    log::warn!("{e}; substituting a silent frame");
                    failed += 1;
                    SpectrogramFrame::zeroed(bins, time_offset)
                }
            };
            frames.push(frame);

            if index % interval == 0 || index + 1 == total {
                let processed = frames.len();
                on_progress(ProgressEvent {
                    processed_slices: processed,
                    total_slices: total,
                    percentage_complete: processed as f32 / total as f32 * 100.0,
                    frames: frames.clone(),
                });
            }

            if (index + 1) % cfg.yield_every == 0 {
                tokio::task::yield_now().await;
            }
        }

        log::debug!(
            "analysed {} slices ({} failed) at {} Hz, fft {}",
            frames.len(),
            failed,
            sample_rate,
            cfg.fft_size
        );
        Ok(SpectrogramGrid::new(frames, sample_rate, cfg.fft_size, cfg.time_slice_secs))
    }

    /// Zero-pad or truncate to `fft_size`, window, transform, then weight.
    fn analyze_slice(&self, slice: &TimeSlice<'_>) -> Result<Vec<f32>> {
        if let Some(pos) = slice.samples.iter().position(|s| !s.is_finite()) {
            return Err(EngineError::SliceAnalysisFailure {
                index: slice.index,
                reason: format!("non-finite sample at offset {}", slice.range.start + pos),
            });
        }

        let fft_size = self.config.fft_size;
        let mut buffer = vec![0.0f32; fft_size];
        let n = slice.samples.len().min(fft_size);
        buffer[..n].copy_from_slice(&slice.samples[..n]);

        let windowed = apply_window(&buffer, &self.window);
        let spectrum = compute_magnitude_spectrum(&windowed)?;
        let weighted = self.weight(spectrum);

        if weighted.iter().any(|m| !m.is_finite()) {
            return Err(EngineError::SliceAnalysisFailure {
                index: slice.index,
                reason: "spectrum is not finite".into(),
            });
        }
        Ok(weighted)
    }

    fn weight(&self, mut magnitudes: Vec<f32>) -> Vec<f32> {
        let gain = self.config.gain;
        for m in magnitudes.iter_mut() {
            *m *= gain;
        }
        if self.config.normalization == Normalization::PerBandPeak {
            normalize_bands(&mut magnitudes);
        }
        let k = self.config.compression;
        for m in magnitudes.iter_mut() {
            *m = (1.0 + *m * k).log10();
        }
        magnitudes
    }
}

/// Scale each quarter of the spectrum so its loudest bin is 1.
fn normalize_bands(magnitudes: &mut [f32]) {
    if magnitudes.is_empty() {
        return;
    }
    let band_len = magnitudes.len().div_ceil(4);
    for band in magnitudes.chunks_mut(band_len) {
        let peak = band.iter().copied().fold(0.0f32, f32::max);
        if peak > 0.0 {
            for m in band.iter_mut() {
                *m /= peak;
            }
        }
    }
}
