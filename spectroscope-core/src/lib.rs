//! Audio spectrogram engine.
//!
//! Turns decoded multi-channel audio into a grid of log-compressed magnitude
//! spectra ([`dsp`]), paints that grid onto a pixel surface with a
//! logarithmic frequency axis ([`canvas`]), and runs both jobs as background
//! tasks behind a channel-based [`worker::Orchestrator`].

pub mod canvas;
pub mod config;
pub mod dsp;
pub mod error;
pub mod types;
pub mod worker;

pub use canvas::spectrogram_renderer::{render, RenderStats};
pub use canvas::surface::{PixmapSurface, Rgba, Surface};
pub use config::{AnalysisConfig, Normalization, Padding, RenderConfig};
pub use dsp::analyzer::Analyzer;
pub use dsp::fft::{apply_hann_window, compute_magnitude_spectrum};
pub use error::{EngineError, Result};
pub use types::{AudioChannelSet, ProgressEvent, SpectrogramFrame, SpectrogramGrid};
pub use worker::{AnalysisEvent, AnalysisJob, AnalysisRequest, DrawAck, DrawRequest, DrawWorker, Orchestrator};
