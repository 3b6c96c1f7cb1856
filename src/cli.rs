//! Command-line argument parsing.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use spectroscope_core::{AnalysisConfig, Normalization, RenderConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "spectroscope")]
#[command(about = "Render a log-frequency spectrogram of a WAV file to PNG", long_about = None)]
pub struct Args {
    /// WAV file to analyse
    pub input: PathBuf,

    /// Where to write the PNG
    #[arg(short, long, value_name = "FILE", default_value = "spectrogram.png")]
    pub output: PathBuf,

    /// JSON file with optional `analysis` and `render` sections
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Image width in CSS pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in CSS pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Device pixel ratio (2.0 doubles the output resolution)
    #[arg(long, value_name = "RATIO")]
    pub dpr: Option<f64>,

    /// Slice length in seconds
    #[arg(long, value_name = "SECONDS")]
    pub time_slice: Option<f64>,

    /// FFT length (power of two)
    #[arg(long)]
    pub fft_size: Option<usize>,

    #[arg(long, value_enum)]
    pub normalization: Option<NormalizationArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum NormalizationArg {
    /// Comparable intensity across frames
    Absolute,
    /// Each quarter of the spectrum scaled to its own peak
    PerBandPeak,
}

impl From<NormalizationArg> for Normalization {
    fn from(arg: NormalizationArg) -> Self {
        match arg {
            NormalizationArg::Absolute => Normalization::Absolute,
            NormalizationArg::PerBandPeak => Normalization::PerBandPeak,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub analysis: AnalysisConfig,
    pub render: RenderConfig,
}

impl FileConfig {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("invalid config JSON")
    }
}

impl Args {
    /// Config file values (or defaults) with command-line flags on top.
    pub fn resolve(&self) -> anyhow::Result<(AnalysisConfig, RenderConfig)> {
        let file = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config: {}", path.display()))?;
                FileConfig::from_json(&text)?
            }
            None => FileConfig::default(),
        };
        let FileConfig {
            mut analysis,
            mut render,
        } = file;

        if let Some(v) = self.time_slice {
            analysis.time_slice_secs = v;
        }
        if let Some(v) = self.fft_size {
            analysis.fft_size = v;
        }
        if let Some(v) = self.normalization {
            analysis.normalization = v.into();
        }
        if let Some(v) = self.width {
            render.width = v;
        }
        if let Some(v) = self.height {
            render.height = v;
        }
        if let Some(v) = self.dpr {
            render.device_pixel_ratio = v;
        }

        analysis.validate()?;
        Ok((analysis, render))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "spectroscope",
            "in.wav",
            "--width",
            "1024",
            "--fft-size",
            "2048",
            "--normalization",
            "per-band-peak",
        ]);
        let (analysis, render) = args.resolve().unwrap();
        assert_eq!(render.width, 1024);
        assert_eq!(render.height, RenderConfig::default().height);
        assert_eq!(analysis.fft_size, 2048);
        assert_eq!(analysis.normalization, Normalization::PerBandPeak);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "analysis": {{ "fft_size": 1024, "time_slice_secs": 0.1 }}, "render": {{ "height": 300 }} }}"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = Args::parse_from(["spectroscope", "in.wav", "--config", &path, "--fft-size", "512"]);
        let (analysis, render) = args.resolve().unwrap();
        assert_eq!(analysis.fft_size, 512);
        assert_eq!(analysis.time_slice_secs, 0.1);
        assert_eq!(render.height, 300);
    }

    #[test]
    fn test_rejects_bad_fft_size() {
        let args = Args::parse_from(["spectroscope", "in.wav", "--fft-size", "1000"]);
        assert!(args.resolve().is_err());
    }
}
