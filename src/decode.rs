//! WAV decoding into per-channel float buffers.

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader};

#[derive(Debug)]
pub struct DecodedAudio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
    pub duration: f64,
}

pub fn read_wav(path: &Path) -> Result<DecodedAudio> {
    let reader = WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;
    decode(reader).with_context(|| format!("Failed to decode: {}", path.display()))
}

/// De-interleave a WAV stream, scaling integer samples into [-1, 1].
pub fn decode<R: Read>(reader: WavReader<R>) -> Result<DecodedAudio> {
    let spec = reader.spec();
    let channel_count = spec.channels as usize;
    if channel_count == 0 {
        bail!("WAV declares zero channels");
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let frames = interleaved.len() / channel_count;
    let mut channels = vec![Vec::with_capacity(frames); channel_count];
    for frame in interleaved.chunks_exact(channel_count) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    let duration = frames as f64 / spec.sample_rate as f64;
    log::info!(
        "decoded {} channel(s), {} Hz, {:.2}s ({}-bit {:?})",
        channel_count,
        spec.sample_rate,
        duration,
        spec.bits_per_sample,
        spec.sample_format
    );
    Ok(DecodedAudio {
        channels,
        sample_rate: spec.sample_rate,
        duration,
    })
}
