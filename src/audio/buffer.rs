use std::io::Cursor;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::AudioError;

/// Sample rate of synthesized speech payloads.
pub const SYNTH_SAMPLE_RATE: u32 = 24_000;
pub const SYNTH_CHANNELS: usize = 1;

/// Decoded, playable audio: one `f32` track per channel in `[-1.0, 1.0)`.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Raw little-endian signed 16-bit samples, interleaved by channel.
    pub fn from_pcm16_le(
        bytes: &[u8],
        sample_rate: u32,
        channel_count: usize,
    ) -> Result<Self, AudioError> {
        if channel_count == 0 {
            return Err(AudioError::Decode("zero channels".to_string()));
        }
        if bytes.is_empty() {
            return Err(AudioError::NoAudio);
        }
        if bytes.len() % 2 != 0 {
            return Err(AudioError::Decode(format!(
                "odd PCM16 byte count {}",
                bytes.len()
            )));
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0);
        Ok(Self::new(sample_rate, deinterleave(samples, channel_count)))
    }

    pub fn from_base64_pcm16(
        payload: &str,
        sample_rate: u32,
        channel_count: usize,
    ) -> Result<Self, AudioError> {
        let bytes = STANDARD.decode(payload.trim())?;
        Self::from_pcm16_le(&bytes, sample_rate, channel_count)
    }

    /// RIFF/WAVE clip, integer or float samples.
    pub fn from_wav(bytes: &[u8]) -> Result<Self, AudioError> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        let channel_count = spec.channels as usize;
        if channel_count == 0 {
            return Err(AudioError::Decode("zero channels".to_string()));
        }
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        };
        if samples.is_empty() {
            return Err(AudioError::NoAudio);
        }
        Ok(Self::new(
            spec.sample_rate,
            deinterleave(samples.into_iter(), channel_count),
        ))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(|c| c.as_slice())
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, |c| c.len())
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Frame-interleaved samples, the layout most output devices want.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frames() * self.channel_count());
        for frame in 0..self.frames() {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }
}

/// Trailing samples that do not fill a whole frame are dropped.
fn deinterleave(samples: impl Iterator<Item = f32>, channel_count: usize) -> Vec<Vec<f32>> {
    let samples: Vec<f32> = samples.collect();
    let frames = samples.len() / channel_count;
    let mut channels = vec![Vec::with_capacity(frames); channel_count];
    for frame in samples.chunks_exact(channel_count) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }
    channels
}

/// Extracts `rate=NNNN` from a mime type such as `audio/L16;codec=pcm;rate=24000`.
pub fn sample_rate_from_mime(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|part| part.trim().strip_prefix("rate="))
        .find_map(|rate| rate.trim().parse().ok())
}
