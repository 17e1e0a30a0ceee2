//! PCM buffer objects
//!
//! A buffer holds decoded, normalized sample frames registered with a render
//! context. Registration validates the raw bytes up front; a rejected buffer
//! leaves nothing behind.

use crate::error::RenderError;

/// Handle naming a buffer registered with a render context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) u32);

impl BufferId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// PCM layout of the raw bytes handed to `create_buffer`.
///
/// 8-bit data is unsigned with a midpoint of 128; 16-bit data is signed
/// native-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferLayout {
    Mono8,
    Mono16,
    Stereo8,
    Stereo16,
}

impl BufferLayout {
    pub fn channels(self) -> usize {
        match self {
            BufferLayout::Mono8 | BufferLayout::Mono16 => 1,
            BufferLayout::Stereo8 | BufferLayout::Stereo16 => 2,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            BufferLayout::Mono8 | BufferLayout::Stereo8 => 1,
            BufferLayout::Mono16 | BufferLayout::Stereo16 => 2,
        }
    }

    pub fn frame_size(self) -> usize {
        self.channels() * self.bytes_per_sample()
    }

    pub fn name(self) -> &'static str {
        match self {
            BufferLayout::Mono8 => "mono 8-bit",
            BufferLayout::Mono16 => "mono 16-bit",
            BufferLayout::Stereo8 => "stereo 8-bit",
            BufferLayout::Stereo16 => "stereo 16-bit",
        }
    }
}

/// Decoded buffer contents held by the context.
///
/// Samples are interleaved f32 in [-1.0, 1.0], decoded once at registration
/// so the mixer never touches raw bytes.
#[derive(Debug)]
pub(crate) struct PcmBuffer {
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: usize,
    pub samples: Vec<f32>,
}

impl PcmBuffer {
    pub fn decode(data: &[u8], layout: BufferLayout, sample_rate: u32) -> Result<Self, RenderError> {
        if sample_rate == 0 {
            return Err(RenderError::BufferCreateFailed {
                reason: "sample rate must be nonzero".to_string(),
            });
        }
        if data.is_empty() {
            return Err(RenderError::BufferCreateFailed {
                reason: "no sample data".to_string(),
            });
        }
        let frame_size = layout.frame_size();
        if data.len() % frame_size != 0 {
            return Err(RenderError::BufferCreateFailed {
                reason: format!(
                    "{} bytes is not a whole number of {} frames",
                    data.len(),
                    layout.name()
                ),
            });
        }

        let samples = match layout.bytes_per_sample() {
            1 => data.iter().map(|&b| (b as f32 - 128.0) / 128.0).collect(),
            _ => data
                .chunks_exact(2)
                .map(|pair| i16::from_ne_bytes([pair[0], pair[1]]) as f32 / 32768.0)
                .collect::<Vec<f32>>(),
        };

        let channels = layout.channels();
        Ok(Self {
            sample_rate,
            channels,
            frames: data.len() / frame_size,
            samples,
        })
    }

    /// Sample at (frame, channel); out-of-range reads are silent.
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        if frame >= self.frames || channel >= self.channels {
            return 0.0;
        }
        self.samples[frame * self.channels + channel]
    }
}
