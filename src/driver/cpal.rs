//! CPAL-based playback driver for desktop platforms (Linux, macOS, Windows)
//!
//! Opens the default output device with a raw byte-buffer stream so the fill
//! callback sees the same interleaved bytes the renderer produces, whatever
//! the negotiated sample type.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::info;

use crate::config::StreamConfig;
use crate::error::{log_playback_error, PlaybackError};
use crate::format::{PcmEncoding, StreamFormat};

use super::{FillBuffer, OpenedStream, PlaybackDriver, PlaybackStream};

/// CPAL-backed playback driver.
pub struct CpalDriver {
    _priv: (),
}

impl CpalDriver {
    pub fn new() -> Self {
        Self { _priv: () }
    }
}

impl Default for CpalDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn to_cpal_format(encoding: PcmEncoding) -> cpal::SampleFormat {
    match encoding {
        PcmEncoding::U8 => cpal::SampleFormat::U8,
        PcmEncoding::I8 => cpal::SampleFormat::I8,
        PcmEncoding::U16 => cpal::SampleFormat::U16,
        PcmEncoding::I16 => cpal::SampleFormat::I16,
        PcmEncoding::I32 => cpal::SampleFormat::I32,
        PcmEncoding::F32 => cpal::SampleFormat::F32,
        PcmEncoding::F64 => cpal::SampleFormat::F64,
    }
}

fn from_cpal_format(format: cpal::SampleFormat) -> Option<PcmEncoding> {
    match format {
        cpal::SampleFormat::U8 => Some(PcmEncoding::U8),
        cpal::SampleFormat::I8 => Some(PcmEncoding::I8),
        cpal::SampleFormat::U16 => Some(PcmEncoding::U16),
        cpal::SampleFormat::I16 => Some(PcmEncoding::I16),
        cpal::SampleFormat::I32 => Some(PcmEncoding::I32),
        cpal::SampleFormat::F32 => Some(PcmEncoding::F32),
        cpal::SampleFormat::F64 => Some(PcmEncoding::F64),
        _ => None,
    }
}

impl PlaybackDriver for CpalDriver {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn open(
        &self,
        desired: &StreamConfig,
        mut fill: FillBuffer,
    ) -> Result<OpenedStream, PlaybackError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| PlaybackError::DriverUnavailable {
                reason: "no output device available".to_string(),
            })?;
        info!(
            "[CpalDriver] Using output device: {}",
            device.name().unwrap_or_else(|_| "<unknown>".to_string())
        );

        // Prefer a config matching the requested encoding and channel
        // count; fall back to whatever the device defaults to.
        let wanted = to_cpal_format(desired.encoding);
        let ranges = device
            .supported_output_configs()
            .map_err(|e| PlaybackError::StreamOpenFailed {
                reason: e.to_string(),
            })?;
        let mut chosen = None;
        for range in ranges {
            if range.sample_format() != wanted {
                continue;
            }
            let exact_channels = range.channels() == desired.channels;
            if exact_channels || chosen.is_none() {
                chosen = Some(range);
                if exact_channels {
                    break;
                }
            }
        }
        let supported = match chosen {
            Some(range) => {
                let rates = range.min_sample_rate().0..=range.max_sample_rate().0;
                if rates.contains(&desired.sample_rate) {
                    range.with_sample_rate(cpal::SampleRate(desired.sample_rate))
                } else {
                    range.with_max_sample_rate()
                }
            }
            None => device
                .default_output_config()
                .map_err(|e| PlaybackError::StreamOpenFailed {
                    reason: e.to_string(),
                })?,
        };

        let sample_format = supported.sample_format();
        let encoding =
            from_cpal_format(sample_format).ok_or_else(|| PlaybackError::StreamOpenFailed {
                reason: format!("device offered unusable sample format {:?}", sample_format),
            })?;

        let mut config: cpal::StreamConfig = supported.config();
        if let cpal::SupportedBufferSize::Range { min, max } = *supported.buffer_size() {
            if (min..=max).contains(&desired.buffer_frames) {
                config.buffer_size = cpal::BufferSize::Fixed(desired.buffer_frames);
            }
        }

        let obtained = StreamFormat {
            channels: config.channels,
            encoding,
            sample_rate: config.sample_rate.0,
        };

        let stream = device
            .build_output_stream_raw(
                &config,
                sample_format,
                move |data: &mut cpal::Data, _: &cpal::OutputCallbackInfo| {
                    fill(data.bytes_mut());
                },
                move |err| {
                    log_playback_error(
                        &PlaybackError::StreamFailure {
                            reason: err.to_string(),
                        },
                        "output stream callback",
                    );
                },
                None,
            )
            .map_err(|e| PlaybackError::StreamOpenFailed {
                reason: e.to_string(),
            })?;

        // Streams may start running on creation; hold delivery until resume.
        stream.pause().map_err(|e| PlaybackError::StreamFailure {
            reason: e.to_string(),
        })?;

        info!(
            "[CpalDriver] Opened output stream: {} ch, {}, {} Hz",
            obtained.channels,
            obtained.encoding.name(),
            obtained.sample_rate
        );

        Ok(OpenedStream {
            stream: Box::new(CpalStream {
                stream,
                playing: false,
            }),
            obtained,
        })
    }
}

struct CpalStream {
    stream: cpal::Stream,
    playing: bool,
}

impl PlaybackStream for CpalStream {
    fn resume(&mut self) -> Result<(), PlaybackError> {
        if self.playing {
            return Err(PlaybackError::AlreadyRunning);
        }
        self.stream
            .play()
            .map_err(|e| PlaybackError::StreamFailure {
                reason: e.to_string(),
            })?;
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        if !self.playing {
            return Err(PlaybackError::NotRunning);
        }
        self.stream
            .pause()
            .map_err(|e| PlaybackError::StreamFailure {
                reason: e.to_string(),
            })?;
        self.playing = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_mapping_roundtrips() {
        for encoding in [
            PcmEncoding::U8,
            PcmEncoding::I8,
            PcmEncoding::U16,
            PcmEncoding::I16,
            PcmEncoding::I32,
            PcmEncoding::F32,
            PcmEncoding::F64,
        ] {
            assert_eq!(
                from_cpal_format(to_cpal_format(encoding)),
                Some(encoding),
                "{} must map 1:1 through the cpal format",
                encoding.name()
            );
        }
    }
}
