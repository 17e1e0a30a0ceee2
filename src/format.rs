//! Cross-API audio format negotiation
//!
//! The playback driver reports the stream format it actually obtained from
//! the platform; this module maps that description onto the loopback
//! renderer's attribute vocabulary. Negotiation is one-directional and
//! strict: anything the renderer has no marker for is rejected outright,
//! with no fallback or resampling.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Attribute key for the channel-layout marker
pub const ATTR_CHANNEL_LAYOUT: i32 = 0x1001;
/// Attribute key for the sample-type marker
pub const ATTR_SAMPLE_TYPE: i32 = 0x1002;
/// Attribute key for the sample rate in Hz
pub const ATTR_SAMPLE_RATE: i32 = 0x1003;
/// End-of-list sentinel terminating an attribute list
pub const ATTR_END: i32 = 0;

/// Sample encoding of a driver-side output stream.
///
/// This is the full set a playback driver can report; only the four integer
/// PCM encodings up to 16 bits are negotiable with the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PcmEncoding {
    U8,
    I8,
    U16,
    I16,
    I32,
    F32,
    F64,
}

impl PcmEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            PcmEncoding::U8 => "unsigned 8-bit",
            PcmEncoding::I8 => "signed 8-bit",
            PcmEncoding::U16 => "unsigned 16-bit",
            PcmEncoding::I16 => "signed 16-bit",
            PcmEncoding::I32 => "signed 32-bit",
            PcmEncoding::F32 => "32-bit float",
            PcmEncoding::F64 => "64-bit float",
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        match self {
            PcmEncoding::U8 | PcmEncoding::I8 => 1,
            PcmEncoding::U16 | PcmEncoding::I16 => 2,
            PcmEncoding::I32 | PcmEncoding::F32 => 4,
            PcmEncoding::F64 => 8,
        }
    }
}

/// Channel-layout marker understood by the render context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ChannelLayout {
    Mono = 0x1101,
    Stereo = 0x1102,
}

impl ChannelLayout {
    pub fn channels(self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChannelLayout::Mono => "mono",
            ChannelLayout::Stereo => "stereo",
        }
    }

    pub fn marker(self) -> i32 {
        self as i32
    }
}

/// Sample-type marker understood by the render context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SampleType {
    U8 = 0x1201,
    I8 = 0x1202,
    U16 = 0x1203,
    I16 = 0x1204,
}

impl SampleType {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleType::U8 | SampleType::I8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SampleType::U8 => "unsigned 8-bit",
            SampleType::I8 => "signed 8-bit",
            SampleType::U16 => "unsigned 16-bit",
            SampleType::I16 => "signed 16-bit",
        }
    }

    pub fn marker(self) -> i32 {
        self as i32
    }
}

/// Stream format as actually obtained by the playback driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    pub channels: u16,
    pub encoding: PcmEncoding,
    pub sample_rate: u32,
}

/// Render format negotiated for a loopback context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFormat {
    pub layout: ChannelLayout,
    pub sample_type: SampleType,
    pub sample_rate: u32,
}

impl RenderFormat {
    /// Size of one frame in bytes (one sample per channel).
    pub fn frame_size(&self) -> usize {
        self.layout.channels() * self.sample_type.bytes_per_sample()
    }

    /// Attribute list for context creation: key/value pairs terminated by
    /// the zero sentinel.
    pub fn attributes(&self) -> [i32; 7] {
        [
            ATTR_CHANNEL_LAYOUT,
            self.layout.marker(),
            ATTR_SAMPLE_TYPE,
            self.sample_type.marker(),
            ATTR_SAMPLE_RATE,
            self.sample_rate as i32,
            ATTR_END,
        ]
    }
}

/// Map an obtained stream format onto the renderer's markers.
///
/// Channel count and encoding are mapped 1:1; the sample rate passes through
/// unchanged. Unsupported values fail before any device is involved.
pub fn negotiate(obtained: &StreamFormat) -> Result<RenderFormat, RenderError> {
    let layout = match obtained.channels {
        1 => ChannelLayout::Mono,
        2 => ChannelLayout::Stereo,
        other => return Err(RenderError::UnsupportedChannelCount { channels: other }),
    };

    let sample_type = match obtained.encoding {
        PcmEncoding::U8 => SampleType::U8,
        PcmEncoding::I8 => SampleType::I8,
        PcmEncoding::U16 => SampleType::U16,
        PcmEncoding::I16 => SampleType::I16,
        other => {
            return Err(RenderError::UnsupportedEncoding {
                encoding: other.name().to_string(),
            })
        }
    };

    Ok(RenderFormat {
        layout,
        sample_type,
        sample_rate: obtained.sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(channels: u16, encoding: PcmEncoding) -> StreamFormat {
        StreamFormat {
            channels,
            encoding,
            sample_rate: 44100,
        }
    }

    #[test]
    fn test_all_supported_pairs_negotiate() {
        let cases = [
            (1, PcmEncoding::U8, ChannelLayout::Mono, SampleType::U8),
            (1, PcmEncoding::I8, ChannelLayout::Mono, SampleType::I8),
            (1, PcmEncoding::U16, ChannelLayout::Mono, SampleType::U16),
            (1, PcmEncoding::I16, ChannelLayout::Mono, SampleType::I16),
            (2, PcmEncoding::U8, ChannelLayout::Stereo, SampleType::U8),
            (2, PcmEncoding::I8, ChannelLayout::Stereo, SampleType::I8),
            (2, PcmEncoding::U16, ChannelLayout::Stereo, SampleType::U16),
            (2, PcmEncoding::I16, ChannelLayout::Stereo, SampleType::I16),
        ];

        for (channels, encoding, layout, sample_type) in cases {
            let format = negotiate(&stream(channels, encoding)).unwrap_or_else(|err| {
                panic!("{} ch {} should negotiate: {}", channels, encoding.name(), err)
            });
            assert_eq!(format.layout, layout);
            assert_eq!(format.sample_type, sample_type);
            assert_eq!(format.sample_rate, 44100, "rate must pass through unchanged");
        }
    }

    #[test]
    fn test_unsupported_channel_count_is_rejected() {
        let err = negotiate(&stream(3, PcmEncoding::I16)).unwrap_err();
        assert_eq!(err, RenderError::UnsupportedChannelCount { channels: 3 });

        let err = negotiate(&stream(0, PcmEncoding::I16)).unwrap_err();
        assert_eq!(err, RenderError::UnsupportedChannelCount { channels: 0 });
    }

    #[test]
    fn test_unsupported_encoding_is_rejected() {
        for encoding in [PcmEncoding::I32, PcmEncoding::F32, PcmEncoding::F64] {
            let err = negotiate(&stream(2, encoding)).unwrap_err();
            assert_eq!(
                err,
                RenderError::UnsupportedEncoding {
                    encoding: encoding.name().to_string()
                },
                "{} must not negotiate",
                encoding.name()
            );
        }
    }

    #[test]
    fn test_attribute_list_layout() {
        let format = RenderFormat {
            layout: ChannelLayout::Stereo,
            sample_type: SampleType::I16,
            sample_rate: 48000,
        };
        let attrs = format.attributes();

        assert_eq!(attrs[0], ATTR_CHANNEL_LAYOUT);
        assert_eq!(attrs[1], ChannelLayout::Stereo.marker());
        assert_eq!(attrs[2], ATTR_SAMPLE_TYPE);
        assert_eq!(attrs[3], SampleType::I16.marker());
        assert_eq!(attrs[4], ATTR_SAMPLE_RATE);
        assert_eq!(attrs[5], 48000);
        assert_eq!(attrs[6], ATTR_END, "attribute list must end with the zero sentinel");
    }

    #[test]
    fn test_markers_are_distinct_and_nonzero() {
        let markers = [
            ChannelLayout::Mono.marker(),
            ChannelLayout::Stereo.marker(),
            SampleType::U8.marker(),
            SampleType::I8.marker(),
            SampleType::U16.marker(),
            SampleType::I16.marker(),
        ];
        for (i, &a) in markers.iter().enumerate() {
            assert_ne!(a, ATTR_END, "marker must not collide with the sentinel");
            for &b in &markers[i + 1..] {
                assert_ne!(a, b, "markers must be distinct");
            }
        }
    }

    #[test]
    fn test_frame_sizes() {
        let stereo16 = RenderFormat {
            layout: ChannelLayout::Stereo,
            sample_type: SampleType::I16,
            sample_rate: 44100,
        };
        assert_eq!(stereo16.frame_size(), 4, "a stereo 16-bit frame is 4 bytes");

        let mono8 = RenderFormat {
            layout: ChannelLayout::Mono,
            sample_type: SampleType::U8,
            sample_rate: 44100,
        };
        assert_eq!(mono8.frame_size(), 1);
    }
}
