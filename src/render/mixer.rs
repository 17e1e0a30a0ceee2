//! Buffer-driven sample rendering
//!
//! `mix_into` is the pull half of the loopback contract: invoked from the
//! playback driver's callback thread, it mixes every playing source into the
//! caller's byte buffer in the context's negotiated format. Pure
//! computation, one pass, no allocation.

use crate::format::{ChannelLayout, SampleType};
use crate::render::device::ContextState;
use crate::render::source::SourceState;

/// Mix `frames` frames into `dest`, encoded per the context format.
///
/// The caller guarantees `dest` holds at least `frames * frame_size` bytes;
/// nothing past that span is written. Sources that run out of buffer data
/// (or lost their buffer) transition to Stopped here.
pub(crate) fn mix_into(state: &mut ContextState, dest: &mut [u8], frames: usize) {
    let format = state.format;
    let frame_size = format.frame_size();
    let bytes_per_sample = format.sample_type.bytes_per_sample();
    let rate = format.sample_rate as f64;

    for frame in 0..frames {
        let mut left = 0.0f32;
        let mut right = 0.0f32;

        for source in state.sources.values_mut() {
            if source.state != SourceState::Playing {
                continue;
            }
            let Some(buffer_id) = source.buffer else {
                source.state = SourceState::Stopped;
                continue;
            };
            let Some(buffer) = state.buffers.get(&buffer_id.0) else {
                source.state = SourceState::Stopped;
                continue;
            };

            let buffer_frame = source.cursor as usize;
            if buffer_frame >= buffer.frames {
                source.state = SourceState::Stopped;
                continue;
            }

            let l = buffer.sample(buffer_frame, 0);
            let r = if buffer.channels > 1 {
                buffer.sample(buffer_frame, 1)
            } else {
                l
            };
            left += l;
            right += r;

            // Nearest-sample stepping covers buffers whose rate differs
            // from the context rate.
            source.cursor += buffer.sample_rate as f64 / rate;
        }

        let base = frame * frame_size;
        match format.layout {
            ChannelLayout::Mono => {
                write_sample(dest, base, format.sample_type, 0.5 * (left + right));
            }
            ChannelLayout::Stereo => {
                write_sample(dest, base, format.sample_type, left);
                write_sample(dest, base + bytes_per_sample, format.sample_type, right);
            }
        }
    }
}

/// Encode one normalized sample at `offset`. Unsigned encodings put silence
/// at their midpoint.
fn write_sample(dest: &mut [u8], offset: usize, sample_type: SampleType, value: f32) {
    let v = value.clamp(-1.0, 1.0);
    match sample_type {
        SampleType::I16 => {
            let s = (v * 32767.0).round() as i16;
            dest[offset..offset + 2].copy_from_slice(&s.to_ne_bytes());
        }
        SampleType::U16 => {
            let s = ((v * 32767.0).round() as i32 + 32768) as u16;
            dest[offset..offset + 2].copy_from_slice(&s.to_ne_bytes());
        }
        SampleType::I8 => {
            dest[offset] = ((v * 127.0).round() as i8) as u8;
        }
        SampleType::U8 => {
            dest[offset] = ((v * 127.0).round() as i16 + 128) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::format::{ChannelLayout, RenderFormat, SampleType};
    use crate::render::buffer::BufferLayout;
    use crate::render::device::{LoopbackDevice, RenderContext};
    use crate::render::source::SourceState;

    fn context_with(layout: ChannelLayout, sample_type: SampleType, rate: u32) -> RenderContext {
        let device = LoopbackDevice::open().unwrap();
        RenderContext::create(
            &device,
            RenderFormat {
                layout,
                sample_type,
                sample_rate: rate,
            },
        )
        .unwrap()
    }

    fn mono16_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_ne_bytes()).collect()
    }

    #[test]
    fn test_render_fills_exactly_the_requested_span() {
        let context = context_with(ChannelLayout::Stereo, SampleType::I16, 44100);
        let frames = 10;
        let frame_size = 4;

        // Sentinel bytes past the span must survive untouched.
        let mut dest = vec![0xAA_u8; frames * frame_size + 16];
        context.render_samples(&mut dest, frames);

        assert!(
            dest[..frames * frame_size].iter().all(|&b| b == 0),
            "silence for signed 16-bit output is all-zero bytes"
        );
        assert!(
            dest[frames * frame_size..].iter().all(|&b| b == 0xAA),
            "bytes past the rendered span must not be written"
        );
    }

    #[test]
    fn test_short_destination_clamps_frame_count() {
        let context = context_with(ChannelLayout::Stereo, SampleType::I16, 44100);
        let mut dest = vec![0xAA_u8; 4 * 3 + 2];

        // Request more frames than fit; only 3 whole frames are rendered.
        context.render_samples(&mut dest, 100);
        assert!(dest[..12].iter().all(|&b| b == 0));
        assert_eq!(&dest[12..], &[0xAA, 0xAA]);
    }

    #[test]
    fn test_silence_midpoints_per_encoding() {
        let cases: [(SampleType, &[u8]); 4] = [
            (SampleType::I16, &0i16.to_ne_bytes()),
            (SampleType::U16, &32768u16.to_ne_bytes()),
            (SampleType::I8, &[0]),
            (SampleType::U8, &[128]),
        ];

        for (sample_type, silence) in cases {
            let context = context_with(ChannelLayout::Mono, sample_type, 44100);
            let mut dest = vec![0xFF_u8; 4 * sample_type.bytes_per_sample()];
            context.render_samples(&mut dest, 4);
            for chunk in dest.chunks_exact(sample_type.bytes_per_sample()) {
                assert_eq!(
                    chunk,
                    silence,
                    "{} silence must sit at the encoding midpoint",
                    sample_type.name()
                );
            }
        }
    }

    #[test]
    fn test_mono_buffer_duplicates_to_stereo_output() {
        let context = context_with(ChannelLayout::Stereo, SampleType::I16, 44100);
        let buffer = context
            .create_buffer(
                &mono16_bytes(&[1000, -2000, 3000]),
                BufferLayout::Mono16,
                44100,
            )
            .unwrap();
        let source = context.create_source();
        context.set_source_buffer(source, buffer).unwrap();
        context.play_source(source).unwrap();

        let mut dest = vec![0u8; 3 * 4];
        context.render_samples(&mut dest, 3);

        for frame in dest.chunks_exact(4) {
            let l = i16::from_ne_bytes([frame[0], frame[1]]);
            let r = i16::from_ne_bytes([frame[2], frame[3]]);
            assert_eq!(l, r, "mono data must appear on both output channels");
        }
        let first = i16::from_ne_bytes([dest[0], dest[1]]);
        assert!((first - 1000).abs() <= 1, "got {}", first);
    }

    #[test]
    fn test_source_stops_when_buffer_is_exhausted() {
        let context = context_with(ChannelLayout::Mono, SampleType::I16, 44100);
        let buffer = context
            .create_buffer(&mono16_bytes(&[500; 8]), BufferLayout::Mono16, 44100)
            .unwrap();
        let source = context.create_source();
        context.set_source_buffer(source, buffer).unwrap();
        context.play_source(source).unwrap();

        let mut dest = vec![0u8; 16 * 2];
        context.render_samples(&mut dest, 16);

        assert_eq!(
            context.source_state(source).unwrap(),
            SourceState::Stopped,
            "rendering past the buffer end must stop the source"
        );

        // Frames past the buffer end are silence.
        let tail = i16::from_ne_bytes([dest[30], dest[31]]);
        assert_eq!(tail, 0);
    }

    #[test]
    fn test_half_rate_buffer_lasts_twice_as_long() {
        let context = context_with(ChannelLayout::Mono, SampleType::I16, 44100);
        let buffer = context
            .create_buffer(&mono16_bytes(&[400; 10]), BufferLayout::Mono16, 22050)
            .unwrap();
        let source = context.create_source();
        context.set_source_buffer(source, buffer).unwrap();
        context.play_source(source).unwrap();

        let mut dest = vec![0u8; 19 * 2];
        context.render_samples(&mut dest, 19);
        assert_eq!(
            context.source_state(source).unwrap(),
            SourceState::Playing,
            "10 frames at half rate span ~20 output frames"
        );

        let mut rest = vec![0u8; 4 * 2];
        context.render_samples(&mut rest, 4);
        assert_eq!(context.source_state(source).unwrap(), SourceState::Stopped);
    }

    #[test]
    fn test_playing_source_without_buffer_stops() {
        let context = context_with(ChannelLayout::Mono, SampleType::I16, 44100);
        let source = context.create_source();
        context.play_source(source).unwrap();

        let mut dest = vec![0u8; 2];
        context.render_samples(&mut dest, 1);
        assert_eq!(context.source_state(source).unwrap(), SourceState::Stopped);
    }
}
