//! Sine-wave synthesis for the test tone
//!
//! Pure sample generation plus registration of the result as a renderer
//! buffer object.

use std::f64::consts::TAU;

use log::info;

use crate::config::ToneConfig;
use crate::error::RenderError;
use crate::render::{BufferId, BufferLayout, RenderContext};

/// Sample rate the tone buffer is synthesized at.
///
/// The render context may run at a different rate; the mixer steps through
/// the buffer at the rate ratio.
pub const TONE_SAMPLE_RATE: u32 = 44100;

/// Generate a signed 16-bit sine wave.
///
/// `sample[i] = round(32767 * sin(2π * f * i / rate))`. Deterministic, no
/// windowing or fade; the tone starts and ends at whatever phase the length
/// dictates.
pub fn generate_sine_wave(sample_rate: u32, frequency_hz: f64, duration_secs: f64) -> Vec<i16> {
    let num_samples = (sample_rate as f64 * duration_secs).round() as usize;

    (0..num_samples)
        .map(|i| {
            let phase = i as f64 * frequency_hz / sample_rate as f64;
            (f64::sin(phase * TAU) * 32767.0).round() as i16
        })
        .collect()
}

/// Synthesize the configured tone and register it as a mono 16-bit buffer.
///
/// On any registration failure nothing is retained; the error propagates and
/// no buffer handle exists afterwards.
pub fn create_sine_buffer(
    context: &RenderContext,
    tone: &ToneConfig,
) -> Result<BufferId, RenderError> {
    let samples = generate_sine_wave(TONE_SAMPLE_RATE, tone.frequency_hz, tone.duration_secs);

    let mut data = Vec::with_capacity(samples.len() * 2);
    for sample in &samples {
        data.extend_from_slice(&sample.to_ne_bytes());
    }

    let buffer = context.create_buffer(&data, BufferLayout::Mono16, TONE_SAMPLE_RATE)?;
    info!(
        "[Synth] Registered {:.1} Hz tone: {} samples at {} Hz",
        tone.frequency_hz,
        samples.len(),
        TONE_SAMPLE_RATE
    );
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_second_tone_sample_count() {
        let samples = generate_sine_wave(44100, 441.0, 1.0);
        assert_eq!(samples.len(), 44100, "one second at 44100 Hz is 44100 samples");
    }

    #[test]
    fn test_tone_landmarks() {
        // 441 Hz at 44100 Hz: 110.25 cycles per quarter second, so the
        // quarter-second sample sits a quarter cycle into a period.
        let samples = generate_sine_wave(44100, 441.0, 1.0);

        assert!(
            samples[0].abs() <= 1,
            "first sample should be ~0, got {}",
            samples[0]
        );
        assert!(
            samples[11025] >= 32766,
            "sample 11025 should be ~+32767, got {}",
            samples[11025]
        );
        assert!(
            samples[33075] <= -32766,
            "sample 33075 should be ~-32767, got {}",
            samples[33075]
        );
    }

    #[test]
    fn test_tone_amplitude_bounds() {
        let samples = generate_sine_wave(44100, 441.0, 1.0);
        for (i, &sample) in samples.iter().enumerate() {
            assert!(
                (-32767..=32767).contains(&sample),
                "sample {} at index {} exceeds the 16-bit amplitude",
                sample,
                i
            );
        }
    }

    #[test]
    fn test_duration_scales_sample_count() {
        assert_eq!(generate_sine_wave(44100, 441.0, 0.5).len(), 22050);
        assert_eq!(generate_sine_wave(48000, 441.0, 2.0).len(), 96000);
        assert_eq!(generate_sine_wave(44100, 441.0, 0.0).len(), 0);
    }
}
