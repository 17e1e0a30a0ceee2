//! Offline render diagnostic
//!
//! Pulls samples out of the loopback renderer directly - no output stream,
//! no callback thread - and writes them to a WAV file. Useful for checking
//! what the mixer produces without involving any audio hardware.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use loopback_player::config::ToneConfig;
use loopback_player::format::{ChannelLayout, RenderFormat, SampleType};
use loopback_player::init_logging;
use loopback_player::render::{LoopbackCaps, RenderSession, SourceState};
use loopback_player::synth::create_sine_buffer;

/// Frames rendered per pull.
const CHUNK_FRAMES: usize = 1024;

#[derive(Parser, Debug)]
#[command(
    name = "render_wav",
    about = "Render the loopback test tone offline into a WAV file"
)]
struct Cli {
    /// Output WAV path
    #[arg(long, default_value = "loopback.wav")]
    output: PathBuf,
    /// Tone duration in seconds
    #[arg(long, default_value_t = 1.0)]
    seconds: f64,
    /// Tone frequency in Hz
    #[arg(long, default_value_t = 441.0)]
    frequency: f64,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let caps = LoopbackCaps::resolve()?;
    let mut session = RenderSession::new(caps.open_device()?);

    let format = RenderFormat {
        layout: ChannelLayout::Stereo,
        sample_type: SampleType::I16,
        sample_rate: 44100,
    };
    if !session.device().is_render_format_supported(
        format.sample_rate,
        format.layout,
        format.sample_type,
    ) {
        bail!("offline render format is not supported by the loopback device");
    }
    let context = session.attach_context(format)?;

    let tone = ToneConfig {
        frequency_hz: cli.frequency,
        duration_secs: cli.seconds,
    };
    let buffer = create_sine_buffer(&context, &tone)?;
    let source = context.create_source();
    context.set_source_buffer(source, buffer)?;
    context.play_source(source)?;

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: format.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&cli.output, spec)
        .with_context(|| format!("creating {}", cli.output.display()))?;

    let mut scratch = vec![0u8; CHUNK_FRAMES * format.frame_size()];
    let mut frames_written = 0usize;
    while context.source_state(source)? == SourceState::Playing {
        context.render_samples(&mut scratch, CHUNK_FRAMES);
        for sample in scratch.chunks_exact(2) {
            writer.write_sample(i16::from_ne_bytes([sample[0], sample[1]]))?;
        }
        frames_written += CHUNK_FRAMES;
    }
    writer.finalize()?;

    context.delete_source(source)?;
    context.delete_buffer(buffer)?;

    println!(
        "Wrote {} ({} frames at {} Hz)",
        cli.output.display(),
        frames_written,
        format.sample_rate
    );
    Ok(())
}
