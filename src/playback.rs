//! End-to-end playback orchestration
//!
//! The sequence is a single linear pipeline: probe the loopback capability,
//! open the device, open the output stream, negotiate the render format from
//! what the stream actually obtained, wire the fill callback, synthesize and
//! play the tone, poll until the source leaves the playing state, and
//! release everything in reverse-acquisition order.
//!
//! Teardown ordering is carried by declaration order: the stream is declared
//! after the render session, so on every exit path - including early error
//! returns - callback delivery dies before the context and device do.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use log::info;

use crate::config::AppConfig;
use crate::driver::{wait_until_finished, FillBuffer, OpenedStream, PlaybackDriver};
use crate::error::{log_render_error, RenderError};
use crate::format::{negotiate, RenderFormat, StreamFormat};
use crate::render::{LoopbackCaps, RenderContext, RenderSession, SourceState};
use crate::synth::create_sine_buffer;

/// Rendering state handed to the fill callback once the context exists.
///
/// Installed exactly once, before the stream is resumed, and read-only
/// afterwards until teardown.
struct RenderBinding {
    context: RenderContext,
    frame_size: usize,
}

/// Summary of a completed playback run.
#[derive(Debug, Clone)]
pub struct PlaybackReport {
    pub obtained: StreamFormat,
    pub render_format: RenderFormat,
    pub final_state: SourceState,
}

/// Run the full playback pipeline against the given driver.
///
/// Every failure is fatal and unwinds through the session/stream guards; no
/// step is retried.
pub fn run_playback(driver: &dyn PlaybackDriver, config: &AppConfig) -> Result<PlaybackReport> {
    let caps = LoopbackCaps::resolve()?;
    let mut session = RenderSession::new(caps.open_device()?);

    let binding: Arc<Mutex<Option<RenderBinding>>> = Arc::new(Mutex::new(None));
    let callback_binding = Arc::clone(&binding);
    let fill: FillBuffer = Box::new(move |dest: &mut [u8]| {
        match callback_binding.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(bound) if bound.frame_size > 0 => {
                    let frames = dest.len() / bound.frame_size;
                    bound.context.render_samples(dest, frames);
                }
                _ => dest.fill(0),
            },
            Err(_) => dest.fill(0),
        }
    });

    // Declared after the session so it is released first on every path.
    let OpenedStream {
        mut stream,
        obtained,
    } = driver.open(&config.stream, fill)?;
    info!(
        "[Playback] Driver {} obtained: {} ch, {}, {} Hz",
        driver.name(),
        obtained.channels,
        obtained.encoding.name(),
        obtained.sample_rate
    );

    let render_format = negotiate(&obtained)?;
    if !session.device().is_render_format_supported(
        render_format.sample_rate,
        render_format.layout,
        render_format.sample_type,
    ) {
        let err = RenderError::FormatNotRenderable {
            layout: render_format.layout,
            sample_type: render_format.sample_type,
            sample_rate: render_format.sample_rate,
        };
        log_render_error(&err, "format negotiation");
        return Err(err.into());
    }

    let context = session.attach_context(render_format)?;
    if let Ok(mut slot) = binding.lock() {
        *slot = Some(RenderBinding {
            context: context.clone(),
            frame_size: session.frame_size(),
        });
    }

    // From here the driver pulls rendered frames on its own thread.
    stream.resume()?;

    let buffer = create_sine_buffer(&context, &config.tone)?;
    let source = context.create_source();
    context.set_source_buffer(source, buffer)?;
    context.play_source(source)?;
    info!(
        "[Playback] Playing source {} until it leaves the playing state",
        source.raw()
    );

    let final_state = wait_until_finished(
        &context,
        source,
        Duration::from_millis(config.poll_interval_ms),
    );
    info!("[Playback] Source settled in state {:?}", final_state);

    context.delete_source(source)?;
    context.delete_buffer(buffer)?;
    stream.pause()?;
    drop(stream);
    drop(session);

    Ok(PlaybackReport {
        obtained,
        render_format,
        final_state,
    })
}
