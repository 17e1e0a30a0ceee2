//! Playback driver abstractions
//!
//! The driver owns the output side of the pipeline: it opens a
//! callback-driven stream, reports the stream format it actually obtained,
//! and invokes the fill-buffer callback from its own thread whenever the
//! platform wants more bytes. The renderer never learns which driver is
//! pulling from it.

use std::thread;
use std::time::Duration;

use crate::config::StreamConfig;
use crate::error::PlaybackError;
use crate::format::StreamFormat;
use crate::render::{RenderContext, SourceId, SourceState};

/// Fill-buffer callback invoked from the driver's callback thread.
///
/// The destination length is the driver's choice per invocation; the
/// callback must fill every byte it is handed.
pub type FillBuffer = Box<dyn FnMut(&mut [u8]) + Send + 'static>;

/// Result of opening a stream: the paused stream plus what the platform
/// actually granted.
pub struct OpenedStream {
    pub stream: Box<dyn PlaybackStream>,
    pub obtained: StreamFormat,
}

/// Trait implemented by playback drivers.
pub trait PlaybackDriver {
    fn name(&self) -> &'static str;

    /// Open an output stream as close to `desired` as the platform allows.
    ///
    /// The stream is created paused; the fill callback only starts running
    /// after `resume()`. The obtained format may differ from the request
    /// and is what format negotiation must work from.
    fn open(&self, desired: &StreamConfig, fill: FillBuffer)
        -> Result<OpenedStream, PlaybackError>;
}

/// An open output stream. Dropping it closes the stream.
pub trait PlaybackStream {
    /// Start (or restart) callback delivery.
    fn resume(&mut self) -> Result<(), PlaybackError>;

    /// Suspend callback delivery.
    fn pause(&mut self) -> Result<(), PlaybackError>;
}

/// Block until the source's playback state leaves `Playing`.
///
/// Samples the state at `poll_interval` on the calling thread. A failed
/// state query ends the wait the same way a stopped source does; the two
/// outcomes are deliberately not distinguished. There is no cancellation
/// beyond process exit; the renderer exposes no completion notification,
/// so a fixed-interval poll is the contract.
pub fn wait_until_finished(
    context: &RenderContext,
    source: SourceId,
    poll_interval: Duration,
) -> SourceState {
    loop {
        match context.source_state(source) {
            Ok(SourceState::Playing) => thread::sleep(poll_interval),
            Ok(state) => return state,
            Err(_) => return SourceState::Stopped,
        }
    }
}

mod cpal;
mod stub;

pub use self::cpal::CpalDriver;
pub use self::stub::StubDriver;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{ChannelLayout, RenderFormat, SampleType};
    use crate::render::{LoopbackDevice, RenderContext};

    fn test_context() -> RenderContext {
        let device = LoopbackDevice::open().unwrap();
        RenderContext::create(
            &device,
            RenderFormat {
                layout: ChannelLayout::Mono,
                sample_type: SampleType::I16,
                sample_rate: 44100,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_wait_returns_immediately_for_non_playing_source() {
        let context = test_context();
        let source = context.create_source();
        let state = wait_until_finished(&context, source, Duration::from_millis(1));
        assert_eq!(state, SourceState::Initial);
    }

    #[test]
    fn test_wait_treats_query_error_as_finished() {
        let context = test_context();
        let source = context.create_source();
        context.delete_source(source).unwrap();
        let state = wait_until_finished(&context, source, Duration::from_millis(1));
        assert_eq!(state, SourceState::Stopped);
    }
}
