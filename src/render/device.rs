//! Loopback device and render context lifecycle
//!
//! The device is purely virtual: it holds no OS resources and never touches
//! hardware. A render context bound to it owns the buffer and source
//! registries and produces sample frames on demand. Context state lives
//! behind a mutex shared with the playback driver's callback thread; every
//! lock is held only for the duration of a single operation or callback.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::info;

use crate::error::RenderError;
use crate::format::{ChannelLayout, RenderFormat, SampleType};
use crate::render::buffer::{BufferId, BufferLayout, PcmBuffer};
use crate::render::mixer;
use crate::render::source::{Source, SourceId, SourceState};

/// Lowest sample rate a render context accepts.
pub const MIN_SAMPLE_RATE: u32 = 8_000;
/// Highest sample rate a render context accepts.
pub const MAX_SAMPLE_RATE: u32 = 192_000;

/// A virtual rendering device.
///
/// Opened through the loopback capability table; closing happens on drop.
pub struct LoopbackDevice {
    _priv: (),
}

impl LoopbackDevice {
    pub(crate) fn open() -> Result<Self, RenderError> {
        info!("[Loopback] Opened loopback device");
        Ok(Self { _priv: () })
    }

    /// Whether the (rate, layout, type) triple can back a render context.
    ///
    /// Every advertised layout/type marker pair renders; the sample rate is
    /// the only gate. Callers must confirm this before creating a context.
    pub fn is_render_format_supported(
        &self,
        sample_rate: u32,
        layout: ChannelLayout,
        sample_type: SampleType,
    ) -> bool {
        (MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate)
            && layout.channels() > 0
            && sample_type.bytes_per_sample() > 0
    }
}

impl Drop for LoopbackDevice {
    fn drop(&mut self) {
        info!("[Loopback] Closed loopback device");
    }
}

#[derive(Debug)]
pub(crate) struct ContextState {
    pub format: RenderFormat,
    pub buffers: HashMap<u32, PcmBuffer>,
    pub sources: HashMap<u32, Source>,
    next_buffer_id: u32,
    next_source_id: u32,
}

/// Mixing context bound to a loopback device.
///
/// Cloning is cheap and shares the same state; the playback callback holds
/// one clone while the main thread manages buffers and sources through
/// another.
#[derive(Clone, Debug)]
pub struct RenderContext {
    inner: Arc<Mutex<ContextState>>,
}

impl RenderContext {
    pub(crate) fn create(
        device: &LoopbackDevice,
        format: RenderFormat,
    ) -> Result<Self, RenderError> {
        if !device.is_render_format_supported(format.sample_rate, format.layout, format.sample_type)
        {
            return Err(RenderError::FormatNotRenderable {
                layout: format.layout,
                sample_type: format.sample_type,
                sample_rate: format.sample_rate,
            });
        }

        info!(
            "[Loopback] Created render context: {}, {}, {} Hz ({} bytes/frame)",
            format.layout.name(),
            format.sample_type.name(),
            format.sample_rate,
            format.frame_size()
        );

        Ok(Self {
            inner: Arc::new(Mutex::new(ContextState {
                format,
                buffers: HashMap::new(),
                sources: HashMap::new(),
                next_buffer_id: 1,
                next_source_id: 1,
            })),
        })
    }

    // A poisoned lock only means a callback panicked mid-mix; the registries
    // themselves stay usable.
    fn state(&self) -> MutexGuard<'_, ContextState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn format(&self) -> RenderFormat {
        self.state().format
    }

    pub fn frame_size(&self) -> usize {
        self.state().format.frame_size()
    }

    /// Register raw PCM bytes as a buffer object.
    ///
    /// Validation happens before anything is retained; a rejected buffer
    /// leaves no partial state behind.
    pub fn create_buffer(
        &self,
        data: &[u8],
        layout: BufferLayout,
        sample_rate: u32,
    ) -> Result<BufferId, RenderError> {
        let buffer = PcmBuffer::decode(data, layout, sample_rate)?;

        let mut state = self.state();
        let id = state.next_buffer_id;
        state.next_buffer_id += 1;
        state.buffers.insert(id, buffer);
        Ok(BufferId(id))
    }

    /// Delete a buffer. Fails while any source still references it; delete
    /// the source first.
    pub fn delete_buffer(&self, id: BufferId) -> Result<(), RenderError> {
        let mut state = self.state();
        if !state.buffers.contains_key(&id.0) {
            return Err(RenderError::InvalidBuffer { buffer: id.0 });
        }
        if state.sources.values().any(|s| s.buffer == Some(id)) {
            return Err(RenderError::BufferInUse { buffer: id.0 });
        }
        state.buffers.remove(&id.0);
        Ok(())
    }

    pub fn create_source(&self) -> SourceId {
        let mut state = self.state();
        let id = state.next_source_id;
        state.next_source_id += 1;
        state.sources.insert(id, Source::new());
        SourceId(id)
    }

    /// Attach a buffer to a source, rewinding it.
    pub fn set_source_buffer(
        &self,
        source: SourceId,
        buffer: BufferId,
    ) -> Result<(), RenderError> {
        let mut state = self.state();
        if !state.buffers.contains_key(&buffer.0) {
            return Err(RenderError::InvalidBuffer { buffer: buffer.0 });
        }
        let entry = state
            .sources
            .get_mut(&source.0)
            .ok_or(RenderError::InvalidSource { source: source.0 })?;
        entry.buffer = Some(buffer);
        entry.cursor = 0.0;
        Ok(())
    }

    pub fn play_source(&self, source: SourceId) -> Result<(), RenderError> {
        self.with_source(source, Source::play)
    }

    pub fn pause_source(&self, source: SourceId) -> Result<(), RenderError> {
        self.with_source(source, Source::pause)
    }

    pub fn stop_source(&self, source: SourceId) -> Result<(), RenderError> {
        self.with_source(source, Source::stop)
    }

    fn with_source(
        &self,
        source: SourceId,
        op: impl FnOnce(&mut Source),
    ) -> Result<(), RenderError> {
        let mut state = self.state();
        let entry = state
            .sources
            .get_mut(&source.0)
            .ok_or(RenderError::InvalidSource { source: source.0 })?;
        op(entry);
        Ok(())
    }

    /// Observe a source's playback state.
    pub fn source_state(&self, source: SourceId) -> Result<SourceState, RenderError> {
        self.state()
            .sources
            .get(&source.0)
            .map(|s| s.state)
            .ok_or(RenderError::InvalidSource { source: source.0 })
    }

    pub fn delete_source(&self, source: SourceId) -> Result<(), RenderError> {
        let mut state = self.state();
        state
            .sources
            .remove(&source.0)
            .map(|_| ())
            .ok_or(RenderError::InvalidSource { source: source.0 })
    }

    /// Fill `dest` with exactly `frames` frames of mixed output.
    ///
    /// Synchronous pure computation, no blocking I/O; safe to call from the
    /// playback driver's callback thread at any cadence. If `dest` is too
    /// short for the requested count, only as many whole frames as fit are
    /// rendered; bytes past the rendered span are never touched.
    pub fn render_samples(&self, dest: &mut [u8], frames: usize) {
        let mut state = self.state();
        let frame_size = state.format.frame_size();
        let frames = frames.min(dest.len() / frame_size);
        mixer::mix_into(&mut state, dest, frames);
    }
}

/// Device/context pair owned by one playback run.
///
/// The context is valid only while the device is; the frame size is valid
/// only once a context is attached. Dropping the session releases the
/// context before the device, on every exit path, without ever touching a
/// context that was never created.
pub struct RenderSession {
    context: Option<RenderContext>,
    device: LoopbackDevice,
    frame_size: usize,
}

impl RenderSession {
    pub fn new(device: LoopbackDevice) -> Self {
        Self {
            context: None,
            device,
            frame_size: 0,
        }
    }

    pub fn device(&self) -> &LoopbackDevice {
        &self.device
    }

    /// Create and bind the render context for the negotiated format.
    pub fn attach_context(&mut self, format: RenderFormat) -> Result<RenderContext, RenderError> {
        let context = RenderContext::create(&self.device, format)?;
        self.frame_size = format.frame_size();
        self.context = Some(context.clone());
        Ok(context)
    }

    /// Bytes per frame of the active context, 0 before one is attached.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn context(&self) -> Option<&RenderContext> {
        self.context.as_ref()
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        if let Some(context) = self.context.take() {
            drop(context);
            info!("[Loopback] Destroyed render context");
        }
        // The device field drops after this body runs.
    }
}
