//! Software loopback rendering
//!
//! A loopback device never touches hardware: instead of the backend pulling
//! samples for an output device, the application pulls rendered frames out
//! of the device manually. This module exposes the capability probe, the
//! device/context lifecycle, and the buffer/source objects played through a
//! context.

mod buffer;
mod device;
mod mixer;
mod source;

pub use buffer::{BufferId, BufferLayout};
pub use device::{
    LoopbackDevice, RenderContext, RenderSession, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE,
};
pub use source::{SourceId, SourceState};

use crate::error::RenderError;

/// Extension string advertised when loopback rendering is available.
pub const LOOPBACK_EXTENSION: &str = "LOOPBACK_RENDER";

const EXTENSIONS: &[&str] = &[LOOPBACK_EXTENSION];

/// Extension strings advertised by this renderer build.
pub fn extensions() -> &'static [&'static str] {
    EXTENSIONS
}

/// Whether a named extension is advertised. Lookup is case-insensitive.
pub fn is_extension_present(name: &str) -> bool {
    extensions().iter().any(|e| e.eq_ignore_ascii_case(name))
}

/// Capability table for the loopback extension.
///
/// Resolved once at startup and passed by value to whatever opens devices,
/// instead of scattering availability checks through the pipeline. Holding
/// a `LoopbackCaps` is proof the probe succeeded.
pub struct LoopbackCaps {
    _resolved: (),
}

impl LoopbackCaps {
    /// Probe for the loopback extension and resolve its entry points.
    ///
    /// # Errors
    /// `RenderError::ExtensionMissing` when the renderer does not advertise
    /// loopback rendering; callers treat this as fatal.
    pub fn resolve() -> Result<Self, RenderError> {
        if !is_extension_present(LOOPBACK_EXTENSION) {
            return Err(RenderError::ExtensionMissing {
                name: LOOPBACK_EXTENSION.to_string(),
            });
        }
        Ok(Self { _resolved: () })
    }

    /// Open a loopback device.
    pub fn open_device(&self) -> Result<LoopbackDevice, RenderError> {
        LoopbackDevice::open()
    }
}
