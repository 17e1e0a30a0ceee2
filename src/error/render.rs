// Loopback renderer error types and constants

use crate::error::ErrorCode;
use crate::format::{ChannelLayout, SampleType};
use log::error;
use std::fmt;

/// Render error code constants
///
/// These constants provide a single source of truth for error codes used
/// in logs and diagnostics.
///
/// Error code range: 2001-2010
pub struct RenderErrorCodes {}

impl RenderErrorCodes {
    /// Required renderer extension is not advertised
    pub const EXTENSION_MISSING: i32 = 2001;

    /// Output stream channel count has no render marker
    pub const UNSUPPORTED_CHANNEL_COUNT: i32 = 2002;

    /// Output stream sample encoding has no render marker
    pub const UNSUPPORTED_ENCODING: i32 = 2003;

    /// Failed to open the loopback device
    pub const DEVICE_OPEN_FAILED: i32 = 2004;

    /// Failed to create a render context on the device
    pub const CONTEXT_CREATE_FAILED: i32 = 2005;

    /// Negotiated format triple is not renderable on the device
    pub const FORMAT_NOT_RENDERABLE: i32 = 2006;

    /// Buffer registration was rejected
    pub const BUFFER_CREATE_FAILED: i32 = 2007;

    /// Buffer is still referenced by a source
    pub const BUFFER_IN_USE: i32 = 2008;

    /// Buffer handle does not name a registered buffer
    pub const INVALID_BUFFER: i32 = 2009;

    /// Source handle does not name a live source
    pub const INVALID_SOURCE: i32 = 2010;
}

/// Log a render error with structured context
pub fn log_render_error(err: &RenderError, context: &str) {
    error!(
        "Render error in {}: code={}, component=LoopbackRenderer, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Loopback renderer errors
///
/// These errors cover the capability probe, format negotiation, device and
/// context lifecycle, and buffer/source object management. Every one of them
/// is fatal to the playback pipeline.
///
/// Error code range: 2001-2010
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Required renderer extension is not advertised
    ExtensionMissing { name: String },

    /// Output stream channel count has no render marker
    UnsupportedChannelCount { channels: u16 },

    /// Output stream sample encoding has no render marker
    UnsupportedEncoding { encoding: String },

    /// Failed to open the loopback device
    DeviceOpenFailed { reason: String },

    /// Failed to create a render context on the device
    ContextCreateFailed { reason: String },

    /// Negotiated format triple is not renderable on the device
    FormatNotRenderable {
        layout: ChannelLayout,
        sample_type: SampleType,
        sample_rate: u32,
    },

    /// Buffer registration was rejected
    BufferCreateFailed { reason: String },

    /// Buffer is still referenced by a source
    BufferInUse { buffer: u32 },

    /// Buffer handle does not name a registered buffer
    InvalidBuffer { buffer: u32 },

    /// Source handle does not name a live source
    InvalidSource { source: u32 },
}

impl ErrorCode for RenderError {
    fn code(&self) -> i32 {
        match self {
            RenderError::ExtensionMissing { .. } => RenderErrorCodes::EXTENSION_MISSING,
            RenderError::UnsupportedChannelCount { .. } => {
                RenderErrorCodes::UNSUPPORTED_CHANNEL_COUNT
            }
            RenderError::UnsupportedEncoding { .. } => RenderErrorCodes::UNSUPPORTED_ENCODING,
            RenderError::DeviceOpenFailed { .. } => RenderErrorCodes::DEVICE_OPEN_FAILED,
            RenderError::ContextCreateFailed { .. } => RenderErrorCodes::CONTEXT_CREATE_FAILED,
            RenderError::FormatNotRenderable { .. } => RenderErrorCodes::FORMAT_NOT_RENDERABLE,
            RenderError::BufferCreateFailed { .. } => RenderErrorCodes::BUFFER_CREATE_FAILED,
            RenderError::BufferInUse { .. } => RenderErrorCodes::BUFFER_IN_USE,
            RenderError::InvalidBuffer { .. } => RenderErrorCodes::INVALID_BUFFER,
            RenderError::InvalidSource { .. } => RenderErrorCodes::INVALID_SOURCE,
        }
    }

    fn message(&self) -> String {
        match self {
            RenderError::ExtensionMissing { name } => {
                format!("Extension {} not supported", name)
            }
            RenderError::UnsupportedChannelCount { channels } => {
                format!("Unhandled stream channel count: {}", channels)
            }
            RenderError::UnsupportedEncoding { encoding } => {
                format!("Unhandled stream sample encoding: {}", encoding)
            }
            RenderError::DeviceOpenFailed { reason } => {
                format!("Failed to open loopback device: {}", reason)
            }
            RenderError::ContextCreateFailed { reason } => {
                format!("Failed to create render context: {}", reason)
            }
            RenderError::FormatNotRenderable {
                layout,
                sample_type,
                sample_rate,
            } => {
                format!(
                    "Render format not supported: {}, {}, {}hz",
                    layout.name(),
                    sample_type.name(),
                    sample_rate
                )
            }
            RenderError::BufferCreateFailed { reason } => {
                format!("Failed to create buffer: {}", reason)
            }
            RenderError::BufferInUse { buffer } => {
                format!("Buffer {} is still attached to a source", buffer)
            }
            RenderError::InvalidBuffer { buffer } => {
                format!("No such buffer: {}", buffer)
            }
            RenderError::InvalidSource { source } => {
                format!("No such source: {}", source)
            }
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RenderError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for RenderError {}
