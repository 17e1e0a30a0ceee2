// Error types for the loopback player
//
// This module defines custom error types for the playback driver and the
// loopback renderer, providing structured error handling with stable numeric
// codes for diagnostics and logs.

mod playback;
mod render;

pub use playback::{log_playback_error, PlaybackError, PlaybackErrorCodes};
pub use render::{log_render_error, RenderError, RenderErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the playback and rendering layers.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
