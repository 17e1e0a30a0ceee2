// Playback driver error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Playback error code constants
///
/// These constants provide a single source of truth for error codes used
/// in logs and diagnostics.
///
/// Error code range: 1001-1005
pub struct PlaybackErrorCodes {}

impl PlaybackErrorCodes {
    /// No usable output device or audio host
    pub const DRIVER_UNAVAILABLE: i32 = 1001;

    /// Failed to open the callback-driven output stream
    pub const STREAM_OPEN_FAILED: i32 = 1002;

    /// Output stream is already running
    pub const ALREADY_RUNNING: i32 = 1003;

    /// Output stream is not running
    pub const NOT_RUNNING: i32 = 1004;

    /// Output stream failed after it was opened
    pub const STREAM_FAILURE: i32 = 1005;
}

/// Log a playback error with structured context
///
/// Logs the numeric code alongside the message so failures can be grepped
/// out of long runs without parsing free-form text.
pub fn log_playback_error(err: &PlaybackError, context: &str) {
    error!(
        "Playback error in {}: code={}, component=PlaybackDriver, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Playback driver errors
///
/// These errors cover opening, starting, and pausing the callback-driven
/// output stream. All of them are fatal to the playback pipeline; none are
/// retried.
///
/// Error code range: 1001-1005
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// No usable output device or audio host
    DriverUnavailable { reason: String },

    /// Failed to open the callback-driven output stream
    StreamOpenFailed { reason: String },

    /// Output stream is already running
    AlreadyRunning,

    /// Output stream is not running
    NotRunning,

    /// Output stream failed after it was opened
    StreamFailure { reason: String },
}

impl ErrorCode for PlaybackError {
    fn code(&self) -> i32 {
        match self {
            PlaybackError::DriverUnavailable { .. } => PlaybackErrorCodes::DRIVER_UNAVAILABLE,
            PlaybackError::StreamOpenFailed { .. } => PlaybackErrorCodes::STREAM_OPEN_FAILED,
            PlaybackError::AlreadyRunning => PlaybackErrorCodes::ALREADY_RUNNING,
            PlaybackError::NotRunning => PlaybackErrorCodes::NOT_RUNNING,
            PlaybackError::StreamFailure { .. } => PlaybackErrorCodes::STREAM_FAILURE,
        }
    }

    fn message(&self) -> String {
        match self {
            PlaybackError::DriverUnavailable { reason } => {
                format!("Playback driver unavailable: {}", reason)
            }
            PlaybackError::StreamOpenFailed { reason } => {
                format!("Failed to open output stream: {}", reason)
            }
            PlaybackError::AlreadyRunning => {
                "Output stream already running. Call pause() first.".to_string()
            }
            PlaybackError::NotRunning => {
                "Output stream not running. Call resume() first.".to_string()
            }
            PlaybackError::StreamFailure { reason } => {
                format!("Output stream failed: {}", reason)
            }
        }
    }
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlaybackError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for PlaybackError {}
