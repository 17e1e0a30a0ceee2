// Loopback Player - software loopback rendering demo
// Pulls rendered audio out of a virtual device through a callback-driven
// output stream instead of letting the backend drive hardware directly.

// Module declarations
pub mod config;
pub mod driver;
pub mod error;
pub mod format;
pub mod playback;
pub mod render;
pub mod synth;

// Re-exports for convenience
pub use playback::{run_playback, PlaybackReport};

/// Initialize logging for binaries and ad-hoc tooling.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
