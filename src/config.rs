//! Configuration for the playback pipeline
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling parameter changes without recompilation. The requested stream
//! shape, the test tone, and the completion-poll interval can all be
//! adjusted via the config file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::format::PcmEncoding;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub stream: StreamConfig,
    pub tone: ToneConfig,
    /// Interval between source-state polls while waiting for playback to end
    pub poll_interval_ms: u64,
}

/// Requested output stream shape
///
/// The playback driver treats this as a request; what it actually obtained
/// is reported back at stream-open time and drives format negotiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    pub channels: u16,
    pub encoding: PcmEncoding,
    pub sample_rate: u32,
    /// Preferred callback granularity in frames
    pub buffer_frames: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            channels: 2,
            encoding: PcmEncoding::I16,
            sample_rate: 44100,
            buffer_frames: 4096,
        }
    }
}

/// Test tone parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneConfig {
    pub frequency_hz: f64,
    pub duration_secs: f64,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 441.0,
            duration_secs: 1.0,
        }
    }
}

impl Default for AppConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            tone: ToneConfig::default(),
            poll_interval_ms: 10,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file is missing or
    /// does not parse.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::load_from_file("assets/playback_config.json")
    }
}
