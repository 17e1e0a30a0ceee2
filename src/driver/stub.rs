//! Deterministic stub driver for tests and CLI tooling
//!
//! Simulates the external audio subsystem without real audio I/O: `resume`
//! starts a pump thread that invokes the fill callback with fixed-size byte
//! buffers at a short period, standing in for the platform's callback
//! thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::StreamConfig;
use crate::error::PlaybackError;
use crate::format::StreamFormat;

use super::{FillBuffer, OpenedStream, PlaybackDriver, PlaybackStream};

/// Stub playback driver.
///
/// By default it grants exactly what was requested; `with_obtained`
/// substitutes a different granted format to exercise negotiation failures.
pub struct StubDriver {
    obtained_override: Option<StreamFormat>,
    pump_period: Duration,
    capture: Option<Arc<Mutex<Vec<u8>>>>,
}

impl StubDriver {
    pub fn new() -> Self {
        Self {
            obtained_override: None,
            pump_period: Duration::from_millis(1),
            capture: None,
        }
    }

    /// Report `format` as the obtained stream format regardless of the
    /// request.
    pub fn with_obtained(mut self, format: StreamFormat) -> Self {
        self.obtained_override = Some(format);
        self
    }

    /// Append every pumped byte buffer to `sink` for inspection.
    pub fn with_capture(mut self, sink: Arc<Mutex<Vec<u8>>>) -> Self {
        self.capture = Some(sink);
        self
    }
}

impl Default for StubDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackDriver for StubDriver {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn open(
        &self,
        desired: &StreamConfig,
        fill: FillBuffer,
    ) -> Result<OpenedStream, PlaybackError> {
        let obtained = self.obtained_override.unwrap_or(StreamFormat {
            channels: desired.channels,
            encoding: desired.encoding,
            sample_rate: desired.sample_rate,
        });

        let frame_size = obtained.channels as usize * obtained.encoding.bytes_per_sample();
        let chunk_bytes = desired.buffer_frames as usize * frame_size;

        Ok(OpenedStream {
            stream: Box::new(StubStream {
                fill: Arc::new(Mutex::new(fill)),
                chunk_bytes,
                pump_period: self.pump_period,
                capture: self.capture.clone(),
                running: Arc::new(AtomicBool::new(false)),
                pump: None,
            }),
            obtained,
        })
    }
}

struct StubStream {
    fill: Arc<Mutex<FillBuffer>>,
    chunk_bytes: usize,
    pump_period: Duration,
    capture: Option<Arc<Mutex<Vec<u8>>>>,
    running: Arc<AtomicBool>,
    pump: Option<JoinHandle<()>>,
}

impl PlaybackStream for StubStream {
    fn resume(&mut self) -> Result<(), PlaybackError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(PlaybackError::AlreadyRunning);
        }

        let fill = Arc::clone(&self.fill);
        let running = Arc::clone(&self.running);
        let capture = self.capture.clone();
        let chunk_bytes = self.chunk_bytes;
        let pump_period = self.pump_period;

        self.pump = Some(thread::spawn(move || {
            let mut scratch = vec![0u8; chunk_bytes];
            while running.load(Ordering::SeqCst) {
                if let Ok(mut fill) = fill.lock() {
                    (*fill)(&mut scratch);
                }
                if let Some(sink) = &capture {
                    if let Ok(mut sink) = sink.lock() {
                        sink.extend_from_slice(&scratch);
                    }
                }
                thread::sleep(pump_period);
            }
        }));

        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(PlaybackError::NotRunning);
        }
        if let Some(pump) = self.pump.take() {
            let _ = pump.join();
        }
        Ok(())
    }
}

impl Drop for StubStream {
    fn drop(&mut self) {
        // Stop delivery before the fill callback's captures go away.
        let _ = self.pause();
    }
}
