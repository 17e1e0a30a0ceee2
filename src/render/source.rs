//! Source objects and their playback state machine

use crate::render::buffer::BufferId;

/// Handle naming a source owned by a render context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub(crate) u32);

impl SourceId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Playback state of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Created, never played
    Initial,
    /// Being mixed by the renderer
    Playing,
    /// Suspended mid-buffer; play resumes from the pause position
    Paused,
    /// Reached the end of its buffer, or explicitly stopped
    Stopped,
}

/// Internal source record. The cursor is a fractional frame position into
/// the attached buffer so rate-mismatched buffers step correctly.
#[derive(Debug)]
pub(crate) struct Source {
    pub buffer: Option<BufferId>,
    pub state: SourceState,
    pub cursor: f64,
}

impl Source {
    pub fn new() -> Self {
        Self {
            buffer: None,
            state: SourceState::Initial,
            cursor: 0.0,
        }
    }

    /// Start or restart playback. Resuming from Paused keeps the cursor;
    /// every other state rewinds.
    pub fn play(&mut self) {
        if self.state != SourceState::Paused {
            self.cursor = 0.0;
        }
        self.state = SourceState::Playing;
    }

    pub fn pause(&mut self) {
        if self.state == SourceState::Playing {
            self.state = SourceState::Paused;
        }
    }

    pub fn stop(&mut self) {
        if self.state != SourceState::Initial {
            self.state = SourceState::Stopped;
        }
        self.cursor = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_source_is_initial() {
        let source = Source::new();
        assert_eq!(source.state, SourceState::Initial);
        assert!(source.buffer.is_none());
        assert_eq!(source.cursor, 0.0);
    }

    #[test]
    fn test_play_rewinds_unless_paused() {
        let mut source = Source::new();
        source.play();
        assert_eq!(source.state, SourceState::Playing);

        source.cursor = 100.0;
        source.pause();
        assert_eq!(source.state, SourceState::Paused);

        source.play();
        assert_eq!(source.cursor, 100.0, "resume from pause keeps the cursor");

        source.stop();
        source.play();
        assert_eq!(source.cursor, 0.0, "play after stop rewinds");
    }

    #[test]
    fn test_pause_only_affects_playing() {
        let mut source = Source::new();
        source.pause();
        assert_eq!(source.state, SourceState::Initial);

        source.play();
        source.stop();
        source.pause();
        assert_eq!(source.state, SourceState::Stopped);
    }

    #[test]
    fn test_stop_from_initial_stays_initial() {
        let mut source = Source::new();
        source.stop();
        assert_eq!(source.state, SourceState::Initial);
    }
}
