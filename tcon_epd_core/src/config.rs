use std::time::Duration;

use crate::command::MAX_CHUNK_SIZE;

/// Timing and framing knobs of a [`Session`](crate::session::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a command may keep the panel busy before it is disabled.
    pub quiescence_timeout: Duration,
    /// How long the panel may stay busy after each data chunk.
    pub chunk_timeout: Duration,
    /// Payload bytes per chunk, clamped to `1..=250`.
    pub max_chunk_size: usize,
}

impl SessionConfig {
    pub const DEFAULT: SessionConfig = SessionConfig {
        quiescence_timeout: Duration::from_millis(5000),
        chunk_timeout: Duration::from_millis(1000),
        max_chunk_size: MAX_CHUNK_SIZE,
    };
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
