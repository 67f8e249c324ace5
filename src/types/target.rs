//! Playback destination addressing

use std::fmt;

/// Where a sound should be played: a session on the voice service (a guild)
/// and a destination within it (a voice channel).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaybackTarget {
    pub session: String,
    pub destination: String,
}

impl PlaybackTarget {
    pub fn new(session: impl Into<String>, destination: impl Into<String>) -> Self {
        Self { session: session.into(), destination: destination.into() }
    }
}

impl fmt::Display for PlaybackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.session, self.destination)
    }
}
