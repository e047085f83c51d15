use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Identifier of a feed slot hosting a video player.
///
/// Ids are unique per slot, not across time: a new handle mounted in the
/// same slot reuses the id and supersedes the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a PlayerId from any string-like slot key
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw slot key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Best-effort mirror of a player's playback state.
///
/// The native handle stays authoritative; this only reflects what the
/// registry last observed or requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Mounted, nothing observed yet
    #[default]
    Idle,

    /// Reported progress with a known duration
    Playing,

    /// Paused by the registry
    Paused,

    /// Torn down, never reachable from the registry
    Disposed,
}

impl From<PlaybackState> for &'static str {
    fn from(state: PlaybackState) -> Self {
        match state {
            PlaybackState::Idle => "Idle",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Disposed => "Disposed",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label: &str = (*self).into();
        f.write_str(label)
    }
}

bitflags! {
    /// Operations a player handle declares it supports.
    ///
    /// Every call site checks the relevant flag before invoking the handle;
    /// a missing flag turns the call into a silent no-op.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// `play()`
        const PLAY = 1 << 0;
        /// `pause()`
        const PAUSE = 1 << 1;
        /// `set_muted(bool)`
        const SET_MUTED = 1 << 2;
        /// `reset()`
        const RESET = 1 << 3;
        /// `release()`
        const RELEASE = 1 << 4;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::all()
    }
}

/// Cached playback fields reported by the handle's event callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackSnapshot {
    /// Playback position in seconds
    pub current_time: Option<f64>,

    /// Media duration in seconds
    pub duration: Option<f64>,

    /// Last reported playing flag
    pub is_playing: Option<bool>,

    /// Last reported mute flag
    pub muted: Option<bool>,
}

impl PlaybackSnapshot {
    /// Overwrites the fields present in `patch`, leaving the rest untouched.
    pub fn merge(&mut self, patch: &PlayerStatePatch) {
        if patch.current_time.is_some() {
            self.current_time = patch.current_time;
        }
        if patch.duration.is_some() {
            self.duration = patch.duration;
        }
        if patch.is_playing.is_some() {
            self.is_playing = patch.is_playing;
        }
        if patch.muted.is_some() {
            self.muted = patch.muted;
        }
    }

    /// True only when both position and duration are known and positive.
    ///
    /// A handle that has not finished loading reports zeroed fields.
    pub fn shows_progress(&self) -> bool {
        matches!(
            (self.current_time, self.duration),
            (Some(time), Some(duration)) if time > 0.0 && duration > 0.0
        )
    }
}

/// Partial playback update delivered by a handle's event callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerStatePatch {
    /// New playback position in seconds
    pub current_time: Option<f64>,

    /// New media duration in seconds
    pub duration: Option<f64>,

    /// Explicit playing flag
    pub is_playing: Option<bool>,

    /// Explicit mute flag
    pub muted: Option<bool>,
}

impl PlayerStatePatch {
    /// Patch carrying position and duration.
    pub fn progress(current_time: f64, duration: f64) -> Self {
        Self {
            current_time: Some(current_time),
            duration: Some(duration),
            ..Self::default()
        }
    }

    /// Patch carrying only the playing flag.
    pub fn playing(is_playing: bool) -> Self {
        Self {
            is_playing: Some(is_playing),
            ..Self::default()
        }
    }
}
