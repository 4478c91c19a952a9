use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::settings::TrackSettings;

/// Media kind of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Audio => "audio",
            Self::Video => "video",
        })
    }
}

/// Notifications a track can deliver. Unmute edges are intentionally absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackEvent {
    Ended,
    Muted,
}

impl fmt::Display for TrackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ended => "ended",
            Self::Muted => "muted",
        })
    }
}

/// Payload handed to track listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackNotification {
    pub track_id: String,
    pub kind: TrackKind,
    pub event: TrackEvent,
}

/// Callback attached to a track event.
///
/// Listeners are compared by pointer identity, so removal needs a clone of
/// the same `Arc` that was registered.
pub type TrackListener = Arc<dyn Fn(&TrackNotification) + Send + Sync + 'static>;

pub fn same_listener(a: &TrackListener, b: &TrackListener) -> bool {
    Arc::ptr_eq(a, b)
}

/// One media channel of a host stream.
///
/// Tracks are shared between the stream handle and listener bookkeeping, so
/// every method takes `&self`; implementations use interior mutability.
/// Listener callbacks may fire from any thread.
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    fn label(&self) -> String;

    fn is_enabled(&self) -> bool;

    /// Enable or disable media flow without releasing the device.
    fn set_enabled(&self, enabled: bool);

    /// `false` once the track has ended or been stopped.
    fn is_live(&self) -> bool;

    /// Release the underlying device. Does not fire `Ended` listeners.
    fn stop(&self);

    fn settings(&self) -> TrackSettings;

    fn add_listener(&self, event: TrackEvent, listener: TrackListener);

    fn remove_listener(&self, event: TrackEvent, listener: &TrackListener);
}

impl fmt::Debug for dyn MediaTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaTrack")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .field("live", &self.is_live())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde_names() {
        for event in [TrackEvent::Ended, TrackEvent::Muted] {
            let json = serde_json::to_string(&event).unwrap();
            assert_eq!(json.trim_matches('"'), event.to_string());
        }
        assert_eq!(format!("{} {}", TrackKind::Audio, TrackEvent::Muted), "audio muted");
    }
}
