use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::settings::TrackSettings;
use crate::models::snapshot::{HandleSummary, TrackSummary};
use crate::traits::media_track::{MediaTrack, TrackKind};

/// Reference to an acquired capture stream.
///
/// Cloning is cheap and yields the same handle; equality is by id. Only the
/// controller stops tracks, so holders of a clone may inspect a handle after
/// it has been released but cannot revive it.
#[derive(Clone)]
pub struct StreamHandle {
    id: Uuid,
    tracks: Arc<[Arc<dyn MediaTrack>]>,
    acquired_at: DateTime<Utc>,
}

impl StreamHandle {
    pub fn new(tracks: Vec<Arc<dyn MediaTrack>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tracks: tracks.into(),
            acquired_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn tracks_of(&self, kind: TrackKind) -> impl Iterator<Item = &Arc<dyn MediaTrack>> {
        self.tracks.iter().filter(move |t| t.kind() == kind)
    }

    pub fn audio_tracks(&self) -> impl Iterator<Item = &Arc<dyn MediaTrack>> {
        self.tracks_of(TrackKind::Audio)
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &Arc<dyn MediaTrack>> {
        self.tracks_of(TrackKind::Video)
    }

    /// Settings of the first track of `kind`, if any.
    pub fn first_settings(&self, kind: TrackKind) -> Option<TrackSettings> {
        self.tracks_of(kind).next().map(|t| t.settings())
    }

    /// `true` if no track has ended. A handle without tracks counts as live.
    pub fn is_live(&self) -> bool {
        self.tracks.iter().all(|t| t.is_live())
    }

    pub fn summary(&self) -> HandleSummary {
        HandleSummary {
            id: self.id,
            tracks: self
                .tracks
                .iter()
                .map(|t| TrackSummary {
                    id: t.id().to_string(),
                    kind: t.kind(),
                    label: t.label(),
                    enabled: t.is_enabled(),
                    live: t.is_live(),
                })
                .collect(),
        }
    }
}

impl PartialEq for StreamHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for StreamHandle {}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("id", &self.id)
            .field("tracks", &self.tracks.len())
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}
