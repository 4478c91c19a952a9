//! Mute controls. Synchronous; they act on whatever handle is currently held.

use crate::models::state::MuteState;
use crate::session::controller::StreamController;
use crate::traits::capture_host::CaptureHost;
use crate::traits::media_track::TrackKind;

impl<H: CaptureHost> StreamController<H> {
    pub fn mute_audio(&self) -> bool {
        self.set_muted(TrackKind::Audio, true)
    }

    pub fn unmute_audio(&self) -> bool {
        self.set_muted(TrackKind::Audio, false)
    }

    pub fn mute_video(&self) -> bool {
        self.set_muted(TrackKind::Video, true)
    }

    pub fn unmute_video(&self) -> bool {
        self.set_muted(TrackKind::Video, false)
    }

    pub fn mute_state(&self) -> MuteState {
        self.state.lock().muted
    }

    /// Toggle `enabled` on every `kind` track and record the mute flag.
    ///
    /// Returns `false` without touching anything when no handle is held.
    fn set_muted(&self, kind: TrackKind, muted: bool) -> bool {
        self.update(|s| {
            let Some(handle) = s.handle.as_ref() else {
                log::debug!("ignoring {kind} mute={muted}: no stream held");
                return false;
            };
            let mut count = 0;
            for track in handle.tracks_of(kind) {
                track.set_enabled(!muted);
                count += 1;
            }
            match kind {
                TrackKind::Audio => s.muted.audio = muted,
                TrackKind::Video => s.muted.video = muted,
            }
            log::debug!("{kind} mute={muted} applied to {count} tracks");
            true
        })
    }
}
