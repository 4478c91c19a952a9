//! Simulated media track.
//!
//! Behaves like a host track: `stop()` ends the track silently, while
//! `fire_ended()` / `fire_muted()` emulate notifications the host raises on
//! its own (device unplugged, OS-level mute).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use capture_stream_core::models::settings::TrackSettings;
use capture_stream_core::traits::media_track::{
    same_listener, MediaTrack, TrackEvent, TrackKind, TrackListener, TrackNotification,
};

pub struct SimulatedTrack {
    id: String,
    kind: TrackKind,
    label: String,
    settings: TrackSettings,
    enabled: AtomicBool,
    live: AtomicBool,
    listeners: Mutex<Vec<(TrackEvent, TrackListener)>>,
}

impl SimulatedTrack {
    pub fn new(kind: TrackKind, label: impl Into<String>, settings: TrackSettings) -> Arc<Self> {
        Arc::new(Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            label: label.into(),
            settings,
            enabled: AtomicBool::new(true),
            live: AtomicBool::new(true),
            listeners: Mutex::new(Vec::new()),
        })
    }

    /// End the track as the host would (e.g. device unplugged).
    ///
    /// Has no effect on a track that already ended or was stopped.
    pub fn fire_ended(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            log::debug!("sim track {} ended by host", self.id);
            self.notify(TrackEvent::Ended);
        }
    }

    /// Raise a host-side mute notification. Does not change `enabled`.
    pub fn fire_muted(&self) {
        if self.live.load(Ordering::SeqCst) {
            log::debug!("sim track {} muted by host", self.id);
            self.notify(TrackEvent::Muted);
        }
    }

    pub fn listener_count(&self, event: TrackEvent) -> usize {
        self.listeners.lock().iter().filter(|(e, _)| *e == event).count()
    }

    fn notify(&self, event: TrackEvent) {
        // Snapshot first so listeners may add/remove listeners re-entrantly.
        let listeners: Vec<TrackListener> = self
            .listeners
            .lock()
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, l)| Arc::clone(l))
            .collect();
        let note = TrackNotification {
            track_id: self.id.clone(),
            kind: self.kind,
            event,
        };
        for listener in listeners {
            listener(&note);
        }
    }
}

impl MediaTrack for SimulatedTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    fn settings(&self) -> TrackSettings {
        self.settings.clone()
    }

    fn add_listener(&self, event: TrackEvent, listener: TrackListener) {
        let mut listeners = self.listeners.lock();
        if !listeners
            .iter()
            .any(|(e, l)| *e == event && same_listener(l, &listener))
        {
            listeners.push((event, listener));
        }
    }

    fn remove_listener(&self, event: TrackEvent, listener: &TrackListener) {
        self.listeners
            .lock()
            .retain(|(e, l)| !(*e == event && same_listener(l, listener)));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counting_listener() -> (Arc<AtomicUsize>, TrackListener) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        (hits, Arc::new(move |_: &TrackNotification| {
            h.fetch_add(1, Ordering::SeqCst);
        }))
    }

    #[test]
    fn ended_fires_once_and_marks_not_live() {
        let track = SimulatedTrack::new(TrackKind::Video, "cam", TrackSettings::default());
        let (hits, listener) = counting_listener();
        track.add_listener(TrackEvent::Ended, listener);

        track.fire_ended();
        track.fire_ended();

        assert!(!track.is_live());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_is_silent() {
        let track = SimulatedTrack::new(TrackKind::Audio, "mic", TrackSettings::default());
        let (hits, listener) = counting_listener();
        track.add_listener(TrackEvent::Ended, listener);

        track.stop();
        track.fire_ended();

        assert!(!track.is_live());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn muted_does_not_touch_enabled() {
        let track = SimulatedTrack::new(TrackKind::Audio, "mic", TrackSettings::default());
        track.fire_muted();
        assert!(track.is_enabled());
    }

    #[test]
    fn listeners_are_deduplicated_and_removable() {
        let track = SimulatedTrack::new(TrackKind::Audio, "mic", TrackSettings::default());
        let (hits, listener) = counting_listener();

        track.add_listener(TrackEvent::Muted, Arc::clone(&listener));
        track.add_listener(TrackEvent::Muted, Arc::clone(&listener));
        assert_eq!(track.listener_count(TrackEvent::Muted), 1);

        track.fire_muted();
        track.remove_listener(TrackEvent::Muted, &listener);
        track.fire_muted();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(track.listener_count(TrackEvent::Muted), 0);
    }
}
