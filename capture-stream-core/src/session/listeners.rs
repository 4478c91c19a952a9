//! Caller-supplied track listeners.
//!
//! Registrations are kept for the controller's lifetime (until removed) and
//! forwarded to every live track of the matching kind, including tracks of
//! handles acquired after the registration was made.

use std::sync::Arc;

use crate::session::controller::StreamController;
use crate::session::handle::StreamHandle;
use crate::traits::capture_host::CaptureHost;
use crate::traits::media_track::{same_listener, TrackEvent, TrackKind, TrackListener};

struct Registration {
    kind: TrackKind,
    event: TrackEvent,
    listener: TrackListener,
}

impl Registration {
    fn matches(&self, kind: TrackKind, event: TrackEvent, listener: &TrackListener) -> bool {
        self.kind == kind && self.event == event && same_listener(&self.listener, listener)
    }
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    entries: Vec<Registration>,
}

impl ListenerRegistry {
    /// Register and forward to `live`. Duplicate registrations are ignored.
    pub(crate) fn add(
        &mut self,
        kind: TrackKind,
        event: TrackEvent,
        listener: TrackListener,
        live: Option<&StreamHandle>,
    ) -> bool {
        if self.entries.iter().any(|r| r.matches(kind, event, &listener)) {
            return false;
        }
        if let Some(handle) = live {
            for track in handle.tracks_of(kind) {
                track.add_listener(event, Arc::clone(&listener));
            }
        }
        self.entries.push(Registration {
            kind,
            event,
            listener,
        });
        true
    }

    pub(crate) fn remove(
        &mut self,
        kind: TrackKind,
        event: TrackEvent,
        listener: &TrackListener,
        live: Option<&StreamHandle>,
    ) -> bool {
        let before = self.entries.len();
        self.entries.retain(|r| !r.matches(kind, event, listener));
        if let Some(handle) = live {
            for track in handle.tracks_of(kind) {
                track.remove_listener(event, listener);
            }
        }
        self.entries.len() != before
    }

    /// Forward every registration to a freshly acquired handle.
    pub(crate) fn attach(&self, handle: &StreamHandle) {
        for reg in &self.entries {
            for track in handle.tracks_of(reg.kind) {
                track.add_listener(reg.event, Arc::clone(&reg.listener));
            }
        }
    }

    pub(crate) fn detach(&self, handle: &StreamHandle) {
        for reg in &self.entries {
            for track in handle.tracks_of(reg.kind) {
                track.remove_listener(reg.event, &reg.listener);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<H: CaptureHost> StreamController<H> {
    /// Attach `listener` to `event` on every `kind` track, now and on future handles.
    ///
    /// Returns `false` if the same listener was already registered.
    pub fn add_track_listener(
        &self,
        kind: TrackKind,
        event: TrackEvent,
        listener: TrackListener,
    ) -> bool {
        let mut state = self.state.lock();
        let handle = state.handle.clone();
        let added = state.listeners.add(kind, event, listener, handle.as_ref());
        log::debug!(
            "listener {} for {kind} {event} (live handle: {})",
            if added { "registered" } else { "already registered" },
            handle.is_some()
        );
        added
    }

    pub fn remove_track_listener(
        &self,
        kind: TrackKind,
        event: TrackEvent,
        listener: &TrackListener,
    ) -> bool {
        let mut state = self.state.lock();
        let handle = state.handle.clone();
        state.listeners.remove(kind, event, listener, handle.as_ref())
    }

    pub fn registered_listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    pub fn add_video_ended_listener(&self, listener: TrackListener) -> bool {
        self.add_track_listener(TrackKind::Video, TrackEvent::Ended, listener)
    }

    pub fn remove_video_ended_listener(&self, listener: &TrackListener) -> bool {
        self.remove_track_listener(TrackKind::Video, TrackEvent::Ended, listener)
    }

    pub fn add_audio_ended_listener(&self, listener: TrackListener) -> bool {
        self.add_track_listener(TrackKind::Audio, TrackEvent::Ended, listener)
    }

    pub fn remove_audio_ended_listener(&self, listener: &TrackListener) -> bool {
        self.remove_track_listener(TrackKind::Audio, TrackEvent::Ended, listener)
    }

    pub fn add_video_muted_listener(&self, listener: TrackListener) -> bool {
        self.add_track_listener(TrackKind::Video, TrackEvent::Muted, listener)
    }

    pub fn remove_video_muted_listener(&self, listener: &TrackListener) -> bool {
        self.remove_track_listener(TrackKind::Video, TrackEvent::Muted, listener)
    }

    pub fn add_audio_muted_listener(&self, listener: TrackListener) -> bool {
        self.add_track_listener(TrackKind::Audio, TrackEvent::Muted, listener)
    }

    pub fn remove_audio_muted_listener(&self, listener: &TrackListener) -> bool {
        self.remove_track_listener(TrackKind::Audio, TrackEvent::Muted, listener)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::models::settings::TrackSettings;
    use crate::traits::media_track::{MediaTrack, TrackNotification};

    struct FakeTrack {
        id: String,
        kind: TrackKind,
        listeners: Mutex<Vec<(TrackEvent, TrackListener)>>,
    }

    impl FakeTrack {
        fn new(id: &str, kind: TrackKind) -> Arc<Self> {
            Arc::new(Self {
                id: id.into(),
                kind,
                listeners: Mutex::new(Vec::new()),
            })
        }

        fn fire(&self, event: TrackEvent) {
            let note = TrackNotification {
                track_id: self.id.clone(),
                kind: self.kind,
                event,
            };
            let listeners: Vec<_> = self
                .listeners
                .lock()
                .iter()
                .filter(|(e, _)| *e == event)
                .map(|(_, l)| Arc::clone(l))
                .collect();
            for l in listeners {
                l(&note);
            }
        }
    }

    impl MediaTrack for FakeTrack {
        fn id(&self) -> &str {
            &self.id
        }
        fn kind(&self) -> TrackKind {
            self.kind
        }
        fn label(&self) -> String {
            self.id.clone()
        }
        fn is_enabled(&self) -> bool {
            true
        }
        fn set_enabled(&self, _enabled: bool) {}
        fn is_live(&self) -> bool {
            true
        }
        fn stop(&self) {}
        fn settings(&self) -> TrackSettings {
            TrackSettings::default()
        }
        fn add_listener(&self, event: TrackEvent, listener: TrackListener) {
            self.listeners.lock().push((event, listener));
        }
        fn remove_listener(&self, event: TrackEvent, listener: &TrackListener) {
            self.listeners
                .lock()
                .retain(|(e, l)| !(*e == event && same_listener(l, listener)));
        }
    }

    fn counter() -> (Arc<AtomicUsize>, TrackListener) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let listener: TrackListener = Arc::new(move |_: &TrackNotification| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        (hits, listener)
    }

    #[test]
    fn forwards_only_to_matching_kind() {
        let mic = FakeTrack::new("mic", TrackKind::Audio);
        let cam = FakeTrack::new("cam", TrackKind::Video);
        let handle = StreamHandle::new(vec![mic.clone() as Arc<dyn MediaTrack>, cam.clone()]);
        let (hits, listener) = counter();

        let mut registry = ListenerRegistry::default();
        assert!(registry.add(TrackKind::Video, TrackEvent::Ended, listener, Some(&handle)));

        mic.fire(TrackEvent::Ended);
        cam.fire(TrackEvent::Muted);
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        cam.fire(TrackEvent::Ended);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn registration_without_handle_applies_to_next_handle() {
        let (hits, listener) = counter();
        let mut registry = ListenerRegistry::default();
        assert!(registry.add(TrackKind::Audio, TrackEvent::Muted, listener, None));

        let mic = FakeTrack::new("mic", TrackKind::Audio);
        let handle = StreamHandle::new(vec![mic.clone() as Arc<dyn MediaTrack>]);
        registry.attach(&handle);

        mic.fire(TrackEvent::Muted);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn duplicate_add_is_ignored_and_remove_detaches() {
        let mic = FakeTrack::new("mic", TrackKind::Audio);
        let handle = StreamHandle::new(vec![mic.clone() as Arc<dyn MediaTrack>]);
        let (hits, listener) = counter();

        let mut registry = ListenerRegistry::default();
        assert!(registry.add(TrackKind::Audio, TrackEvent::Ended, Arc::clone(&listener), Some(&handle)));
        assert!(!registry.add(TrackKind::Audio, TrackEvent::Ended, Arc::clone(&listener), Some(&handle)));
        assert_eq!(registry.len(), 1);

        mic.fire(TrackEvent::Ended);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(registry.remove(TrackKind::Audio, TrackEvent::Ended, &listener, Some(&handle)));
        assert_eq!(registry.len(), 0);
        mic.fire(TrackEvent::Ended);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn detach_releases_listeners_from_old_handle() {
        let cam = FakeTrack::new("cam", TrackKind::Video);
        let handle = StreamHandle::new(vec![cam.clone() as Arc<dyn MediaTrack>]);
        let (hits, listener) = counter();

        let mut registry = ListenerRegistry::default();
        registry.add(TrackKind::Video, TrackEvent::Muted, listener, Some(&handle));
        registry.detach(&handle);

        cam.fire(TrackEvent::Muted);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(registry.len(), 1);
    }
}
