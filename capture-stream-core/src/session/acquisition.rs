//! Stream acquisition: host request, observer wiring, request-state bookkeeping.

use std::sync::Arc;

use crate::models::constraints::Constraints;
use crate::models::error::StreamError;
use crate::session::controller::{ObserverBinding, StreamController, TrackSignal};
use crate::session::handle::StreamHandle;
use crate::traits::capture_host::CaptureHost;
use crate::traits::media_track::{TrackEvent, TrackKind, TrackListener, TrackNotification};

impl<H: CaptureHost> StreamController<H> {
    /// Acquire a new stream with `constraints`.
    ///
    /// Any handle currently held is released first. Failures are recorded in
    /// state (request state `Rejected`, last error) and returned to the caller.
    /// The controller is left not streaming, whether or not it was before.
    pub async fn acquire(&self, constraints: &Constraints) -> Result<StreamHandle, StreamError> {
        let _op = self.op_lock.lock().await;
        self.drain_signals();
        self.acquire_locked(constraints, false).await
    }

    /// Acquisition body; the caller holds the operation lock.
    ///
    /// `streaming` is stored together with the new handle, so a successful
    /// `start()` moves straight from `Acquiring` to `Active`.
    pub(crate) async fn acquire_locked(
        &self,
        constraints: &Constraints,
        streaming: bool,
    ) -> Result<StreamHandle, StreamError> {
        let began = self.update(|s| {
            if let Some(old) = s.release_handle() {
                log::debug!("superseding stream {} before acquiring", old.id());
            }
            s.streaming = false;
            s.acquisition.begin()
        });
        if !began {
            return Err(StreamError::AcquisitionFailed(
                "an acquisition is already in progress".into(),
            ));
        }

        if !self.host.is_supported() {
            self.update(|s| {
                s.acquisition.settle(false);
                s.record_error(StreamError::Unsupported);
            });
            return Err(StreamError::Unsupported);
        }

        log::debug!("requesting stream from host");
        match self.host.request_stream(constraints).await {
            Ok(tracks) => {
                let handle = StreamHandle::new(tracks);
                let observers = self.observe(&handle);
                self.update(|s| {
                    // New tracks start enabled; carry the mute flags over.
                    for track in handle.tracks() {
                        let muted = match track.kind() {
                            TrackKind::Audio => s.muted.audio,
                            TrackKind::Video => s.muted.video,
                        };
                        if muted {
                            track.set_enabled(false);
                        }
                    }
                    s.listeners.attach(&handle);
                    s.observers = observers;
                    s.handle = Some(handle.clone());
                    s.streaming = streaming;
                    s.acquisition.settle(true);
                });
                log::info!(
                    "acquired stream {} ({} audio, {} video tracks)",
                    handle.id(),
                    handle.audio_tracks().count(),
                    handle.video_tracks().count()
                );
                Ok(handle)
            }
            Err(e) => {
                log::error!("stream acquisition failed: {e}");
                self.update(|s| {
                    s.acquisition.settle(false);
                    s.record_error(e.clone());
                });
                Err(e)
            }
        }
    }

    /// Attach the internal `ended` and `muted` observers to every track.
    fn observe(&self, handle: &StreamHandle) -> Vec<ObserverBinding> {
        let mut bindings = Vec::with_capacity(handle.tracks().len() * 2);
        for event in [TrackEvent::Ended, TrackEvent::Muted] {
            let listener = self.signal_listener(handle, event);
            for track in handle.tracks() {
                track.add_listener(event, Arc::clone(&listener));
                bindings.push(ObserverBinding {
                    track: Arc::clone(track),
                    event,
                    listener: Arc::clone(&listener),
                });
            }
        }
        bindings
    }

    fn signal_listener(&self, handle: &StreamHandle, event: TrackEvent) -> TrackListener {
        let tx = self.signal_tx.clone();
        let handle_id = handle.id();
        Arc::new(move |note: &TrackNotification| {
            let signal = TrackSignal {
                handle_id,
                track_id: note.track_id.clone(),
                kind: note.kind,
                event,
            };
            if tx.send(signal).is_err() {
                log::debug!("controller gone; dropping {event} from track {}", note.track_id);
            }
        })
    }
}
