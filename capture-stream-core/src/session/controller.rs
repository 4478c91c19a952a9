use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::models::config::StreamConfig;
use crate::models::constraints::{Constraints, ConstraintsOverride};
use crate::models::device::DeviceLists;
use crate::models::error::{ErrorRecord, StreamError};
use crate::models::settings::SelectedSettings;
use crate::models::snapshot::StreamSnapshot;
use crate::models::state::{LifecycleState, MuteState, RequestState};
use crate::session::handle::StreamHandle;
use crate::session::listeners::ListenerRegistry;
use crate::traits::capture_host::CaptureHost;
use crate::traits::media_track::{MediaTrack, TrackEvent, TrackKind, TrackListener};
use crate::traits::stream_delegate::StreamDelegate;

/// A track notification queued for the controller.
///
/// Carries the id of the handle whose observer produced it, so signals from
/// a released or superseded handle can be recognized and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSignal {
    pub handle_id: Uuid,
    pub track_id: String,
    pub kind: TrackKind,
    pub event: TrackEvent,
}

/// Arguments to [`StreamController::update_constraints`].
#[derive(Debug, Clone, Default)]
pub struct ConstraintsUpdate {
    pub constraints: ConstraintsOverride,
    /// Release and re-acquire the stream with the merged constraints.
    pub reset_stream: bool,
}

/// An internal observer attached to one track of the current handle.
pub(crate) struct ObserverBinding {
    pub(crate) track: Arc<dyn MediaTrack>,
    pub(crate) event: TrackEvent,
    pub(crate) listener: TrackListener,
}

pub(crate) enum Notice {
    Error(ErrorRecord),
    Devices(DeviceLists),
}

/// Internal mutable controller state, protected by `parking_lot::Mutex`.
pub(crate) struct ControllerState {
    pub(crate) handle: Option<StreamHandle>,
    pub(crate) observers: Vec<ObserverBinding>,
    pub(crate) streaming: bool,
    pub(crate) muted: MuteState,
    pub(crate) devices: DeviceLists,
    pub(crate) acquisition: RequestState,
    pub(crate) enumeration: RequestState,
    pub(crate) error: Option<ErrorRecord>,
    pub(crate) constraints: Constraints,
    pub(crate) listeners: ListenerRegistry,
    reported: LifecycleState,
    notices: Vec<Notice>,
}

impl ControllerState {
    fn new(constraints: Constraints) -> Self {
        Self {
            handle: None,
            observers: Vec::new(),
            streaming: false,
            muted: MuteState::default(),
            devices: DeviceLists::default(),
            acquisition: RequestState::Idle,
            enumeration: RequestState::Idle,
            error: None,
            constraints,
            listeners: ListenerRegistry::default(),
            reported: LifecycleState::Idle,
            notices: Vec::new(),
        }
    }

    pub(crate) fn lifecycle(&self) -> LifecycleState {
        LifecycleState::derive(self.acquisition, self.handle.is_some(), self.streaming)
    }

    pub(crate) fn record_error(&mut self, error: StreamError) {
        let record = ErrorRecord::new(error);
        log::warn!("recording stream error: {}", record.error);
        self.notices.push(Notice::Error(record.clone()));
        self.error = Some(record);
    }

    pub(crate) fn replace_devices(&mut self, devices: DeviceLists) {
        self.notices.push(Notice::Devices(devices.clone()));
        self.devices = devices;
    }

    /// Detach internal observers from the current handle's tracks.
    pub(crate) fn detach_observers(&mut self) {
        for binding in self.observers.drain(..) {
            binding.track.remove_listener(binding.event, &binding.listener);
        }
    }

    /// Detach every observer and stop every track of the current handle.
    ///
    /// Observers go first so a stopping track cannot report a stale `ended`.
    /// The streaming flag is left to the caller.
    pub(crate) fn release_handle(&mut self) -> Option<StreamHandle> {
        let handle = self.handle.take()?;
        self.detach_observers();
        self.listeners.detach(&handle);
        for track in handle.tracks() {
            track.stop();
        }
        log::info!("released stream {} ({} tracks)", handle.id(), handle.tracks().len());
        Some(handle)
    }

    fn apply_signal(&mut self, signal: &TrackSignal) -> bool {
        match &self.handle {
            Some(handle) if handle.id() == signal.handle_id => {}
            _ => {
                log::debug!(
                    "dropping stale {} signal from track {} of stream {}",
                    signal.event,
                    signal.track_id,
                    signal.handle_id
                );
                return false;
            }
        }
        match signal.event {
            TrackEvent::Ended => {
                log::info!("{} track {} ended", signal.kind, signal.track_id);
                self.streaming = false;
            }
            TrackEvent::Muted => {
                log::info!("{} track {} muted by host", signal.kind, signal.track_id);
                match signal.kind {
                    TrackKind::Audio => self.muted.audio = true,
                    TrackKind::Video => self.muted.video = true,
                }
            }
        }
        true
    }
}

/// Lifecycle controller for one capture stream.
///
/// Owns the single authoritative stream handle and everything derived from it:
/// the streaming flag, mute state, device lists, request states and the last
/// error. Async operations are serialized; a second `start()` issued while the
/// first is pending waits for it and then returns the same handle.
///
/// ```text
/// [constraints] → merge → acquire → [host] ─→ handle ─→ observers
///                                                          │
///           state ← dispatch_track_events ← signal queue ←─┘
/// ```
pub struct StreamController<H: CaptureHost> {
    pub(crate) host: H,
    pub(crate) state: Mutex<ControllerState>,
    pub(crate) op_lock: tokio::sync::Mutex<()>,
    pub(crate) signal_tx: mpsc::UnboundedSender<TrackSignal>,
    signal_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<TrackSignal>>,
    delegate: Option<Arc<dyn StreamDelegate>>,
}

impl<H: CaptureHost> StreamController<H> {
    pub fn new(host: H, config: StreamConfig) -> Result<Self, StreamError> {
        let constraints = config.resolve()?;
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        log::debug!("stream controller created with constraints {constraints:?}");
        Ok(Self {
            host,
            state: Mutex::new(ControllerState::new(constraints)),
            op_lock: tokio::sync::Mutex::new(()),
            signal_tx,
            signal_rx: tokio::sync::Mutex::new(signal_rx),
            delegate: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn StreamDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_supported(&self) -> bool {
        self.host.is_supported()
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.state.lock().lifecycle()
    }

    pub fn is_streaming(&self) -> bool {
        self.state.lock().streaming
    }

    pub fn handle(&self) -> Option<StreamHandle> {
        self.state.lock().handle.clone()
    }

    pub fn constraints(&self) -> Constraints {
        self.state.lock().constraints.clone()
    }

    pub fn snapshot(&self) -> StreamSnapshot {
        let s = self.state.lock();
        let settings = s
            .handle
            .as_ref()
            .map(|h| SelectedSettings {
                audio: h.first_settings(TrackKind::Audio),
                video: h.first_settings(TrackKind::Video),
            })
            .unwrap_or_default();
        StreamSnapshot {
            handle: s.handle.clone(),
            stream: s.handle.as_ref().map(StreamHandle::summary),
            is_supported: self.host.is_supported(),
            is_streaming: s.streaming,
            lifecycle: s.lifecycle(),
            muted: s.muted,
            devices: s.devices.clone(),
            settings,
            acquisition: s.acquisition,
            enumeration: s.enumeration,
            error: s.error.clone(),
            constraints: s.constraints.clone(),
        }
    }

    /// Start streaming.
    ///
    /// Returns the current handle unchanged if already active. A handle left
    /// over from device enumeration is reused when all of its tracks are still
    /// live; otherwise a new one is acquired with the stored constraints.
    pub async fn start(&self) -> Result<StreamHandle, StreamError> {
        let _op = self.op_lock.lock().await;
        self.drain_signals();

        let (existing, streaming) = {
            let s = self.state.lock();
            (s.handle.clone(), s.streaming)
        };

        let handle = match existing {
            Some(handle) if streaming => {
                log::debug!("start: stream {} already active", handle.id());
                return Ok(handle);
            }
            Some(handle) if handle.is_live() => {
                log::debug!("start: reusing stream {}", handle.id());
                handle
            }
            _ => {
                let constraints = self.constraints();
                let handle = self.acquire_locked(&constraints, true).await?;
                log::info!("streaming started on stream {}", handle.id());
                return Ok(handle);
            }
        };

        self.update(|s| s.streaming = true);
        log::info!("streaming started on stream {}", handle.id());
        Ok(handle)
    }

    /// Stop streaming and release the handle, if any.
    ///
    /// Always leaves the controller idle: not streaming, acquisition `Idle`,
    /// no recorded error.
    pub async fn stop(&self) {
        let _op = self.op_lock.lock().await;
        self.drain_signals();
        self.stop_locked();
    }

    /// Merge `update.constraints` into the stored constraints and optionally
    /// re-acquire the stream with the result.
    ///
    /// A reset keeps the streaming flag as it was before the reset. Returns
    /// the new handle when a reset happened.
    pub async fn update_constraints(
        &self,
        update: ConstraintsUpdate,
    ) -> Result<Option<StreamHandle>, StreamError> {
        let _op = self.op_lock.lock().await;
        self.drain_signals();

        let merged = self.state.lock().constraints.merged(&update.constraints);
        if let Err(e) = merged.validate() {
            self.update(|s| s.record_error(e.clone()));
            return Err(e);
        }
        log::debug!("constraints updated: {merged:?}");
        self.update(|s| s.constraints = merged.clone());

        if !update.reset_stream {
            return Ok(None);
        }

        let was_streaming = self.state.lock().streaming;
        self.stop_locked();
        let handle = self.acquire_locked(&merged, was_streaming).await?;
        log::info!(
            "stream reset with new constraints (streaming: {was_streaming}), now {}",
            handle.id()
        );
        Ok(Some(handle))
    }

    /// Apply all queued track signals. Returns how many were applied.
    ///
    /// Returns 0 without draining while another operation is in progress;
    /// that operation will drain the queue on its next entry point.
    pub fn dispatch_track_events(&self) -> usize {
        match self.op_lock.try_lock() {
            Ok(_op) => self.drain_signals(),
            Err(_) => 0,
        }
    }

    /// Wait for the next track signal and apply it.
    ///
    /// Intended for a driver loop; the signal is applied between operations,
    /// never in the middle of one.
    pub async fn next_track_event(&self) -> Option<TrackSignal> {
        let signal = self.signal_rx.lock().await.recv().await?;
        let _op = self.op_lock.lock().await;
        self.update(|s| s.apply_signal(&signal));
        Some(signal)
    }

    pub(crate) fn drain_signals(&self) -> usize {
        let Ok(mut rx) = self.signal_rx.try_lock() else {
            return 0;
        };
        let mut applied = 0;
        while let Ok(signal) = rx.try_recv() {
            if self.update(|s| s.apply_signal(&signal)) {
                applied += 1;
            }
        }
        applied
    }

    /// Release any held handle and return to a clean idle state.
    ///
    /// Returns whether a handle was released. The streaming flag, acquisition
    /// state and last error are reset either way.
    pub(crate) fn stop_locked(&self) -> bool {
        self.update(|s| {
            let released = s.release_handle().is_some();
            s.streaming = false;
            s.acquisition.reset();
            s.error = None;
            released
        })
    }

    /// Mutate state, then report lifecycle changes and queued notices to the
    /// delegate after the lock is released.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut ControllerState) -> R) -> R {
        let (result, changed, notices) = {
            let mut s = self.state.lock();
            let result = f(&mut *s);
            let now = s.lifecycle();
            let changed = (now != s.reported).then_some(now);
            s.reported = now;
            (result, changed, std::mem::take(&mut s.notices))
        };

        if let Some(ref delegate) = self.delegate {
            if let Some(state) = changed {
                delegate.on_lifecycle_changed(state);
            }
            for notice in &notices {
                match notice {
                    Notice::Error(record) => delegate.on_error(record),
                    Notice::Devices(devices) => delegate.on_devices_changed(devices),
                }
            }
        }
        if let Some(state) = changed {
            log::debug!("lifecycle -> {state:?}");
        }
        result
    }
}
