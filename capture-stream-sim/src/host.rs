//! In-process `CaptureHost` backed by a configurable device catalog.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use capture_stream_core::models::constraints::Constraints;
use capture_stream_core::models::device::DeviceInfo;
use capture_stream_core::models::error::StreamError;
use capture_stream_core::traits::capture_host::CaptureHost;
use capture_stream_core::traits::media_track::{MediaTrack, TrackKind};

use crate::devices::{self, SimDevice};
use crate::permissions::PermissionPolicy;
use crate::track::SimulatedTrack;

struct HostInner {
    supported: AtomicBool,
    catalog: Mutex<Vec<SimDevice>>,
    permission: Mutex<PermissionPolicy>,
    next_request_failure: Mutex<Option<StreamError>>,
    next_enumeration_failure: Mutex<Option<StreamError>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    tracks_per_kind: AtomicUsize,
    request_count: AtomicUsize,
    enumeration_count: AtomicUsize,
    requests: Mutex<Vec<Constraints>>,
    issued: Mutex<Vec<Arc<SimulatedTrack>>>,
}

/// Simulated host capture API.
///
/// Cloning shares the same host, so a test can hand one clone to the
/// controller and keep another to drive and inspect it.
///
/// Every issued track and every received constraint set is recorded for
/// inspection, so a long-lived host grows with each request. Call
/// [`SimulatedHost::clear_issued`] to drop that history.
#[derive(Clone)]
pub struct SimulatedHost {
    inner: Arc<HostInner>,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new(devices::default_catalog())
    }
}

impl SimulatedHost {
    pub fn new(catalog: Vec<SimDevice>) -> Self {
        Self {
            inner: Arc::new(HostInner {
                supported: AtomicBool::new(true),
                catalog: Mutex::new(catalog),
                permission: Mutex::new(PermissionPolicy::default()),
                next_request_failure: Mutex::new(None),
                next_enumeration_failure: Mutex::new(None),
                gate: Mutex::new(None),
                tracks_per_kind: AtomicUsize::new(1),
                request_count: AtomicUsize::new(0),
                enumeration_count: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                issued: Mutex::new(Vec::new()),
            }),
        }
    }

    /// A host without a capture API.
    pub fn unsupported() -> Self {
        let host = Self::default();
        host.set_supported(false);
        host
    }

    pub fn set_supported(&self, supported: bool) {
        self.inner.supported.store(supported, Ordering::SeqCst);
    }

    pub fn set_permission(&self, policy: PermissionPolicy) {
        *self.inner.permission.lock() = policy;
    }

    pub fn permission(&self) -> PermissionPolicy {
        *self.inner.permission.lock()
    }

    pub fn add_device(&self, device: SimDevice) {
        self.inner.catalog.lock().push(device);
    }

    pub fn remove_device(&self, device_id: &str) {
        self.inner
            .catalog
            .lock()
            .retain(|d| d.info.device_id != device_id);
    }

    /// Number of tracks issued for each requested kind (default 1).
    pub fn set_tracks_per_kind(&self, n: usize) {
        self.inner.tracks_per_kind.store(n, Ordering::SeqCst);
    }

    /// Fail the next stream request with `error`, after permission checks pass.
    pub fn fail_next_request(&self, error: StreamError) {
        *self.inner.next_request_failure.lock() = Some(error);
    }

    pub fn fail_next_enumeration(&self, error: StreamError) {
        *self.inner.next_enumeration_failure.lock() = Some(error);
    }

    /// Hold every subsequent stream request until released.
    pub fn hold_requests(&self) {
        *self.inner.gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `n` held requests proceed.
    pub fn release_requests(&self, n: usize) {
        if let Some(gate) = self.inner.gate.lock().as_ref() {
            gate.add_permits(n);
        }
    }

    /// Stop holding requests and release everything waiting.
    pub fn open_gate(&self) {
        if let Some(gate) = self.inner.gate.lock().take() {
            gate.close();
        }
    }

    pub fn request_count(&self) -> usize {
        self.inner.request_count.load(Ordering::SeqCst)
    }

    pub fn enumeration_count(&self) -> usize {
        self.inner.enumeration_count.load(Ordering::SeqCst)
    }

    /// Constraints received by every stream request, in order.
    pub fn requested_constraints(&self) -> Vec<Constraints> {
        self.inner.requests.lock().clone()
    }

    pub fn last_requested_constraints(&self) -> Option<Constraints> {
        self.inner.requests.lock().last().cloned()
    }

    /// Every track this host has handed out, in order of creation.
    pub fn issued_tracks(&self) -> Vec<Arc<SimulatedTrack>> {
        self.inner.issued.lock().clone()
    }

    pub fn issued_tracks_of(&self, kind: TrackKind) -> Vec<Arc<SimulatedTrack>> {
        self.inner
            .issued
            .lock()
            .iter()
            .filter(|t| t.kind() == kind)
            .cloned()
            .collect()
    }

    /// Forget the issued tracks and recorded constraints. Counters are kept.
    ///
    /// Tracks still held by a controller keep working; the host just stops
    /// referencing them.
    pub fn clear_issued(&self) {
        self.inner.issued.lock().clear();
        self.inner.requests.lock().clear();
    }

    /// Tracks handed out that have not ended or been stopped.
    pub fn live_tracks(&self) -> Vec<Arc<SimulatedTrack>> {
        self.inner
            .issued
            .lock()
            .iter()
            .filter(|t| t.is_live())
            .cloned()
            .collect()
    }

    async fn wait_at_gate(&self) {
        let gate = self.inner.gate.lock().clone();
        if let Some(gate) = gate {
            log::debug!("sim request held at gate");
            // A closed gate lets everything through.
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }

    fn build_tracks(&self, constraints: &Constraints) -> Result<Vec<Arc<SimulatedTrack>>, StreamError> {
        if !constraints.audio.enabled && !constraints.video.enabled {
            return Err(StreamError::AcquisitionFailed(
                "at least one of audio or video must be requested".into(),
            ));
        }

        let catalog = self.inner.catalog.lock();
        let per_kind = self.inner.tracks_per_kind.load(Ordering::SeqCst);
        let mut tracks = Vec::new();
        if constraints.audio.enabled {
            let (device, settings) = devices::resolve_audio(&catalog, &constraints.audio)?;
            for _ in 0..per_kind {
                tracks.push(SimulatedTrack::new(
                    TrackKind::Audio,
                    device.info.label.clone(),
                    settings.clone(),
                ));
            }
        }
        if constraints.video.enabled {
            let (device, settings) = devices::resolve_video(&catalog, &constraints.video)?;
            for _ in 0..per_kind {
                tracks.push(SimulatedTrack::new(
                    TrackKind::Video,
                    device.info.label.clone(),
                    settings.clone(),
                ));
            }
        }
        Ok(tracks)
    }
}

#[async_trait]
impl CaptureHost for SimulatedHost {
    fn is_supported(&self) -> bool {
        self.inner.supported.load(Ordering::SeqCst)
    }

    async fn request_stream(
        &self,
        constraints: &Constraints,
    ) -> Result<Vec<Arc<dyn MediaTrack>>, StreamError> {
        self.inner.request_count.fetch_add(1, Ordering::SeqCst);
        self.inner.requests.lock().push(constraints.clone());

        self.wait_at_gate().await;

        if !self.is_supported() {
            return Err(StreamError::Unsupported);
        }
        self.inner.permission.lock().request()?;
        if let Some(error) = self.inner.next_request_failure.lock().take() {
            log::debug!("sim request failing as scripted: {error}");
            return Err(error);
        }

        let tracks = self.build_tracks(constraints)?;
        self.inner.issued.lock().extend(tracks.iter().cloned());
        log::debug!("sim host issued {} tracks", tracks.len());
        Ok(tracks
            .into_iter()
            .map(|t| t as Arc<dyn MediaTrack>)
            .collect())
    }

    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, StreamError> {
        self.inner.enumeration_count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.inner.next_enumeration_failure.lock().take() {
            return Err(error);
        }
        let labels_visible = self.permission().labels_visible();
        Ok(self
            .inner
            .catalog
            .lock()
            .iter()
            .map(|d| d.reported(labels_visible))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use capture_stream_core::models::constraints::{ConstraintsOverride, VideoOverride};
    use capture_stream_core::models::device::DeviceKind;

    use super::*;

    #[tokio::test]
    async fn issues_one_track_per_enabled_kind() {
        let host = SimulatedHost::default();
        let tracks = host.request_stream(&Constraints::default()).await.unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].kind(), TrackKind::Audio);
        assert_eq!(tracks[1].kind(), TrackKind::Video);
        assert_eq!(host.request_count(), 1);
        assert_eq!(host.live_tracks().len(), 2);
    }

    #[tokio::test]
    async fn audio_only_request() {
        let host = SimulatedHost::default();
        let constraints = Constraints::from_override(&ConstraintsOverride::default().with_video(
            VideoOverride {
                enabled: Some(false),
                ..Default::default()
            },
        ));
        let tracks = host.request_stream(&constraints).await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].kind(), TrackKind::Audio);
    }

    #[tokio::test]
    async fn labels_appear_after_first_grant() {
        let host = SimulatedHost::default();
        let before = host.enumerate_devices().await.unwrap();
        assert!(before.iter().all(|d| d.label.is_empty()));

        host.request_stream(&Constraints::default()).await.unwrap();
        let after = host.enumerate_devices().await.unwrap();
        assert!(after.iter().all(|d| !d.label.is_empty()));
        assert_eq!(after.iter().filter(|d| d.kind == DeviceKind::AudioOutput).count(), 1);
        assert_eq!(host.enumeration_count(), 2);
    }

    #[tokio::test]
    async fn denied_permission_fails_request() {
        let host = SimulatedHost::default();
        host.set_permission(PermissionPolicy::Denied);
        let err = host.request_stream(&Constraints::default()).await.unwrap_err();
        assert_eq!(err, StreamError::PermissionDenied);
        assert!(host.issued_tracks().is_empty());
    }

    #[tokio::test]
    async fn scripted_failures_are_one_shot() {
        let host = SimulatedHost::default();
        host.fail_next_request(StreamError::DeviceNotReadable);
        host.fail_next_enumeration(StreamError::EnumerationFailed("boom".into()));

        assert!(host.request_stream(&Constraints::default()).await.is_err());
        assert!(host.request_stream(&Constraints::default()).await.is_ok());
        assert!(host.enumerate_devices().await.is_err());
        assert!(host.enumerate_devices().await.is_ok());
    }

    #[tokio::test]
    async fn removed_camera_is_not_found() {
        let host = SimulatedHost::default();
        host.remove_device("cam-builtin");
        let err = host.request_stream(&Constraints::default()).await.unwrap_err();
        assert_eq!(err, StreamError::DeviceNotFound);
    }

    #[tokio::test]
    async fn clear_issued_drops_history_but_not_counters() {
        let host = SimulatedHost::default();
        let tracks = host.request_stream(&Constraints::default()).await.unwrap();
        host.clear_issued();

        assert!(host.issued_tracks().is_empty());
        assert!(host.last_requested_constraints().is_none());
        assert_eq!(host.request_count(), 1);
        assert!(tracks.iter().all(|t| t.is_live()));
    }

    #[tokio::test]
    async fn records_requested_constraints() {
        let host = SimulatedHost::default();
        let constraints = Constraints::from_override(&ConstraintsOverride::default().with_video(
            VideoOverride {
                width: Some(640),
                ..Default::default()
            },
        ));
        host.request_stream(&constraints).await.unwrap();
        assert_eq!(host.last_requested_constraints().unwrap().video.width, 640);
        assert_eq!(host.requested_constraints().len(), 1);
    }
}
