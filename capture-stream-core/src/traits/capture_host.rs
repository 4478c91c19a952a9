use std::sync::Arc;

use async_trait::async_trait;

use crate::models::constraints::Constraints;
use crate::models::device::DeviceInfo;
use crate::models::error::StreamError;
use crate::traits::media_track::MediaTrack;

/// Host-provided capture API.
///
/// Implemented by:
/// - `SimulatedHost` (capture-stream-sim)
/// - Platform backends wrapping a real device API
#[async_trait]
pub trait CaptureHost: Send + Sync {
    /// Whether the capture API exists in this environment at all.
    fn is_supported(&self) -> bool;

    /// Acquire a new stream honoring `constraints`.
    ///
    /// Failures should use the specific `StreamError` variants
    /// (`PermissionDenied`, `DeviceNotFound`, `DeviceNotReadable`,
    /// `ConstraintsUnsatisfiable`) when the host can classify them.
    async fn request_stream(
        &self,
        constraints: &Constraints,
    ) -> Result<Vec<Arc<dyn MediaTrack>>, StreamError>;

    /// List devices. Labels may be empty until permission has been granted.
    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, StreamError>;
}

#[async_trait]
impl<T: CaptureHost + ?Sized> CaptureHost for Arc<T> {
    fn is_supported(&self) -> bool {
        (**self).is_supported()
    }

    async fn request_stream(
        &self,
        constraints: &Constraints,
    ) -> Result<Vec<Arc<dyn MediaTrack>>, StreamError> {
        (**self).request_stream(constraints).await
    }

    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, StreamError> {
        (**self).enumerate_devices().await
    }
}
