//! Device enumeration.

use crate::models::device::{DeviceInfo, DeviceLists};
use crate::models::error::StreamError;
use crate::session::controller::StreamController;
use crate::traits::capture_host::CaptureHost;

impl<H: CaptureHost> StreamController<H> {
    /// Enumerate devices and replace the stored device lists.
    ///
    /// Hosts only reveal labels once permission has been granted through a
    /// live stream, so a stream is acquired with the stored constraints when
    /// none is held. That acquisition does not start streaming.
    ///
    /// Failures are absorbed: the error is recorded and an empty list is
    /// returned. The previously stored list is kept on host failure.
    pub async fn enumerate_devices(&self) -> Vec<DeviceInfo> {
        let _op = self.op_lock.lock().await;
        self.drain_signals();

        if !self.host.is_supported() {
            log::warn!("device enumeration requested but capture is unsupported");
            self.update(|s| {
                if s.enumeration.begin() {
                    s.enumeration.settle(false);
                }
                s.replace_devices(DeviceLists::default());
                s.record_error(StreamError::Unsupported);
            });
            return Vec::new();
        }

        let began = self.update(|s| s.enumeration.begin());
        if !began {
            log::warn!("device enumeration already in progress");
            return Vec::new();
        }

        if self.state.lock().handle.is_none() {
            let constraints = self.constraints();
            log::debug!("no stream held; acquiring one to unlock device labels");
            if let Err(e) = self.acquire_locked(&constraints, false).await {
                log::warn!("enumerating without a stream, labels may be empty: {e}");
            }
        }

        match self.host.enumerate_devices().await {
            Ok(devices) => {
                log::info!("enumerated {} devices", devices.len());
                self.update(|s| {
                    s.replace_devices(DeviceLists::new(devices.clone()));
                    s.enumeration.settle(true);
                });
                devices
            }
            Err(e) => {
                let e = match e {
                    StreamError::EnumerationFailed(_) => e,
                    other => StreamError::EnumerationFailed(other.to_string()),
                };
                self.update(|s| {
                    s.enumeration.settle(false);
                    s.record_error(e);
                });
                Vec::new()
            }
        }
    }
}
