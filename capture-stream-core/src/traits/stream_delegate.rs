use crate::models::device::DeviceLists;
use crate::models::error::ErrorRecord;
use crate::models::state::LifecycleState;

/// Event delegate for stream controller notifications.
///
/// Called synchronously from whichever task drives the controller, after
/// internal state has been updated. Implementations must not call back into
/// the controller's async operations.
pub trait StreamDelegate: Send + Sync {
    /// Called when the derived lifecycle state changes.
    fn on_lifecycle_changed(&self, state: LifecycleState);

    /// Called whenever a failure is recorded.
    fn on_error(&self, error: &ErrorRecord);

    /// Called whenever the stored device list is replaced: after a successful
    /// enumeration, or with an empty list when capture is unsupported.
    fn on_devices_changed(&self, _devices: &DeviceLists) {}
}
