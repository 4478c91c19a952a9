//! # capture-stream-core
//!
//! Platform-agnostic capture stream lifecycle.
//!
//! Coordinates acquisition of a single audio/video stream from a host capture
//! API, the devices the host exposes, mute state, and track end-of-life
//! events. Host backends implement the `CaptureHost` and `MediaTrack` traits
//! and plug into the generic `StreamController`.
//!
//! ## Architecture
//!
//! ```text
//! capture-stream-core (this crate)
//! ├── traits/    ← CaptureHost, MediaTrack, StreamDelegate
//! ├── models/    ← Constraints (+ deep merge), DeviceInfo, RequestState, StreamError, snapshot
//! └── session/   ← StreamController (lifecycle, acquisition, devices, mute), listener registry
//! ```

pub mod models;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::StreamConfig;
pub use models::constraints::{
    merge, AudioConstraints, AudioOverride, Constraints, ConstraintsOverride, FacingMode,
    FrameRate, FrameRateOverride, VideoConstraints, VideoOverride,
};
pub use models::device::{DeviceInfo, DeviceKind, DeviceLists};
pub use models::error::{ErrorCategory, ErrorRecord, StreamError};
pub use models::settings::{SelectedSettings, TrackSettings};
pub use models::snapshot::{HandleSummary, StreamSnapshot, TrackSummary};
pub use models::state::{LifecycleState, MuteState, RequestState};
pub use session::controller::{ConstraintsUpdate, StreamController, TrackSignal};
pub use session::handle::StreamHandle;
pub use traits::capture_host::CaptureHost;
pub use traits::media_track::{
    same_listener, MediaTrack, TrackEvent, TrackKind, TrackListener, TrackNotification,
};
pub use traits::stream_delegate::StreamDelegate;
