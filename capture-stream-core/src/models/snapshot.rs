use serde::Serialize;
use uuid::Uuid;

use super::constraints::Constraints;
use super::device::{DeviceInfo, DeviceLists};
use super::error::ErrorRecord;
use super::settings::SelectedSettings;
use super::state::{LifecycleState, MuteState, RequestState};
use crate::session::handle::StreamHandle;
use crate::traits::media_track::TrackKind;

/// Serializable description of one track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackSummary {
    pub id: String,
    pub kind: TrackKind,
    pub label: String,
    pub enabled: bool,
    pub live: bool,
}

/// Serializable description of a stream handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandleSummary {
    pub id: Uuid,
    pub tracks: Vec<TrackSummary>,
}

/// Read-only view of the controller handed to external consumers.
#[derive(Debug, Clone, Serialize)]
pub struct StreamSnapshot {
    #[serde(skip)]
    pub handle: Option<StreamHandle>,
    pub stream: Option<HandleSummary>,
    pub is_supported: bool,
    pub is_streaming: bool,
    pub lifecycle: LifecycleState,
    pub muted: MuteState,
    pub devices: DeviceLists,
    pub settings: SelectedSettings,
    pub acquisition: RequestState,
    pub enumeration: RequestState,
    pub error: Option<ErrorRecord>,
    pub constraints: Constraints,
}

impl StreamSnapshot {
    pub fn audio_inputs(&self) -> Vec<DeviceInfo> {
        self.devices.audio_inputs()
    }

    pub fn audio_outputs(&self) -> Vec<DeviceInfo> {
        self.devices.audio_outputs()
    }

    pub fn video_inputs(&self) -> Vec<DeviceInfo> {
        self.devices.video_inputs()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
