use serde::{Deserialize, Serialize};

use super::constraints::FacingMode;

/// Settings actually applied by the host to one track.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSettings {
    pub device_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub aspect_ratio: Option<f64>,
    pub frame_rate: Option<f64>,
    pub facing_mode: Option<FacingMode>,
}

impl TrackSettings {
    pub fn audio(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            ..Default::default()
        }
    }

    pub fn video(device_id: impl Into<String>, width: u32, height: u32, frame_rate: f64) -> Self {
        Self {
            device_id: device_id.into(),
            width: Some(width),
            height: Some(height),
            aspect_ratio: (height > 0).then(|| f64::from(width) / f64::from(height)),
            frame_rate: Some(frame_rate),
            facing_mode: None,
        }
    }
}

/// Settings of the first audio and first video track of the current handle.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SelectedSettings {
    pub audio: Option<TrackSettings>,
    pub video: Option<TrackSettings>,
}

impl SelectedSettings {
    pub fn audio_device_id(&self) -> Option<&str> {
        self.audio.as_ref().map(|s| s.device_id.as_str())
    }

    pub fn video_device_id(&self) -> Option<&str> {
        self.video.as_ref().map(|s| s.device_id.as_str())
    }

    pub fn width(&self) -> Option<u32> {
        self.video.as_ref().and_then(|s| s.width)
    }

    pub fn height(&self) -> Option<u32> {
        self.video.as_ref().and_then(|s| s.height)
    }

    pub fn aspect_ratio(&self) -> Option<f64> {
        self.video.as_ref().and_then(|s| s.aspect_ratio)
    }
}
