//! Simulated device catalog.
//!
//! Each entry pairs the `DeviceInfo` the host reports with the capabilities
//! used to resolve a stream request against it.

use capture_stream_core::models::constraints::{AudioConstraints, FacingMode, VideoConstraints};
use capture_stream_core::models::device::{DeviceInfo, DeviceKind};
use capture_stream_core::models::error::StreamError;
use capture_stream_core::models::settings::TrackSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct SimDevice {
    pub info: DeviceInfo,
    /// Largest resolution a camera can deliver.
    pub max_width: u32,
    pub max_height: u32,
    pub max_frame_rate: f64,
    pub facing_mode: Option<FacingMode>,
    /// Held by another application; requests for it fail as unreadable.
    pub busy: bool,
}

impl SimDevice {
    pub fn microphone(id: &str, label: &str) -> Self {
        Self::new(DeviceInfo::new(id, DeviceKind::AudioInput, label))
    }

    pub fn speaker(id: &str, label: &str) -> Self {
        Self::new(DeviceInfo::new(id, DeviceKind::AudioOutput, label))
    }

    pub fn camera(id: &str, label: &str, max_width: u32, max_height: u32, max_frame_rate: f64) -> Self {
        Self {
            max_width,
            max_height,
            max_frame_rate,
            facing_mode: Some(FacingMode::User),
            ..Self::new(DeviceInfo::new(id, DeviceKind::VideoInput, label))
        }
    }

    pub fn facing(mut self, mode: FacingMode) -> Self {
        self.facing_mode = Some(mode);
        self
    }

    pub fn busy(mut self) -> Self {
        self.busy = true;
        self
    }

    fn new(info: DeviceInfo) -> Self {
        Self {
            info,
            max_width: 0,
            max_height: 0,
            max_frame_rate: 0.0,
            facing_mode: None,
            busy: false,
        }
    }

    /// The info reported by enumeration, with the label hidden until permission.
    pub fn reported(&self, labels_visible: bool) -> DeviceInfo {
        let mut info = self.info.clone();
        if !labels_visible {
            info.label.clear();
        }
        info
    }
}

/// A default laptop-like catalog: one microphone, one speaker, one 1080p camera.
pub fn default_catalog() -> Vec<SimDevice> {
    vec![
        SimDevice::microphone("mic-builtin", "Built-in Microphone"),
        SimDevice::speaker("speaker-builtin", "Built-in Speakers"),
        SimDevice::camera("cam-builtin", "Built-in Camera", 1920, 1080, 60.0),
    ]
}

/// Pick the device of `kind` named by `device_id`, falling back to the first
/// device of that kind when the id is empty or unknown.
fn select<'a>(
    catalog: &'a [SimDevice],
    kind: DeviceKind,
    device_id: &str,
    prefer: impl Fn(&SimDevice) -> bool,
) -> Result<&'a SimDevice, StreamError> {
    let by_id = (!device_id.is_empty())
        .then(|| catalog.iter().find(|d| d.info.kind == kind && d.info.device_id == device_id))
        .flatten();
    let device = by_id
        .or_else(|| catalog.iter().find(|d| d.info.kind == kind && prefer(d)))
        .or_else(|| catalog.iter().find(|d| d.info.kind == kind))
        .ok_or(StreamError::DeviceNotFound)?;
    if device.busy {
        return Err(StreamError::DeviceNotReadable);
    }
    Ok(device)
}

pub(crate) fn resolve_audio<'a>(
    catalog: &'a [SimDevice],
    audio: &AudioConstraints,
) -> Result<(&'a SimDevice, TrackSettings), StreamError> {
    let device = select(catalog, DeviceKind::AudioInput, &audio.device_id, |_| false)?;
    Ok((device, TrackSettings::audio(device.info.device_id.clone())))
}

pub(crate) fn resolve_video<'a>(
    catalog: &'a [SimDevice],
    video: &VideoConstraints,
) -> Result<(&'a SimDevice, TrackSettings), StreamError> {
    let device = select(catalog, DeviceKind::VideoInput, &video.device_id, |d| {
        d.facing_mode == Some(video.facing_mode)
    })?;
    if video.frame_rate.min > device.max_frame_rate {
        return Err(StreamError::ConstraintsUnsatisfiable {
            constraint: "frameRate".into(),
        });
    }
    let frame_rate = video
        .frame_rate
        .max
        .map_or(video.frame_rate.ideal, |max| video.frame_rate.ideal.min(max))
        .min(device.max_frame_rate);
    let mut settings = TrackSettings::video(
        device.info.device_id.clone(),
        video.width.min(device.max_width),
        video.height.min(device.max_height),
        frame_rate,
    );
    settings.facing_mode = device.facing_mode;
    Ok((device, settings))
}
