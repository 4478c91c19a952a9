use serde::{Deserialize, Serialize};

/// Kind of media device reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    AudioInput,
    AudioOutput,
    VideoInput,
}

/// A device available to the host capture API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub device_id: String,
    pub kind: DeviceKind,
    /// Empty until the host has granted capture permission.
    pub label: String,
    #[serde(default)]
    pub group_id: String,
}

impl DeviceInfo {
    pub fn new(device_id: impl Into<String>, kind: DeviceKind, label: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            kind,
            label: label.into(),
            group_id: String::new(),
        }
    }
}

/// The most recent enumeration result, replaced wholesale on every success.
///
/// The per-kind views are derived from `all` and never edited on their own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceLists {
    all: Vec<DeviceInfo>,
}

impl DeviceLists {
    pub fn new(all: Vec<DeviceInfo>) -> Self {
        Self { all }
    }

    pub fn all(&self) -> &[DeviceInfo] {
        &self.all
    }

    pub fn of_kind(&self, kind: DeviceKind) -> impl Iterator<Item = &DeviceInfo> {
        self.all.iter().filter(move |d| d.kind == kind)
    }

    pub fn audio_inputs(&self) -> Vec<DeviceInfo> {
        self.of_kind(DeviceKind::AudioInput).cloned().collect()
    }

    pub fn audio_outputs(&self) -> Vec<DeviceInfo> {
        self.of_kind(DeviceKind::AudioOutput).cloned().collect()
    }

    pub fn video_inputs(&self) -> Vec<DeviceInfo> {
        self.of_kind(DeviceKind::VideoInput).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_by_kind() {
        let lists = DeviceLists::new(vec![
            DeviceInfo::new("mic-1", DeviceKind::AudioInput, "Built-in Mic"),
            DeviceInfo::new("cam-1", DeviceKind::VideoInput, "FaceTime HD"),
            DeviceInfo::new("spk-1", DeviceKind::AudioOutput, "Speakers"),
            DeviceInfo::new("mic-2", DeviceKind::AudioInput, "USB Mic"),
        ]);

        assert_eq!(lists.len(), 4);
        let mics: Vec<_> = lists.audio_inputs().into_iter().map(|d| d.device_id).collect();
        assert_eq!(mics, ["mic-1", "mic-2"]);
        assert_eq!(lists.audio_outputs().len(), 1);
        assert_eq!(lists.video_inputs()[0].label, "FaceTime HD");
    }

    #[test]
    fn empty_lists_have_empty_views() {
        let lists = DeviceLists::default();
        assert!(lists.is_empty());
        assert!(lists.audio_inputs().is_empty());
        assert!(lists.video_inputs().is_empty());
    }
}
