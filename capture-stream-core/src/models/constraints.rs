use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::StreamError;

/// Which camera a video request prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    #[default]
    User,
    Environment,
    Left,
    Right,
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Environment => "environment",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(name)
    }
}

/// Frame rate request in frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRate {
    pub ideal: f64,
    pub min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Default for FrameRate {
    fn default() -> Self {
        Self {
            ideal: 60.0,
            min: 10.0,
            max: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConstraints {
    /// `false` requests no audio tracks at all.
    pub enabled: bool,
    /// Empty string lets the host pick its default input.
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo_cancellation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_suppression: Option<bool>,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            enabled: true,
            device_id: String::new(),
            echo_cancellation: None,
            noise_suppression: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    /// `false` requests no video tracks at all.
    pub enabled: bool,
    pub device_id: String,
    pub facing_mode: FacingMode,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
    pub frame_rate: FrameRate,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            enabled: true,
            device_id: String::new(),
            facing_mode: FacingMode::User,
            width: 1280,
            height: 720,
            aspect_ratio: None,
            frame_rate: FrameRate::default(),
        }
    }
}

/// Complete configuration submitted to the host on acquisition.
///
/// A value of this type is an immutable snapshot: updates produce a new
/// `Constraints` through [`Constraints::merged`] rather than editing in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    pub audio: AudioConstraints,
    pub video: VideoConstraints,
}

impl Constraints {
    /// Defaults with `overrides` merged on top.
    pub fn from_override(overrides: &ConstraintsOverride) -> Self {
        merge(&Self::default(), overrides)
    }

    /// Deep merge of `overrides` onto `self`. See [`merge`].
    pub fn merged(&self, overrides: &ConstraintsOverride) -> Self {
        merge(self, overrides)
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        let video = &self.video;
        if !video.enabled {
            return Ok(());
        }
        if video.width == 0 || video.height == 0 {
            return Err(StreamError::InvalidConstraints(format!(
                "video resolution must be non-zero, got {}x{}",
                video.width, video.height
            )));
        }
        if let Some(ratio) = video.aspect_ratio {
            if !(ratio.is_finite() && ratio > 0.0) {
                return Err(StreamError::InvalidConstraints(format!(
                    "aspect ratio must be positive, got {ratio}"
                )));
            }
        }
        let rate = &video.frame_rate;
        if !(rate.min > 0.0 && rate.ideal > 0.0) {
            return Err(StreamError::InvalidConstraints(
                "frame rates must be positive".into(),
            ));
        }
        if rate.min > rate.ideal {
            return Err(StreamError::InvalidConstraints(format!(
                "frame rate min {} exceeds ideal {}",
                rate.min, rate.ideal
            )));
        }
        if let Some(max) = rate.max {
            if rate.ideal > max {
                return Err(StreamError::InvalidConstraints(format!(
                    "frame rate ideal {} exceeds max {max}",
                    rate.ideal
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FrameRateOverride {
    pub ideal: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AudioOverride {
    pub enabled: Option<bool>,
    pub device_id: Option<String>,
    pub echo_cancellation: Option<bool>,
    pub noise_suppression: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct VideoOverride {
    pub enabled: Option<bool>,
    pub device_id: Option<String>,
    pub facing_mode: Option<FacingMode>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub aspect_ratio: Option<f64>,
    pub frame_rate: Option<FrameRateOverride>,
}

/// Partial constraints supplied by a caller. Absent fields inherit from the base.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ConstraintsOverride {
    pub audio: Option<AudioOverride>,
    pub video: Option<VideoOverride>,
}

impl ConstraintsOverride {
    pub fn from_json_str(json: &str) -> Result<Self, StreamError> {
        serde_json::from_str(json)
            .map_err(|e| StreamError::Config(format!("invalid constraints JSON: {e}")))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StreamError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    pub fn with_audio(mut self, audio: AudioOverride) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_video(mut self, video: VideoOverride) -> Self {
        self.video = Some(video);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_none() && self.video.is_none()
    }
}

fn pick<T: Clone>(base: &T, over: &Option<T>) -> T {
    over.as_ref().unwrap_or(base).clone()
}

fn pick_opt<T: Clone>(base: &Option<T>, over: &Option<T>) -> Option<T> {
    over.as_ref().or(base.as_ref()).cloned()
}

fn merge_frame_rate(base: &FrameRate, over: &FrameRateOverride) -> FrameRate {
    FrameRate {
        ideal: pick(&base.ideal, &over.ideal),
        min: pick(&base.min, &over.min),
        max: pick_opt(&base.max, &over.max),
    }
}

fn merge_audio(base: &AudioConstraints, over: &AudioOverride) -> AudioConstraints {
    AudioConstraints {
        enabled: pick(&base.enabled, &over.enabled),
        device_id: pick(&base.device_id, &over.device_id),
        echo_cancellation: pick_opt(&base.echo_cancellation, &over.echo_cancellation),
        noise_suppression: pick_opt(&base.noise_suppression, &over.noise_suppression),
    }
}

fn merge_video(base: &VideoConstraints, over: &VideoOverride) -> VideoConstraints {
    VideoConstraints {
        enabled: pick(&base.enabled, &over.enabled),
        device_id: pick(&base.device_id, &over.device_id),
        facing_mode: pick(&base.facing_mode, &over.facing_mode),
        width: pick(&base.width, &over.width),
        height: pick(&base.height, &over.height),
        aspect_ratio: pick_opt(&base.aspect_ratio, &over.aspect_ratio),
        frame_rate: match &over.frame_rate {
            Some(rate) => merge_frame_rate(&base.frame_rate, rate),
            None => base.frame_rate,
        },
    }
}

/// Deep-merge `overrides` onto `base`.
///
/// Every leaf present in `overrides` replaces the matching leaf of `base`;
/// absent leaves are inherited. Nested objects merge field by field, never
/// as whole-object replacement.
pub fn merge(base: &Constraints, overrides: &ConstraintsOverride) -> Constraints {
    Constraints {
        audio: match &overrides.audio {
            Some(audio) => merge_audio(&base.audio, audio),
            None => base.audio.clone(),
        },
        video: match &overrides.video {
            Some(video) => merge_video(&base.video, video),
            None => base.video.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn width_override(width: u32) -> ConstraintsOverride {
        ConstraintsOverride::default().with_video(VideoOverride {
            width: Some(width),
            ..Default::default()
        })
    }

    #[test]
    fn defaults_match_documented_values() {
        let c = Constraints::default();
        assert_eq!(c.audio.device_id, "");
        assert_eq!(c.video.device_id, "");
        assert_eq!(c.video.facing_mode, FacingMode::User);
        assert_eq!((c.video.width, c.video.height), (1280, 720));
        assert_eq!(c.video.frame_rate.ideal, 60.0);
        assert_eq!(c.video.frame_rate.min, 10.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_override_is_identity() {
        let base = Constraints::default();
        assert_eq!(merge(&base, &ConstraintsOverride::default()), base);
    }

    #[test]
    fn leaf_override_keeps_siblings() {
        let base = Constraints::default();
        let merged = merge(&base, &width_override(640));

        assert_eq!(merged.video.width, 640);
        assert_eq!(merged.video.height, base.video.height);
        assert_eq!(merged.video.facing_mode, base.video.facing_mode);
        assert_eq!(merged.video.frame_rate, base.video.frame_rate);
        assert_eq!(merged.audio, base.audio);
    }

    #[test]
    fn nested_frame_rate_merges_independently() {
        let base = Constraints::default();
        let overrides = ConstraintsOverride::default().with_video(VideoOverride {
            frame_rate: Some(FrameRateOverride {
                min: Some(24.0),
                ..Default::default()
            }),
            ..Default::default()
        });

        let merged = merge(&base, &overrides);
        assert_eq!(merged.video.frame_rate.min, 24.0);
        assert_eq!(merged.video.frame_rate.ideal, 60.0);
        assert_eq!(merged.video.frame_rate.max, None);
    }

    #[test]
    fn override_only_fields_are_added() {
        let base = Constraints::default();
        let overrides = ConstraintsOverride::default()
            .with_audio(AudioOverride {
                echo_cancellation: Some(true),
                ..Default::default()
            })
            .with_video(VideoOverride {
                aspect_ratio: Some(16.0 / 9.0),
                ..Default::default()
            });

        let merged = merge(&base, &overrides);
        assert_eq!(merged.audio.echo_cancellation, Some(true));
        assert_eq!(merged.audio.noise_suppression, None);
        assert_eq!(merged.video.aspect_ratio, Some(16.0 / 9.0));
    }

    #[test]
    fn successive_merges_accumulate() {
        let first = merge(&Constraints::default(), &width_override(640));
        let overrides = ConstraintsOverride::default().with_video(VideoOverride {
            height: Some(480),
            ..Default::default()
        });
        let second = first.merged(&overrides);

        assert_eq!((second.video.width, second.video.height), (640, 480));
        assert_eq!((first.video.width, first.video.height), (640, 720));
    }

    #[test]
    fn parses_camel_case_json() {
        let json = r#"{
            "audio": { "deviceId": "mic-2" },
            "video": { "facingMode": "environment", "frameRate": { "ideal": 30 } }
        }"#;
        let overrides = ConstraintsOverride::from_json_str(json).unwrap();
        let c = Constraints::from_override(&overrides);

        assert_eq!(c.audio.device_id, "mic-2");
        assert_eq!(c.video.facing_mode, FacingMode::Environment);
        assert_eq!(c.video.frame_rate.ideal, 30.0);
        assert_eq!(c.video.frame_rate.min, 10.0);
        assert_eq!(c.video.width, 1280);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = ConstraintsOverride::from_json_str(r#"{ "video": { "widht": 640 } }"#)
            .unwrap_err();
        assert!(matches!(err, StreamError::Config(_)));
    }

    #[test]
    fn validate_rejects_inverted_frame_rate() {
        let overrides = ConstraintsOverride::default().with_video(VideoOverride {
            frame_rate: Some(FrameRateOverride {
                min: Some(90.0),
                ..Default::default()
            }),
            ..Default::default()
        });
        let c = Constraints::from_override(&overrides);
        assert!(matches!(c.validate(), Err(StreamError::InvalidConstraints(_))));
    }

    #[test]
    fn validate_ignores_disabled_video() {
        let overrides = ConstraintsOverride::default().with_video(VideoOverride {
            enabled: Some(false),
            width: Some(0),
            ..Default::default()
        });
        assert!(Constraints::from_override(&overrides).validate().is_ok());
    }
}
