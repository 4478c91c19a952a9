use std::path::Path;

use serde::{Deserialize, Serialize};

use super::constraints::{Constraints, ConstraintsOverride};
use super::error::StreamError;

/// Construction-time configuration for a `StreamController`.
///
/// Recognized constraint fields and their defaults:
/// - `audio.deviceId` = `""`
/// - `video.facingMode` = `"user"`
/// - `video.width` = `1280`, `video.height` = `720`
/// - `video.frameRate` = `{ ideal: 60, min: 10 }`
/// - `video.deviceId` = `""`
///
/// The merged result must satisfy `frameRate.min <= ideal <= max`. Lowering
/// only `ideal` below the default `min` of 10 is rejected; set `min` as well.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct StreamConfig {
    /// Overrides applied on top of the default constraints.
    pub constraints: ConstraintsOverride,
}

impl StreamConfig {
    pub fn with_constraints(constraints: ConstraintsOverride) -> Self {
        Self { constraints }
    }

    pub fn from_json_str(json: &str) -> Result<Self, StreamError> {
        serde_json::from_str(json)
            .map_err(|e| StreamError::Config(format!("invalid stream config: {e}")))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StreamError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    /// Defaults merged with the configured overrides, validated.
    pub fn resolve(&self) -> Result<Constraints, StreamError> {
        let constraints = Constraints::from_override(&self.constraints);
        constraints.validate()?;
        Ok(constraints)
    }
}
