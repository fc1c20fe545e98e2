//! Editor settings, loaded from TOML.

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use softarm_ir::Rgb;
use softarm_kinematics::{MarkerSampling, DEFAULT_CONNECTING_OFFSET};

use crate::error::{EditorError, Result};

/// Editor parameters.
///
/// Every key is optional in a settings file; missing keys take their
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Height of a newly added joint.
    pub default_height: f64,
    /// Radius of a newly added joint.
    pub default_radius: f64,
    /// Color of a newly added joint.
    pub default_color: Rgb,
    /// Bend components are clamped to `[-bend_limit, bend_limit]`.
    pub bend_limit: f64,
    /// Smallest height accepted by a size edit.
    pub min_height: f64,
    /// Largest height accepted by a size edit.
    pub max_height: f64,
    /// Length of the straight connector between successive joints.
    pub connecting_offset: f64,
    /// Where markers are sampled along each joint.
    pub marker_sampling: MarkerSampling,
    /// Pause between animated macro steps (ms).
    pub macro_step_delay_ms: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            default_height: 5.0,
            default_radius: 1.0,
            default_color: Rgb::default(),
            bend_limit: 1.6,
            min_height: 0.5,
            max_height: 100.0,
            connecting_offset: DEFAULT_CONNECTING_OFFSET,
            marker_sampling: MarkerSampling::Legacy,
            macro_step_delay_ms: 50,
        }
    }
}

impl EditorSettings {
    /// Parse settings from TOML text and validate them.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(text).map_err(|e| EditorError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("loading settings from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EditorError::Settings(e.to_string()))
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !positive(self.default_height) {
            return Err(EditorError::Settings(
                "default_height must be positive".into(),
            ));
        }
        if !positive(self.default_radius) {
            return Err(EditorError::Settings(
                "default_radius must be positive".into(),
            ));
        }
        if !positive(self.bend_limit) {
            return Err(EditorError::Settings("bend_limit must be positive".into()));
        }
        if !positive(self.min_height) || self.min_height > self.max_height {
            return Err(EditorError::Settings(
                "min_height must be positive and not above max_height".into(),
            ));
        }
        if !self.connecting_offset.is_finite() {
            return Err(EditorError::Settings(
                "connecting_offset must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Clamp a bend component to the configured limit.
    pub fn clamp_bend(&self, value: f64) -> f64 {
        value.clamp(-self.bend_limit, self.bend_limit)
    }

    /// Whether `height` is within the accepted range.
    pub fn height_in_range(&self, height: f64) -> bool {
        (self.min_height..=self.max_height).contains(&height)
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
