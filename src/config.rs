use serde::{Deserialize, Serialize};

use crate::controls::ControlState;
use crate::error::ConfigError;

/// Startup options for the demo. Every field has a default, so `{}` is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DemoConfig {
    pub canvas_id: String,
    pub clear_color: [f32; 4],
    pub camera_eye: [f32; 3],
    pub camera_target: [f32; 3],
    /// Fixed seed for the noise volume; random when absent.
    pub noise_seed: Option<u64>,
    pub log_level: log::Level,
    pub controls: ControlState,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            canvas_id: "c".to_owned(),
            clear_color: [0.2, 0.2, 0.2, 1.0],
            camera_eye: [0.0, 0.0, 5.0],
            camera_target: [0.0, 0.0, 0.0],
            noise_seed: None,
            log_level: log::Level::Info,
            controls: ControlState::default(),
        }
    }
}

impl DemoConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }
}
