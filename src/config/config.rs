use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Thresholds for the geometric action-unit ratios.
///
/// Ratios are normalized by the face box width or height, so the values are
/// independent of the distance to the camera.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ActionUnitConfig {
    /// AU12, lip corner spread over box width. Neutral spread 0.32 plus a 0.09 smile margin.
    pub lip_corner_puller: f64,
    /// AU5, eyelid opening over box height.
    pub upper_lid_raiser: f64,
    /// AU26, inner lip gap over box height. Neutral gap sits near 0.03.
    pub jaw_drop: f64,
    /// AU4, inner brow gap over box width. Flag is set below this value; neutral sits near 0.17.
    pub brow_lowerer: f64,
}

impl ActionUnitConfig {
    pub fn new() -> Self {
        ActionUnitConfig {
            lip_corner_puller: 0.41,
            upper_lid_raiser: 0.05,
            jaw_drop: 0.055,
            brow_lowerer: 0.14,
        }
    }
}

impl Default for ActionUnitConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FaceDetectionConfig {
    pub cascade_path: PathBuf,
    pub scale_factor: f64,
    pub min_neighbors: i32,
    pub min_face_size: i32,
}

impl FaceDetectionConfig {
    pub fn new() -> Self {
        FaceDetectionConfig {
            cascade_path: PathBuf::from("haarcascade_frontalface_default.xml"),
            scale_factor: 1.1,
            min_neighbors: 3,
            min_face_size: 30,
        }
    }
}

impl Default for FaceDetectionConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FaceLandmarkConfig {
    pub model_path: PathBuf,
}

impl FaceLandmarkConfig {
    pub fn new() -> Self {
        FaceLandmarkConfig {
            model_path: PathBuf::from("lbfmodel.yaml"),
        }
    }
}

impl Default for FaceLandmarkConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    pub camera_index: i32,
    pub window_title: String,
    /// Key code that stops the loop. 27 is Esc.
    pub exit_key: i32,
    /// Stop after this many frames. Unlimited when unset.
    pub max_frames: Option<u64>,
    pub max_consecutive_failures: u32,
    pub warmup_secs: u64,
}

impl CaptureConfig {
    pub fn new() -> Self {
        CaptureConfig {
            camera_index: 0,
            window_title: "Frame".to_string(),
            exit_key: 27,
            max_frames: None,
            max_consecutive_failures: 30,
            warmup_secs: 0,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub action_units: ActionUnitConfig,
    pub detector: FaceDetectionConfig,
    pub landmarks: FaceLandmarkConfig,
    pub capture: CaptureConfig,
    /// JSON-lines file receiving one record per classified face.
    pub summary_path: Option<PathBuf>,
}

impl AppConfig {
    /// load reads the configuration from a JSON file, or returns the defaults when no path is given.
    ///
    /// # Arguments
    /// * `path` - Option<&Path>
    ///
    /// # Returns
    /// * `Result<AppConfig>`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(AppConfig::default());
        };

        let raw = fs::read_to_string(path).map_err(|e| {
            Error::Initialization(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
