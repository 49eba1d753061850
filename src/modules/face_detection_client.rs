use std::path::Path;

use log::{debug, info};
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;

use crate::config::config::FaceDetectionConfig;
use crate::error::{Error, Result};
use crate::utils::coordinate::FaceRegion;
use crate::utils::image::rect_to_region;

/// Finds face regions in a grayscale frame.
pub trait FaceDetector {
    fn detect(&mut self, image: &Mat) -> Result<Vec<FaceRegion>>;
}

/// Frontal face detector backed by an OpenCV Haar cascade.
pub struct CascadeFaceDetector {
    classifier: CascadeClassifier,
    scale_factor: f64,
    min_neighbors: i32,
    min_face_size: i32,
}

impl CascadeFaceDetector {
    /// new loads the cascade named in the config.
    ///
    /// # Arguments
    /// * `config` - FaceDetectionConfig
    ///
    /// # Returns
    /// * `Result<CascadeFaceDetector>`
    pub fn new(config: FaceDetectionConfig) -> Result<Self> {
        let path = path_str(&config.cascade_path)?;
        if !config.cascade_path.exists() {
            return Err(Error::Initialization(format!(
                "face cascade not found at {path}"
            )));
        }

        let classifier = CascadeClassifier::new(path)?;
        if classifier.empty()? {
            return Err(Error::Initialization(format!(
                "face cascade at {path} could not be loaded"
            )));
        }
        info!("Loaded face cascade from {path}");

        Ok(CascadeFaceDetector {
            classifier,
            scale_factor: config.scale_factor,
            min_neighbors: config.min_neighbors,
            min_face_size: config.min_face_size,
        })
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn detect(&mut self, image: &Mat) -> Result<Vec<FaceRegion>> {
        let mut faces: Vector<Rect> = Vector::new();
        self.classifier.detect_multi_scale(
            image,
            &mut faces,
            self.scale_factor,
            self.min_neighbors,
            0,
            Size::new(self.min_face_size, self.min_face_size),
            Size::new(0, 0),
        )?;

        let regions: Vec<FaceRegion> = faces.iter().map(rect_to_region).collect();
        debug!("Detected {} face(s)", regions.len());
        Ok(regions)
    }
}

pub(crate) fn path_str(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        Error::Initialization(format!("path is not valid UTF-8: {}", path.display()))
    })
}
