use log::info;
use opencv::core::{Mat, Point2f, Ptr, Rect, Vector};
use opencv::face::{create_facemark_lbf, Facemark};
use opencv::prelude::*;

use crate::config::config::FaceLandmarkConfig;
use crate::error::{Error, Result};
use crate::helper::face_helper::to_landmark_set;
use crate::modules::face_detection_client::path_str;
use crate::utils::coordinate::{FaceRegion, LandmarkSet};
use crate::utils::image::region_to_rect;

/// Predicts the 68 landmarks of one face region.
pub trait LandmarkPredictor {
    fn predict(&mut self, image: &Mat, region: &FaceRegion) -> Result<LandmarkSet>;
}

/// 68-point predictor backed by the OpenCV contrib LBF facemark model.
pub struct LbfLandmarkPredictor {
    facemark: Ptr<Facemark>,
}

impl LbfLandmarkPredictor {
    /// new loads the LBF model named in the config.
    ///
    /// # Arguments
    /// * `config` - FaceLandmarkConfig
    ///
    /// # Returns
    /// * `Result<LbfLandmarkPredictor>`
    pub fn new(config: FaceLandmarkConfig) -> Result<Self> {
        let path = path_str(&config.model_path)?;
        if !config.model_path.exists() {
            return Err(Error::Initialization(format!(
                "landmark model not found at {path}"
            )));
        }

        let mut facemark = create_facemark_lbf()?;
        facemark.load_model(path).map_err(|e| {
            Error::Initialization(format!("landmark model at {path} could not be loaded: {e}"))
        })?;
        info!("Loaded landmark model from {path}");

        Ok(LbfLandmarkPredictor { facemark })
    }
}

impl LandmarkPredictor for LbfLandmarkPredictor {
    fn predict(&mut self, image: &Mat, region: &FaceRegion) -> Result<LandmarkSet> {
        let faces: Vector<Rect> = Vector::from_iter([region_to_rect(region)]);
        let mut shapes: Vector<Vector<Point2f>> = Vector::new();

        if !self.facemark.fit(image, &faces, &mut shapes)? || shapes.is_empty() {
            return Err(Error::LandmarkFitFailed {
                left: region.left,
                top: region.top,
            });
        }

        let shape = shapes.get(0)?;
        to_landmark_set(&shape)
    }
}
