use log::{debug, warn};
use opencv::core::Mat;

use crate::error::{Error, Result};
use crate::helper::face_helper::bounding_box_of;
use crate::modules::action_unit::{ActionUnitClassifier, ActionUnitFlags};
use crate::modules::expression::{classify_expression, Expression};
use crate::modules::face_detection_client::FaceDetector;
use crate::modules::face_landmark_client::LandmarkPredictor;
use crate::utils::coordinate::{BoundingBox, Coordinate2D, FaceRegion, LandmarkSet};

/// Everything derived for one face in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceAnalysis {
    pub region: FaceRegion,
    pub bbox: BoundingBox,
    pub landmarks: LandmarkSet,
    pub action_units: ActionUnitFlags,
    pub expression: Expression,
    pub label_position: Coordinate2D,
}

pub struct ExpressionPipeline<D, P> {
    detector: D,
    predictor: P,
    action_units: ActionUnitClassifier,
}

impl<D: FaceDetector, P: LandmarkPredictor> ExpressionPipeline<D, P> {
    /// new initializes new instance of the pipeline
    pub fn new(detector: D, predictor: P, action_units: ActionUnitClassifier) -> Self {
        ExpressionPipeline {
            detector,
            predictor,
            action_units,
        }
    }

    /// classify_face derives the box, action units and expression for one set of landmarks.
    ///
    /// # Arguments
    /// * `region` - FaceRegion from the detector
    /// * `landmarks` - LandmarkSet for that region
    ///
    /// # Returns
    /// * `FaceAnalysis`
    pub fn classify_face(&self, region: FaceRegion, landmarks: LandmarkSet) -> FaceAnalysis {
        let bbox = bounding_box_of(&region);
        let action_units = self.action_units.classify(&landmarks, &bbox);
        let (expression, label_position) = classify_expression(&action_units, bbox.top_left());

        FaceAnalysis {
            region,
            bbox,
            landmarks,
            action_units,
            expression,
            label_position,
        }
    }

    /// analyze_frame classifies every face found in a grayscale frame.
    ///
    /// A face whose landmark fit fails, or whose shape does not have 68 points,
    /// is skipped for this frame.
    ///
    /// # Arguments
    /// * `gray` - single channel frame
    ///
    /// # Returns
    /// * `Result<Vec<FaceAnalysis>>`
    pub fn analyze_frame(&mut self, gray: &Mat) -> Result<Vec<FaceAnalysis>> {
        let regions = self.detector.detect(gray)?;
        let mut faces: Vec<FaceAnalysis> = Vec::with_capacity(regions.len());

        for region in regions {
            let landmarks = match self.predictor.predict(gray, &region) {
                Ok(landmarks) => landmarks,
                Err(Error::InvalidLandmarkCount { expected, found }) => {
                    warn!(
                        "Skipping face at ({}, {}): expected {expected} landmarks, got {found}",
                        region.left, region.top
                    );
                    continue;
                }
                Err(Error::LandmarkFitFailed { left, top }) => {
                    warn!("Skipping face at ({left}, {top}): landmark fit failed");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let face = self.classify_face(region, landmarks);
            debug!(
                "Face at ({}, {}) {}x{}: {} with action units {:?}",
                face.bbox.x,
                face.bbox.y,
                face.bbox.width,
                face.bbox.height,
                face.expression,
                face.action_units.active()
            );
            faces.push(face);
        }
        Ok(faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::coordinate::{LEFT_LIP_CORNER, NUM_LANDMARKS, RIGHT_LIP_CORNER};

    struct FixedDetector(Vec<FaceRegion>);

    impl FaceDetector for FixedDetector {
        fn detect(&mut self, _image: &Mat) -> Result<Vec<FaceRegion>> {
            Ok(self.0.clone())
        }
    }

    /// Places the lip corners `spread` pixels apart, skips regions narrower than 10px.
    struct LipPredictor {
        spread: i32,
    }

    impl LandmarkPredictor for LipPredictor {
        fn predict(&mut self, _image: &Mat, region: &FaceRegion) -> Result<LandmarkSet> {
            if region.right - region.left < 10 {
                return Err(Error::InvalidLandmarkCount {
                    expected: NUM_LANDMARKS,
                    found: 5,
                });
            }
            let mut points = vec![(region.left, region.top); NUM_LANDMARKS];
            points[LEFT_LIP_CORNER] = (region.left, region.bottom);
            points[RIGHT_LIP_CORNER] = (region.left + self.spread, region.bottom);
            LandmarkSet::from_points(&points)
        }
    }

    /// Fails the fit for any region touching the frame origin.
    struct UnfitPredictor;

    impl LandmarkPredictor for UnfitPredictor {
        fn predict(&mut self, image: &Mat, region: &FaceRegion) -> Result<LandmarkSet> {
            if region.left == 0 {
                return Err(Error::LandmarkFitFailed {
                    left: region.left,
                    top: region.top,
                });
            }
            LipPredictor { spread: 45 }.predict(image, region)
        }
    }

    struct BrokenPredictor;

    impl LandmarkPredictor for BrokenPredictor {
        fn predict(&mut self, _image: &Mat, _region: &FaceRegion) -> Result<LandmarkSet> {
            Err(Error::Initialization("model unloaded".to_string()))
        }
    }

    #[test]
    fn classifies_every_detected_face() {
        let detector = FixedDetector(vec![
            FaceRegion::new(10, 20, 110, 120),
            FaceRegion::new(200, 40, 300, 140),
        ]);
        let mut pipeline = ExpressionPipeline::new(
            detector,
            LipPredictor { spread: 42 },
            ActionUnitClassifier::default(),
        );

        let faces = pipeline.analyze_frame(&Mat::default()).unwrap();
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].expression, Expression::Happiness);
        assert_eq!(faces[0].bbox, BoundingBox::new(10, 20, 100, 100));
        assert_eq!(faces[0].label_position, Coordinate2D::new(0, 10));
        assert_eq!(faces[1].label_position, Coordinate2D::new(190, 30));
    }

    #[test]
    fn face_with_bad_landmarks_is_skipped() {
        let detector = FixedDetector(vec![
            FaceRegion::new(0, 0, 5, 5),
            FaceRegion::new(10, 10, 110, 110),
        ]);
        let mut pipeline = ExpressionPipeline::new(
            detector,
            LipPredictor { spread: 20 },
            ActionUnitClassifier::default(),
        );

        let faces = pipeline.analyze_frame(&Mat::default()).unwrap();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].region, FaceRegion::new(10, 10, 110, 110));
        assert_eq!(faces[0].expression, Expression::Neutral);
    }

    #[test]
    fn face_with_failed_fit_is_skipped() {
        let detector = FixedDetector(vec![
            FaceRegion::new(0, 30, 100, 130),
            FaceRegion::new(150, 30, 250, 130),
        ]);
        let mut pipeline =
            ExpressionPipeline::new(detector, UnfitPredictor, ActionUnitClassifier::default());

        let faces = pipeline.analyze_frame(&Mat::default()).unwrap();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].region, FaceRegion::new(150, 30, 250, 130));
        assert_eq!(faces[0].expression, Expression::Happiness);
    }

    #[test]
    fn fit_failure_names_the_face() {
        let err = Error::LandmarkFitFailed { left: 12, top: 34 };
        assert_eq!(err.to_string(), "landmark fit failed for face at (12, 34)");
    }

    #[test]
    fn other_predictor_errors_propagate() {
        let detector = FixedDetector(vec![FaceRegion::new(0, 0, 50, 50)]);
        let mut pipeline =
            ExpressionPipeline::new(detector, BrokenPredictor, ActionUnitClassifier::default());
        assert!(matches!(
            pipeline.analyze_frame(&Mat::default()),
            Err(Error::Initialization(_))
        ));
    }

    #[test]
    fn no_faces_gives_empty_frame() {
        let mut pipeline = ExpressionPipeline::new(
            FixedDetector(vec![]),
            BrokenPredictor,
            ActionUnitClassifier::default(),
        );
        assert!(pipeline.analyze_frame(&Mat::default()).unwrap().is_empty());
    }
}
