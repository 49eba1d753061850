use opencv::core::{Point2f, Vector};

use crate::error::{Error, Result};
use crate::utils::coordinate::{BoundingBox, FaceRegion, LandmarkSet, NUM_LANDMARKS};

/// Per-point access to a predictor's shape output.
pub trait LandmarkSource {
    fn num_parts(&self) -> usize;

    /// Integer coordinates of one part, `None` past the end.
    fn part(&self, index: usize) -> Option<(i32, i32)>;
}

impl LandmarkSource for Vector<Point2f> {
    fn num_parts(&self) -> usize {
        self.len()
    }

    fn part(&self, index: usize) -> Option<(i32, i32)> {
        self.get(index)
            .ok()
            .map(|p| (p.x.round() as i32, p.y.round() as i32))
    }
}

impl LandmarkSource for [(i32, i32)] {
    fn num_parts(&self) -> usize {
        self.len()
    }

    fn part(&self, index: usize) -> Option<(i32, i32)> {
        self.get(index).copied()
    }
}

impl LandmarkSource for Vec<(i32, i32)> {
    fn num_parts(&self) -> usize {
        self.len()
    }

    fn part(&self, index: usize) -> Option<(i32, i32)> {
        self.get(index).copied()
    }
}

/// bounding_box_of converts a detector region into (x, y, width, height).
///
/// # Arguments
/// * `region` - &FaceRegion
///
/// # Returns
/// * `BoundingBox`
pub fn bounding_box_of(region: &FaceRegion) -> BoundingBox {
    BoundingBox::new(
        region.left,
        region.top,
        region.right - region.left,
        region.bottom - region.top,
    )
}

/// to_landmark_set reads every part of a predictor shape into an ordered landmark set.
///
/// Fails with `InvalidLandmarkCount` unless the source exposes exactly 68 parts.
///
/// # Arguments
/// * `source` - any `LandmarkSource`
///
/// # Returns
/// * `Result<LandmarkSet>`
pub fn to_landmark_set<S: LandmarkSource + ?Sized>(source: &S) -> Result<LandmarkSet> {
    let found = source.num_parts();
    if found != NUM_LANDMARKS {
        return Err(Error::InvalidLandmarkCount {
            expected: NUM_LANDMARKS,
            found,
        });
    }

    let mut points: Vec<(i32, i32)> = Vec::with_capacity(NUM_LANDMARKS);
    for idx in 0..NUM_LANDMARKS {
        let point = source.part(idx).ok_or(Error::InvalidLandmarkCount {
            expected: NUM_LANDMARKS,
            found: idx,
        })?;
        points.push(point);
    }
    LandmarkSet::from_points(&points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::coordinate::Coordinate2D;

    #[test]
    fn bounding_box_from_region_edges() {
        let region = FaceRegion::new(10, 20, 110, 220);
        assert_eq!(bounding_box_of(&region), BoundingBox::new(10, 20, 100, 200));
    }

    #[test]
    fn zero_area_region_gives_zero_box() {
        let region = FaceRegion::new(5, 5, 5, 5);
        let bbox = bounding_box_of(&region);
        assert_eq!((bbox.width, bbox.height), (0, 0));
    }

    #[test]
    fn opencv_points_are_rounded() {
        let mut shape: Vector<Point2f> = Vector::new();
        for i in 0..NUM_LANDMARKS {
            shape.push(Point2f::new(i as f32 + 0.6, i as f32 + 0.2));
        }
        let set = to_landmark_set(&shape).unwrap();
        assert_eq!(set.point(0), Coordinate2D::new(1, 0));
        assert_eq!(set.point(48), Coordinate2D::new(49, 48));
    }

    #[test]
    fn source_with_67_points_is_rejected() {
        let shape: Vec<(i32, i32)> = (0..67).map(|i| (i, i)).collect();
        let err = to_landmark_set(&shape).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidLandmarkCount { expected: 68, found: 67 }
        ));
    }

    #[test]
    fn empty_source_is_rejected() {
        let shape: Vector<Point2f> = Vector::new();
        assert!(to_landmark_set(&shape).is_err());
    }
}
