use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of points produced by the 68-point landmark models.
pub const NUM_LANDMARKS: usize = 68;

// 68-point indices used by the action-unit ratios.
pub const LEFT_BROW_INNER: usize = 21;
pub const RIGHT_BROW_INNER: usize = 22;
pub const EYELID_UPPER: usize = 37;
pub const EYELID_LOWER: usize = 41;
pub const LEFT_LIP_CORNER: usize = 48;
pub const RIGHT_LIP_CORNER: usize = 54;
pub const INNER_LIP_UPPER: usize = 62;
pub const INNER_LIP_LOWER: usize = 66;

/// Face region as reported by a detector, in edge form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl FaceRegion {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        FaceRegion { left, top, right, bottom }
    }
}

/// Face box as (x, y, width, height) in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        BoundingBox { x, y, width, height }
    }

    pub fn top_left(&self) -> Coordinate2D {
        Coordinate2D { x: self.x, y: self.y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate2D {
    pub x: i32,
    pub y: i32,
}

impl Coordinate2D {
    pub const fn new(x: i32, y: i32) -> Self {
        Coordinate2D { x, y }
    }
}

/// Ordered 68 landmark points, one (x, y) row per point.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: Array2<i32>,
}

impl LandmarkSet {
    /// Builds a set from exactly 68 points.
    pub fn from_points(points: &[(i32, i32)]) -> Result<Self> {
        if points.len() != NUM_LANDMARKS {
            return Err(Error::InvalidLandmarkCount {
                expected: NUM_LANDMARKS,
                found: points.len(),
            });
        }

        let flat: Vec<i32> = points.iter().flat_map(|&(x, y)| [x, y]).collect();
        let points = Array2::from_shape_vec((NUM_LANDMARKS, 2), flat)
            .map_err(|_| Error::InvalidLandmarkCount {
                expected: NUM_LANDMARKS,
                found: points.len(),
            })?;
        Ok(LandmarkSet { points })
    }

    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    /// Point at a landmark index. Panics on an index of 68 or above.
    pub fn point(&self, index: usize) -> Coordinate2D {
        let row = self.points.row(index);
        Coordinate2D::new(row[0], row[1])
    }

    pub fn iter(&self) -> impl Iterator<Item = Coordinate2D> + '_ {
        self.points
            .rows()
            .into_iter()
            .map(|row: ArrayView1<i32>| Coordinate2D::new(row[0], row[1]))
    }
}
