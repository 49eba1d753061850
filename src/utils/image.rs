use opencv::core::{Mat, MatTraitConst, Rect};
use opencv::imgproc::{cvt_color, COLOR_BGR2GRAY};

use crate::error::Result;
use crate::utils::coordinate::FaceRegion;

/// Converts a BGR frame to grayscale. Frames that are already single channel are copied as is.
pub fn to_grayscale(frame: &Mat) -> Result<Mat> {
    if frame.channels() == 1 {
        return Ok(frame.try_clone()?);
    }

    let mut gray = Mat::default();
    cvt_color(frame, &mut gray, COLOR_BGR2GRAY, 0)?;
    Ok(gray)
}

pub fn rect_to_region(rect: Rect) -> FaceRegion {
    FaceRegion::new(rect.x, rect.y, rect.x + rect.width, rect.y + rect.height)
}

pub fn region_to_rect(region: &FaceRegion) -> Rect {
    Rect::new(
        region.left,
        region.top,
        region.right - region.left,
        region.bottom - region.top,
    )
}
