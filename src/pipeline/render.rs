use opencv::core::{Mat, Point, Rect, Scalar};
use opencv::imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8};

use crate::error::Result;
use crate::pipeline::pipeline::FaceAnalysis;

// BGR
fn landmark_color() -> Scalar {
    Scalar::new(0.0, 0.0, 255.0, 0.0)
}

fn annotation_color() -> Scalar {
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}

/// Draws landmark dots, the face box and the expression label onto `frame`.
pub fn annotate(frame: &mut Mat, faces: &[FaceAnalysis]) -> Result<()> {
    for face in faces {
        for point in face.landmarks.iter() {
            imgproc::circle(
                frame,
                Point::new(point.x, point.y),
                1,
                landmark_color(),
                -1,
                LINE_8,
                0,
            )?;
        }

        imgproc::rectangle(
            frame,
            Rect::new(face.bbox.x, face.bbox.y, face.bbox.width, face.bbox.height),
            annotation_color(),
            2,
            LINE_8,
            0,
        )?;

        imgproc::put_text(
            frame,
            face.expression.label(),
            Point::new(face.label_position.x, face.label_position.y),
            FONT_HERSHEY_SIMPLEX,
            0.5,
            annotation_color(),
            2,
            LINE_8,
            false,
        )?;
    }
    Ok(())
}
