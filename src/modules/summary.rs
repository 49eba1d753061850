use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use crate::error::Result;
use crate::modules::action_unit::ActionUnitFlags;
use crate::modules::expression::Expression;
use crate::pipeline::pipeline::FaceAnalysis;
use crate::utils::coordinate::BoundingBox;

#[derive(Debug, Serialize)]
struct SummaryRecord<'a> {
    frame: u64,
    face: usize,
    expression: Expression,
    action_units: &'a ActionUnitFlags,
    #[serde(rename = "box")]
    bbox: &'a BoundingBox,
}

/// Appends one JSON line per classified face.
pub struct ExpressionSummary {
    writer: Box<dyn Write>,
    records: u64,
}

impl ExpressionSummary {
    /// create truncates `path` and starts a new summary there.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        info!("Writing expression summary to {}", path.display());
        Ok(Self::from_writer(BufWriter::new(file)))
    }

    pub fn from_writer<W: Write + 'static>(writer: W) -> Self {
        ExpressionSummary {
            writer: Box::new(writer),
            records: 0,
        }
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    /// record writes every face analysed in one frame.
    ///
    /// # Arguments
    /// * `frame` - frame number, starting at 0
    /// * `faces` - &[FaceAnalysis]
    ///
    /// # Returns
    /// * `Result<()>`
    pub fn record(&mut self, frame: u64, faces: &[FaceAnalysis]) -> Result<()> {
        for (face, analysis) in faces.iter().enumerate() {
            let record = SummaryRecord {
                frame,
                face,
                expression: analysis.expression,
                action_units: &analysis.action_units,
                bbox: &analysis.bbox,
            };
            serde_json::to_writer(&mut self.writer, &record)?;
            self.writer.write_all(b"\n")?;
            self.records += 1;
        }
        Ok(())
    }
}

impl Drop for ExpressionSummary {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!("Failed to flush expression summary: {e}");
        }
    }
}
