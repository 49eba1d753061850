use log::{info, warn};
use opencv::core::Mat;
use opencv::highgui;
use opencv::prelude::*;
use opencv::videoio::{VideoCapture, CAP_ANY};

use crate::config::config::CaptureConfig;
use crate::error::{Error, Result};
use crate::modules::face_detection_client::FaceDetector;
use crate::modules::face_landmark_client::LandmarkPredictor;
use crate::modules::summary::ExpressionSummary;
use crate::pipeline::pipeline::ExpressionPipeline;
use crate::pipeline::render::annotate;
use crate::utils::image::to_grayscale;

/// Produces captured frames. `Ok(None)` means the device returned no frame this time.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Mat>>;
}

/// Shows annotated frames and reports key presses.
pub trait FrameSink {
    fn show(&mut self, frame: &Mat) -> Result<()>;

    /// Key code pressed since the last poll, or -1.
    fn poll_key(&mut self) -> Result<i32>;
}

/// Why the frame loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    OperatorExit,
    DeviceFailure(String),
    FrameLimit(u64),
}

/// Capture device, released when dropped.
pub struct Camera {
    capture: VideoCapture,
    index: i32,
}

impl Camera {
    pub fn open(index: i32) -> Result<Self> {
        let capture = VideoCapture::new(index, CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::Initialization(format!(
                "unable to open camera {index}"
            )));
        }
        info!("Opened camera {index}");
        Ok(Camera { capture, index })
    }
}

impl FrameSource for Camera {
    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        match self.capture.release() {
            Ok(()) => info!("Released camera {}", self.index),
            Err(e) => warn!("Failed to release camera {}: {e}", self.index),
        }
    }
}

/// HighGUI window, destroyed when dropped.
pub struct DisplayWindow {
    title: String,
}

impl DisplayWindow {
    pub fn open(title: &str) -> Result<Self> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE)
            .map_err(|e| Error::Initialization(format!("cannot create window {title}: {e}")))?;
        Ok(DisplayWindow {
            title: title.to_string(),
        })
    }
}

impl FrameSink for DisplayWindow {
    fn show(&mut self, frame: &Mat) -> Result<()> {
        highgui::imshow(&self.title, frame)?;
        Ok(())
    }

    fn poll_key(&mut self) -> Result<i32> {
        Ok(highgui::wait_key(1)?)
    }
}

impl Drop for DisplayWindow {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.title) {
            warn!("Failed to close window {}: {e}", self.title);
        }
    }
}

pub struct FrameLoop<S, K, D, P> {
    source: S,
    sink: K,
    pipeline: ExpressionPipeline<D, P>,
    summary: Option<ExpressionSummary>,
    exit_key: i32,
    max_frames: Option<u64>,
    max_consecutive_failures: u32,
}

impl<S, K, D, P> FrameLoop<S, K, D, P>
where
    S: FrameSource,
    K: FrameSink,
    D: FaceDetector,
    P: LandmarkPredictor,
{
    pub fn new(source: S, sink: K, pipeline: ExpressionPipeline<D, P>, capture: &CaptureConfig) -> Self {
        FrameLoop {
            source,
            sink,
            pipeline,
            summary: None,
            exit_key: capture.exit_key,
            max_frames: capture.max_frames,
            max_consecutive_failures: capture.max_consecutive_failures,
        }
    }

    pub fn with_summary(mut self, summary: ExpressionSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn summary(&self) -> Option<&ExpressionSummary> {
        self.summary.as_ref()
    }

    /// run captures and classifies frames until the operator exits, the device fails,
    /// or the frame limit is reached.
    ///
    /// The key is polled once per iteration, whether or not a face was found.
    /// An empty read still polls the key, before the failure count is checked.
    ///
    /// # Returns
    /// * `Result<Termination>`
    pub fn run(&mut self) -> Result<Termination> {
        let mut frames: u64 = 0;
        let mut failures: u32 = 0;

        loop {
            if self.max_frames.is_some_and(|limit| frames >= limit) {
                return Ok(Termination::FrameLimit(frames));
            }

            let frame = match self.source.next_frame() {
                Ok(Some(frame)) if !frame.empty() => {
                    failures = 0;
                    frame
                }
                Ok(_) => {
                    failures += 1;
                    warn!("No frame from capture device ({failures} in a row)");
                    if self.sink.poll_key()? == self.exit_key {
                        return Ok(Termination::OperatorExit);
                    }
                    if failures >= self.max_consecutive_failures {
                        return Ok(Termination::DeviceFailure(format!(
                            "no frame for {failures} consecutive reads"
                        )));
                    }
                    continue;
                }
                Err(e) => return Ok(Termination::DeviceFailure(e.to_string())),
            };

            self.process(frames, frame)?;
            frames += 1;

            if self.sink.poll_key()? == self.exit_key {
                return Ok(Termination::OperatorExit);
            }
        }
    }

    fn process(&mut self, frame_no: u64, mut frame: Mat) -> Result<()> {
        let gray = to_grayscale(&frame)?;
        let faces = self.pipeline.analyze_frame(&gray)?;

        annotate(&mut frame, &faces)?;
        if let Some(summary) = self.summary.as_mut() {
            summary.record(frame_no, &faces)?;
        }
        self.sink.show(&frame)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use opencv::core::{Scalar, CV_8UC3};

    use super::*;
    use crate::modules::action_unit::ActionUnitClassifier;
    use crate::utils::coordinate::{FaceRegion, LandmarkSet};

    fn blank() -> Mat {
        Mat::new_rows_cols_with_default(32, 32, CV_8UC3, Scalar::all(0.0)).unwrap()
    }

    struct Scripted(VecDeque<Result<Option<Mat>>>);

    impl FrameSource for Scripted {
        fn next_frame(&mut self) -> Result<Option<Mat>> {
            self.0.pop_front().unwrap_or_else(|| Ok(Some(blank())))
        }
    }

    #[derive(Default)]
    struct Keys {
        keys: VecDeque<i32>,
        shown: usize,
    }

    impl FrameSink for Keys {
        fn show(&mut self, _frame: &Mat) -> Result<()> {
            self.shown += 1;
            Ok(())
        }

        fn poll_key(&mut self) -> Result<i32> {
            Ok(self.keys.pop_front().unwrap_or(-1))
        }
    }

    struct NoFaces;

    impl FaceDetector for NoFaces {
        fn detect(&mut self, _image: &Mat) -> Result<Vec<FaceRegion>> {
            Ok(vec![])
        }
    }

    struct Unused;

    impl LandmarkPredictor for Unused {
        fn predict(&mut self, _image: &Mat, _region: &FaceRegion) -> Result<LandmarkSet> {
            unreachable!("no faces are detected")
        }
    }

    fn frame_loop(
        frames: Vec<Result<Option<Mat>>>,
        keys: Vec<i32>,
        capture: CaptureConfig,
    ) -> FrameLoop<Scripted, Keys, NoFaces, Unused> {
        let pipeline = ExpressionPipeline::new(NoFaces, Unused, ActionUnitClassifier::default());
        let sink = Keys {
            keys: keys.into(),
            shown: 0,
        };
        FrameLoop::new(Scripted(frames.into()), sink, pipeline, &capture)
    }

    #[test]
    fn escape_stops_the_loop() {
        let mut lp = frame_loop(vec![], vec![-1, -1, 27], CaptureConfig::new());
        assert_eq!(lp.run().unwrap(), Termination::OperatorExit);
        assert_eq!(lp.sink().shown, 3);
    }

    #[test]
    fn frame_limit_stops_the_loop() {
        let capture = CaptureConfig {
            max_frames: Some(4),
            ..CaptureConfig::new()
        };
        let mut lp = frame_loop(vec![], vec![], capture);
        assert_eq!(lp.run().unwrap(), Termination::FrameLimit(4));
        assert_eq!(lp.sink().shown, 4);
    }

    #[test]
    fn repeated_empty_reads_are_a_device_failure() {
        let capture = CaptureConfig {
            max_consecutive_failures: 2,
            ..CaptureConfig::new()
        };
        let frames = vec![Ok(Some(blank())), Ok(None), Ok(Some(Mat::default()))];
        let mut lp = frame_loop(frames, vec![], capture);
        assert!(matches!(lp.run().unwrap(), Termination::DeviceFailure(_)));
        assert_eq!(lp.sink().shown, 1);
    }

    #[test]
    fn a_good_frame_resets_the_failure_count() {
        let capture = CaptureConfig {
            max_consecutive_failures: 2,
            max_frames: Some(3),
            ..CaptureConfig::new()
        };
        let frames = vec![Ok(None), Ok(Some(blank())), Ok(None), Ok(Some(blank()))];
        let mut lp = frame_loop(frames, vec![], capture);
        assert_eq!(lp.run().unwrap(), Termination::FrameLimit(3));
    }

    #[test]
    fn escape_is_honoured_while_reads_come_back_empty() {
        let frames = vec![Ok(None), Ok(None), Ok(None)];
        let mut lp = frame_loop(frames, vec![-1, 27], CaptureConfig::new());
        assert_eq!(lp.run().unwrap(), Termination::OperatorExit);
        assert_eq!(lp.sink().shown, 0);
    }

    #[test]
    fn escape_wins_over_the_last_allowed_failure() {
        let capture = CaptureConfig {
            max_consecutive_failures: 1,
            ..CaptureConfig::new()
        };
        let mut lp = frame_loop(vec![Ok(None)], vec![27], capture);
        assert_eq!(lp.run().unwrap(), Termination::OperatorExit);
    }

    #[test]
    fn read_error_is_a_device_failure() {
        let frames = vec![Err(Error::Initialization("unplugged".to_string()))];
        let mut lp = frame_loop(frames, vec![], CaptureConfig::new());
        match lp.run().unwrap() {
            Termination::DeviceFailure(reason) => assert!(reason.contains("unplugged")),
            other => panic!("unexpected termination {other:?}"),
        }
    }
}
