use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("initialization failed: {0}")]
    Initialization(String),

    #[error("invalid landmark count: expected {expected}, found {found}")]
    InvalidLandmarkCount { expected: usize, found: usize },

    #[error("landmark fit failed for face at ({left}, {top})")]
    LandmarkFitFailed { left: i32, top: i32 },

    #[error("opencv error: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
