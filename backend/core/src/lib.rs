pub mod error;
pub mod types;

pub use error::SnapjudgeError;
pub use types::{
    AnalysisResult, AnalysisTask, ImagePayload, DEFAULT_CONFIDENCE_THRESHOLD,
};
