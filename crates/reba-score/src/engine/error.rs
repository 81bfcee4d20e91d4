use reba_core::ExtractError;

use crate::calibration::CalibrationError;

/// Errors returned when scoring a wire request.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("expected {expected} landmarks, got {got}")]
    LandmarkCount { expected: usize, got: usize },
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}
