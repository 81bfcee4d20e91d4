//! REBA (Rapid Entire Body Assessment) scoring.
//!
//! Turns joint angles plus operator-entered calibration inputs into the
//! standard REBA sub-scores, the A/B/C table lookups, a final score in
//! `1..=15` and a risk level.
//!
//! ## Quickstart
//!
//! ```no_run
//! use reba_score::{CalibrationInput, RebaEngine, RebaParams};
//! use reba_core::LandmarkSet;
//!
//! let landmarks: LandmarkSet = serde_json::from_str("[]").unwrap();
//! let engine = RebaEngine::new(RebaParams::default());
//! match engine.score_frame(&landmarks, &CalibrationInput::default()) {
//!     Some(res) => println!("REBA {} ({})", res.final_score, res.risk_level),
//!     None => println!("frame skipped"),
//! }
//! ```

pub mod calibration;
pub mod engine;
pub mod io;
pub mod risk;
pub mod subscores;
pub mod tables;

pub use calibration::{
    CalibrationError, CalibrationInput, CalibrationRecord, Fallback, FieldError, FieldIssue,
    PostureCategory, ResolvedCalibration, ValidationPolicy,
};
pub use engine::{
    group_a_score, group_b_score, score_frame, ArmPolicy, RebaEngine, RebaParams, RequestError,
    ScoreResult, SubScores,
};
pub use io::{IntermediateScores, RebaIoError, RebaRequest, RebaResponse};
pub use risk::{final_score, RiskLevel, MAX_FINAL_SCORE, MIN_FINAL_SCORE};
pub use tables::{table_a, table_b, table_c};
