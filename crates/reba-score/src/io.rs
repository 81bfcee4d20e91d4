//! JSON request/response contract and file helpers.
//!
//! ```json
//! { "landmarks": [ {"x": 0.5, "y": 0.1, "z": 0.0, "visibility": 0.99}, ... ],
//!   "calibInputs": { "filmingSide": "left", "postureCategory": "standing-both-legs", ... } }
//! ```

use std::fs;
use std::path::Path;

use reba_core::{JointAngles, LandmarkSet};
use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationInput, CalibrationRecord, Fallback};
use crate::engine::ScoreResult;
use crate::risk::RiskLevel;

#[derive(thiserror::Error, Debug)]
pub enum RebaIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One scoring request: a frame of landmarks plus calibration inputs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebaRequest {
    pub landmarks: LandmarkSet,
    #[serde(default)]
    pub calib_inputs: CalibrationRecord,
}

impl RebaRequest {
    pub fn new(landmarks: LandmarkSet, calib: &CalibrationInput) -> Self {
        Self {
            landmarks,
            calib_inputs: CalibrationRecord::from(calib),
        }
    }

    /// Load a request from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, RebaIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this request to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), RebaIoError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Intermediate scores reported alongside the final score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediateScores {
    #[serde(rename = "scoreA")]
    pub score_a: u8,
    #[serde(rename = "scoreB")]
    pub score_b: u8,
    #[serde(default)]
    pub neck: u8,
    #[serde(default)]
    pub trunk: u8,
    #[serde(default)]
    pub leg: u8,
    #[serde(default)]
    pub load: u8,
    #[serde(default)]
    pub upper_arm: u8,
    #[serde(default)]
    pub forearm: u8,
    #[serde(default)]
    pub wrist: u8,
    #[serde(default, rename = "tableC")]
    pub table_c: u8,
    #[serde(default)]
    pub activity: u8,
}

/// Scoring response.
///
/// `final_score`, `risk_level` and `intermediate_scores.scoreA/scoreB` are the
/// core contract; the remaining fields are informational and optional when
/// parsing a response from another scorer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RebaResponse {
    pub final_score: u8,
    pub risk_level: RiskLevel,
    pub intermediate_scores: IntermediateScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_angles: Option<JointAngles>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<Fallback>,
}

impl From<&ScoreResult> for RebaResponse {
    fn from(r: &ScoreResult) -> Self {
        let s = &r.sub_scores;
        Self {
            final_score: r.final_score,
            risk_level: r.risk_level,
            intermediate_scores: IntermediateScores {
                score_a: r.score_a,
                score_b: r.score_b,
                neck: s.neck,
                trunk: s.trunk,
                leg: s.leg,
                load: s.load,
                upper_arm: s.upper_arm,
                forearm: s.forearm,
                wrist: s.wrist,
                table_c: r.table_c,
                activity: r.activity,
            },
            computed_angles: Some(r.angles),
            fallbacks: r.fallbacks.clone(),
        }
    }
}

impl From<ScoreResult> for RebaResponse {
    fn from(r: ScoreResult) -> Self {
        Self::from(&r)
    }
}
