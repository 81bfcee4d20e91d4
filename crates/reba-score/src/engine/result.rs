use reba_core::{JointAngles, Side};
use serde::{Deserialize, Serialize};

use crate::calibration::Fallback;
use crate::risk::RiskLevel;

/// Individual body-part scores feeding tables A and B.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScores {
    pub trunk: u8,
    pub neck: u8,
    pub leg: u8,
    pub load: u8,
    pub upper_arm: u8,
    pub forearm: u8,
    pub wrist: u8,
    pub coupling: u8,
}

/// Output of one scoring tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub angles: JointAngles,
    pub sub_scores: SubScores,
    /// Table A result plus load correction.
    pub score_a: u8,
    /// Table B result plus coupling.
    pub score_b: u8,
    pub table_c: u8,
    pub activity: u8,
    /// Table C plus activity, in `1..=15`.
    pub final_score: u8,
    pub risk_level: RiskLevel,
    /// Arm that produced Group B, `None` under the mean policy.
    pub arm_side: Option<Side>,
    /// Calibration defaults used for this tick.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<Fallback>,
}
