use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest score on the REBA scale.
pub const MIN_FINAL_SCORE: u8 = 1;
/// Highest score on the REBA scale.
pub const MAX_FINAL_SCORE: u8 = 15;

/// REBA risk classification of a final score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Negligible,
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl RiskLevel {
    /// Classify a final score. Out-of-scale inputs saturate at the ends.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=1 => RiskLevel::Negligible,
            2..=3 => RiskLevel::Low,
            4..=7 => RiskLevel::Medium,
            8..=10 => RiskLevel::High,
            _ => RiskLevel::VeryHigh,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Negligible => "Negligible",
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }

    /// Recommended action level from the published method.
    pub fn action(self) -> &'static str {
        match self {
            RiskLevel::Negligible => "none necessary",
            RiskLevel::Low => "may be necessary",
            RiskLevel::Medium => "necessary",
            RiskLevel::High => "necessary soon",
            RiskLevel::VeryHigh => "necessary now",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table C score plus activity, saturated into `1..=15`.
pub fn final_score(table_c: u8, activity: u8) -> u8 {
    table_c
        .saturating_add(activity)
        .clamp(MIN_FINAL_SCORE, MAX_FINAL_SCORE)
}
