use reba_core::ExtractParams;
use serde::{Deserialize, Serialize};

use crate::calibration::ValidationPolicy;
use crate::subscores::DEFAULT_UPRIGHT_TOLERANCE_DEG;

/// How the left and right arms are folded into a single Group B score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmPolicy {
    /// Score each arm through Table B and keep the higher-risk side.
    #[default]
    WorstSide,
    /// Average left/right angles, then score once.
    Mean,
}

/// Configuration for the REBA engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RebaParams {
    /// Landmark extraction settings.
    pub extract: ExtractParams,
    /// Trunk flexion at or below this scores as upright.
    pub upright_trunk_tolerance_deg: f32,
    /// Measured shoulder/hip twist beyond this adds the trunk modifier.
    pub trunk_rotation_threshold_deg: f32,
    pub arm_policy: ArmPolicy,
    /// Applied when resolving wire-form calibration inputs.
    pub validation: ValidationPolicy,
}

impl Default for RebaParams {
    fn default() -> Self {
        Self {
            extract: ExtractParams::default(),
            upright_trunk_tolerance_deg: DEFAULT_UPRIGHT_TOLERANCE_DEG,
            trunk_rotation_threshold_deg: 10.0,
            arm_policy: ArmPolicy::default(),
            validation: ValidationPolicy::default(),
        }
    }
}

impl RebaParams {
    /// Defaults with strict calibration validation.
    pub fn strict() -> Self {
        Self {
            validation: ValidationPolicy::Strict,
            ..Self::default()
        }
    }
}
