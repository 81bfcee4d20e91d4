use log::debug;
use reba_core::{
    extract_joint_angles, ExtractError, JointAngles, LandmarkSet, Side, POSE_LANDMARK_COUNT,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{ArmPolicy, RebaParams, RequestError, ScoreResult, SubScores};
use crate::calibration::{CalibrationInput, CalibrationRecord, PostureCategory, ValidationPolicy};
use crate::io::{RebaRequest, RebaResponse};
use crate::risk::{final_score, RiskLevel};
use crate::subscores::{
    activity_score, forearm_score, leg_score, load_score, neck_score, trunk_score,
    upper_arm_score, wrist_score,
};
use crate::tables::{table_a, table_b, table_c};

/// Group A: Table A of (trunk, neck, leg) plus the load correction.
pub fn group_a_score(trunk: u8, neck: u8, leg: u8, load: u8) -> u8 {
    table_a(trunk, neck, leg).saturating_add(load)
}

/// Group B: Table B of (upper arm, forearm, wrist) plus coupling.
pub fn group_b_score(upper_arm: u8, forearm: u8, wrist: u8, coupling: u8) -> u8 {
    table_b(upper_arm, forearm, wrist).saturating_add(coupling)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ArmScores {
    upper_arm: u8,
    forearm: u8,
    wrist: u8,
    table_b: u8,
}

fn score_arm(shoulder: f32, elbow: f32, wrist: f32, calib: &CalibrationInput) -> ArmScores {
    let upper_arm = upper_arm_score(
        shoulder,
        calib.upper_arm_correction,
        calib.shoulder_elevation,
        calib.gravity_assist,
    );
    let forearm = forearm_score(elbow);
    let wrist = wrist_score(wrist, calib.wrist_correction);
    ArmScores {
        upper_arm,
        forearm,
        wrist,
        table_b: table_b(upper_arm, forearm, wrist),
    }
}

/// Deterministic REBA scoring pipeline.
///
/// Stateless apart from its parameters; every call is independent.
#[derive(Clone, Debug, Default)]
pub struct RebaEngine {
    params: RebaParams,
}

impl RebaEngine {
    pub fn new(params: RebaParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &RebaParams {
        &self.params
    }

    fn arms(&self, angles: &JointAngles, calib: &CalibrationInput) -> (ArmScores, Option<Side>) {
        match self.params.arm_policy {
            ArmPolicy::Mean => {
                let mean = |l: f32, r: f32| 0.5 * (l + r);
                let arm = score_arm(
                    mean(angles.left_shoulder, angles.right_shoulder),
                    mean(angles.left_elbow, angles.right_elbow),
                    mean(angles.left_wrist, angles.right_wrist),
                    calib,
                );
                (arm, None)
            }
            ArmPolicy::WorstSide => {
                let side_scores = |side: Side| {
                    score_arm(
                        angles.shoulder(side),
                        angles.elbow(side),
                        angles.wrist(side),
                        calib,
                    )
                };
                let near = calib.filming_side;
                let far = near.opposite();
                let (near_arm, far_arm) = (side_scores(near), side_scores(far));
                if far_arm.table_b > near_arm.table_b {
                    (far_arm, Some(far))
                } else {
                    (near_arm, Some(near))
                }
            }
        }
    }

    /// Score one set of joint angles.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn score(&self, angles: &JointAngles, calib: &CalibrationInput) -> ScoreResult {
        let p = &self.params;

        let twisted = angles.trunk_rotation.abs() > p.trunk_rotation_threshold_deg
            || calib.trunk_rotation
            || calib.trunk_side_bend;
        let trunk = trunk_score(angles.trunk_flexion, twisted, p.upright_trunk_tolerance_deg);
        let neck = neck_score(angles.neck, calib.neck_rotation, calib.neck_side_bend);
        let knee = match calib.posture {
            PostureCategory::StandingOneLeg => angles.knee(calib.supporting_leg),
            _ => angles.mean_knee(),
        };
        let leg = leg_score(calib.posture, knee);
        let load = load_score(calib.load_kg, calib.shock_force);
        let score_a = group_a_score(trunk, neck, leg, load);

        let (arm, arm_side) = self.arms(angles, calib);
        let coupling = calib.coupling.min(3);
        let score_b = arm.table_b.saturating_add(coupling);

        let table_c = table_c(score_a, score_b);
        let activity = activity_score(calib.static_posture, calib.repetitive, calib.unstable);
        let final_score = final_score(table_c, activity);

        ScoreResult {
            angles: *angles,
            sub_scores: SubScores {
                trunk,
                neck,
                leg,
                load,
                upper_arm: arm.upper_arm,
                forearm: arm.forearm,
                wrist: arm.wrist,
                coupling,
            },
            score_a,
            score_b,
            table_c,
            activity,
            final_score,
            risk_level: RiskLevel::from_score(final_score),
            arm_side,
            fallbacks: Vec::new(),
        }
    }

    /// Extract angles from `landmarks` and score them.
    pub fn try_score_frame(
        &self,
        landmarks: &LandmarkSet,
        calib: &CalibrationInput,
    ) -> Result<ScoreResult, ExtractError> {
        let angles = extract_joint_angles(landmarks, calib.filming_side, &self.params.extract)?;
        Ok(self.score(&angles, calib))
    }

    /// Like [`Self::try_score_frame`], but an unusable frame yields `None`.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn score_frame(
        &self,
        landmarks: &LandmarkSet,
        calib: &CalibrationInput,
    ) -> Option<ScoreResult> {
        match self.try_score_frame(landmarks, calib) {
            Ok(result) => Some(result),
            Err(err) => {
                debug!("frame skipped: {err}");
                None
            }
        }
    }

    /// Resolve wire-form calibration and score the frame.
    ///
    /// Defaults substituted for calibration fields are carried in
    /// [`ScoreResult::fallbacks`].
    pub fn score_record(
        &self,
        landmarks: &LandmarkSet,
        record: &CalibrationRecord,
    ) -> Result<ScoreResult, RequestError> {
        let policy = self.params.validation;
        let resolved = record.resolve(policy)?;
        if policy == ValidationPolicy::Strict && landmarks.len() != POSE_LANDMARK_COUNT {
            return Err(RequestError::LandmarkCount {
                expected: POSE_LANDMARK_COUNT,
                got: landmarks.len(),
            });
        }
        let mut result = self.try_score_frame(landmarks, &resolved.input)?;
        result.fallbacks = resolved.fallbacks;
        Ok(result)
    }

    /// Score a request and build the wire response.
    pub fn score_request(&self, request: &RebaRequest) -> Result<RebaResponse, RequestError> {
        self.score_record(&request.landmarks, &request.calib_inputs)
            .map(RebaResponse::from)
    }
}

/// Score one frame with default parameters.
pub fn score_frame(landmarks: &LandmarkSet, calib: &CalibrationInput) -> Option<ScoreResult> {
    RebaEngine::default().score_frame(landmarks, calib)
}
