//! Per-body-part REBA sub-scores.
//!
//! Angle inputs follow the `reba_core::JointAngles` conventions. None of these
//! functions panic; a `NaN` angle fails every `<=` comparison and falls through
//! to the last branch.

use crate::calibration::PostureCategory;

/// Trunk flexion at or below this counts as upright when no tolerance is given.
pub const DEFAULT_UPRIGHT_TOLERANCE_DEG: f32 = 5.0;

/// Trunk: 1 upright, 2 up to 20°, 3 up to 60°, 4 beyond; +1 when twisted or
/// side-bent. Range 1–5.
pub fn trunk_score(
    flexion_deg: f32,
    twisted_or_side_bent: bool,
    upright_tolerance_deg: f32,
) -> u8 {
    let base = if flexion_deg <= upright_tolerance_deg {
        1
    } else if flexion_deg <= 20.0 {
        2
    } else if flexion_deg <= 60.0 {
        3
    } else {
        4
    };
    base + u8::from(twisted_or_side_bent)
}

/// Neck: 1 up to 20°, else 2; +1 when rotated or side-bent. Range 1–3.
pub fn neck_score(neck_deg: f32, rotated: bool, side_bent: bool) -> u8 {
    let base = if neck_deg <= 20.0 { 1 } else { 2 };
    base + u8::from(rotated || side_bent)
}

/// Legs. Sitting or walking is always 1, whatever the knees measure.
/// Otherwise 1 (both legs) or 2 (one leg), plus 1 for 30–60° of knee flexion
/// or 2 beyond 60°. Range 1–4.
pub fn leg_score(posture: PostureCategory, knee_flexion_deg: f32) -> u8 {
    let base = match posture {
        PostureCategory::SittingOrWalking => return 1,
        PostureCategory::StandingBothLegs => 1,
        PostureCategory::StandingOneLeg => 2,
    };
    let knee = if knee_flexion_deg > 60.0 {
        2
    } else if knee_flexion_deg >= 30.0 {
        1
    } else {
        0
    };
    base + knee
}

/// Upper arm band from the shoulder angle alone, 1–4.
pub fn upper_arm_band(shoulder_deg: f32) -> u8 {
    if shoulder_deg <= 20.0 {
        1
    } else if shoulder_deg <= 45.0 {
        2
    } else if shoulder_deg <= 90.0 {
        3
    } else {
        4
    }
}

/// Upper arm: angle band plus abduction/rotation, shoulder elevation and
/// gravity-assist corrections, clamped to 1–6.
pub fn upper_arm_score(
    shoulder_deg: f32,
    upper_arm_correction: i8,
    shoulder_elevation: i8,
    gravity_assist: i8,
) -> u8 {
    let raw = i16::from(upper_arm_band(shoulder_deg))
        + i16::from(upper_arm_correction)
        + i16::from(shoulder_elevation)
        + i16::from(gravity_assist);
    raw.clamp(1, 6) as u8
}

/// Forearm: 1 for 60–100° of elbow flexion, else 2.
pub fn forearm_score(elbow_flexion_deg: f32) -> u8 {
    if (60.0..=100.0).contains(&elbow_flexion_deg) {
        1
    } else {
        2
    }
}

/// Wrist: 2 beyond 15° of deviation, else 1; plus the correction, clamped to 1–3.
pub fn wrist_score(wrist_deg: f32, wrist_correction: i8) -> u8 {
    let base: i16 = if wrist_deg > 15.0 { 2 } else { 1 };
    (base + i16::from(wrist_correction)).clamp(1, 3) as u8
}

/// Load/force: 0 below 5 kg, 1 for 5–10 kg, 2 above 10 kg; +1 for shock.
pub fn load_score(load_kg: f32, shock: bool) -> u8 {
    let base = if load_kg > 10.0 {
        2
    } else if load_kg >= 5.0 {
        1
    } else {
        0
    };
    base + u8::from(shock)
}

/// Activity: one point each for static holding, repetition and instability.
pub fn activity_score(static_posture: bool, repetitive: bool, unstable: bool) -> u8 {
    u8::from(static_posture) + u8::from(repetitive) + u8::from(unstable)
}
