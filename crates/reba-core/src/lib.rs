//! Core types for REBA posture scoring.
//!
//! This crate is purely geometric: it knows the pose landmark schema and
//! turns one frame of landmarks into joint angles. Scoring lives in
//! `reba-score`.

mod angles;
mod geometry;
mod landmark;
mod logger;

pub use angles::{extract_joint_angles, ExtractError, ExtractParams, JointAngles};
pub use geometry::{
    angle_between_deg, angle_from_vertical_deg, image_up, line_angle_deg, signed_angle_diff_deg,
    vertex_angle_deg,
};
pub use landmark::{LandmarkPoint, LandmarkSet, PoseLandmark, Side, POSE_LANDMARK_COUNT};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
