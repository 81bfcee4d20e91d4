//! REBA scoring pipeline.
//!
//! Angles and calibration go in; Group A (trunk, neck, legs, load), Group B
//! (arms, wrist, coupling), Table C, the activity score and the risk level come
//! out.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::RequestError;
pub use params::{ArmPolicy, RebaParams};
pub use pipeline::{group_a_score, group_b_score, score_frame, RebaEngine};
pub use result::{ScoreResult, SubScores};
