//! High-level facade for the `reba-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometry (`reba-core`) and scoring (`reba-score`) crates
//! - a live [`Session`] with frame throttling, a bounded trend buffer and a
//!   running maximum
//! - pluggable [`ScoringBackend`]s, with [`InProcessBackend`] as the default
//! - JSON config ([`RebaConfig`]) and offline frame-log [`replay`]
//!
//! ## Quickstart
//!
//! ```no_run
//! use reba::{InProcessBackend, RebaRequest, Session, SessionParams};
//! use std::time::Instant;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = RebaRequest::load_json("frame.json")?;
//! let mut session = Session::new(InProcessBackend::default(), SessionParams::default());
//! session.start();
//! let outcome = session.on_frame(Instant::now(), &request);
//! println!("{outcome:?}, max so far {}", session.tracker().current_max());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `reba::core`: landmarks, geometry, joint-angle extraction, logger.
//! - `reba::score`: calibration inputs, REBA tables, engine, wire types.
//! - `reba::session`: throttle, trend tracker, session state.
//! - `reba::backend`: scoring backends.

pub use reba_core as core;
pub use reba_score as score;

pub use reba_core::{
    extract_joint_angles, init_with_level, JointAngles, LandmarkPoint, LandmarkSet, Side,
};
pub use reba_score::{
    CalibrationInput, CalibrationRecord, PostureCategory, RebaEngine, RebaParams, RebaRequest,
    RebaResponse, RiskLevel, ScoreResult,
};

pub mod backend;
pub mod config;
pub mod replay;
pub mod session;

pub use backend::{BackendError, InProcessBackend, ScoringBackend};
pub use config::RebaConfig;
pub use replay::{replay, FrameLog, LoggedFrame, ReplayReport};
pub use session::{
    FrameOutcome, FrameThrottle, Session, SessionParams, TickId, TickOutcome, TrendSample,
    TrendSnapshot, TrendTracker,
};

/// Install a `tracing` subscriber and route `log` records into it.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    reba_core::init_tracing(json);
    // Already installed when tracing-subscriber was built with `tracing-log`.
    let _ = tracing_log::LogTracer::init();
}
