//! Offline replay of a recorded frame log through a [`Session`].
//!
//! ```json
//! { "calibInputs": { "filmingSide": "left", ... },
//!   "frames": [ { "t_ms": 0, "landmarks": [ ... ] }, ... ] }
//! ```

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use reba_core::LandmarkSet;
use reba_score::{CalibrationRecord, RebaIoError, RebaRequest};
use serde::{Deserialize, Serialize};

use crate::backend::ScoringBackend;
use crate::session::{FrameOutcome, Session, TickOutcome, TrendSnapshot};

/// One captured frame with its capture time relative to the log start.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggedFrame {
    pub t_ms: u64,
    pub landmarks: LandmarkSet,
}

/// A recorded session: fixed calibration plus timestamped frames.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameLog {
    #[serde(default)]
    pub calib_inputs: CalibrationRecord,
    #[serde(default)]
    pub frames: Vec<LoggedFrame>,
}

impl FrameLog {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, RebaIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Per-outcome frame counts and the final trend state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub frames: usize,
    pub scored: usize,
    pub throttled: usize,
    pub failed: usize,
    pub stale: usize,
    pub trend: Option<TrendSnapshot>,
}

/// Restart `session` and feed it every frame of `log` in order.
///
/// The session is left stopped afterwards.
pub fn replay<B: ScoringBackend>(session: &mut Session<B>, log: &FrameLog) -> ReplayReport {
    let origin = Instant::now();
    let mut report = ReplayReport {
        frames: log.frames.len(),
        ..ReplayReport::default()
    };

    session.start();
    for frame in &log.frames {
        let request = RebaRequest {
            landmarks: frame.landmarks.clone(),
            calib_inputs: log.calib_inputs.clone(),
        };
        let now = origin + Duration::from_millis(frame.t_ms);
        match session.on_frame(now, &request) {
            FrameOutcome::Throttled => report.throttled += 1,
            FrameOutcome::Tick(TickOutcome::Recorded { .. }) => report.scored += 1,
            FrameOutcome::Tick(TickOutcome::Failed(_)) => report.failed += 1,
            FrameOutcome::Tick(TickOutcome::Stale) => report.stale += 1,
            FrameOutcome::Stopped => {}
        }
    }
    session.stop();

    report.trend = Some(session.tracker().snapshot());
    report
}
