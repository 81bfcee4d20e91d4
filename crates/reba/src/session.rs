//! Live scoring session: frame throttle, trend buffer and running maximum.
//!
//! A [`Session`] is driven by the frame callback. Each admitted frame opens a
//! tick ([`Session::begin_tick`]); its result is applied with
//! [`Session::complete_tick`]. When scoring runs remotely the two halves can be
//! split, and a result that lands after a newer tick has begun is dropped.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use reba_score::{RebaRequest, RebaResponse, RiskLevel};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::backend::{BackendError, ScoringBackend};

/// Session configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionParams {
    /// Minimum spacing between scoring ticks.
    pub throttle_interval_ms: u64,
    /// Number of samples kept in the trend buffer.
    pub trend_capacity: usize,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            throttle_interval_ms: 500,
            trend_capacity: 60,
        }
    }
}

impl SessionParams {
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_interval_ms)
    }
}

/// One scored tick as kept in the trend buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSample {
    pub sequence: u64,
    pub final_score: u8,
    pub score_a: u8,
    pub score_b: u8,
}

impl TrendSample {
    pub fn from_response(sequence: u64, response: &RebaResponse) -> Self {
        Self {
            sequence,
            final_score: response.final_score,
            score_a: response.intermediate_scores.score_a,
            score_b: response.intermediate_scores.score_b,
        }
    }
}

/// Serializable view of a [`TrendTracker`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub current_max: u8,
    /// Risk level of `current_max`; absent before the first sample.
    pub risk_level: Option<RiskLevel>,
    pub samples: Vec<TrendSample>,
}

/// Running maximum plus a bounded FIFO of recent samples.
#[derive(Clone, Debug)]
pub struct TrendTracker {
    capacity: usize,
    samples: VecDeque<TrendSample>,
    current_max: u8,
}

impl Default for TrendTracker {
    fn default() -> Self {
        Self::new(SessionParams::default().trend_capacity)
    }
}

impl TrendTracker {
    /// A tracker keeping at most `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
            current_max: 0,
        }
    }

    /// Forget every sample and zero the maximum.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.current_max = 0;
    }

    /// Append a sample, evicting the oldest when full.
    ///
    /// Returns `true` when the sample raised the running maximum.
    pub fn push(&mut self, sample: TrendSample) -> bool {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        if sample.final_score > self.current_max {
            self.current_max = sample.final_score;
            true
        } else {
            false
        }
    }

    /// Highest final score since the last reset, 0 before any sample.
    #[inline]
    pub fn current_max(&self) -> u8 {
        self.current_max
    }

    pub fn current_risk(&self) -> Option<RiskLevel> {
        (self.current_max > 0).then(|| RiskLevel::from_score(self.current_max))
    }

    /// Buffered samples, oldest first.
    pub fn samples(&self) -> impl ExactSizeIterator<Item = &TrendSample> + '_ {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&TrendSample> {
        self.samples.back()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn snapshot(&self) -> TrendSnapshot {
        TrendSnapshot {
            current_max: self.current_max,
            risk_level: self.current_risk(),
            samples: self.samples.iter().copied().collect(),
        }
    }
}

/// Admits at most one frame per interval.
#[derive(Clone, Debug)]
pub struct FrameThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl FrameThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Whether a frame arriving at `now` should be scored.
    ///
    /// The first frame is always admitted; afterwards a frame must be at
    /// least `interval` after the last admitted one.
    pub fn admit(&mut self, now: Instant) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Handle for an in-flight scoring tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickId {
    generation: u32,
    sequence: u64,
}

impl TickId {
    /// Position of the tick within its session, starting at 0.
    #[inline]
    pub fn sequence(self) -> u64 {
        self.sequence
    }
}

/// What happened to a completed tick.
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// The tracker was updated.
    Recorded {
        sample: TrendSample,
        new_max: bool,
        response: RebaResponse,
    },
    /// A newer tick had already begun, the tick was already completed, or the
    /// session was restarted or stopped.
    Stale,
    /// Scoring failed; tracker state is unchanged.
    Failed(BackendError),
}

/// What happened to a frame handed to [`Session::on_frame`].
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    /// The session is not running.
    Stopped,
    /// Too soon after the previous tick.
    Throttled,
    Tick(TickOutcome),
}

/// A scoring session over one backend.
pub struct Session<B> {
    backend: B,
    params: SessionParams,
    throttle: FrameThrottle,
    tracker: TrendTracker,
    running: bool,
    generation: u32,
    next_sequence: u64,
    latest_begun: Option<u64>,
}

impl<B: ScoringBackend> Session<B> {
    /// A stopped session; call [`Session::start`] before feeding frames.
    pub fn new(backend: B, params: SessionParams) -> Self {
        Self {
            throttle: FrameThrottle::new(params.throttle_interval()),
            tracker: TrendTracker::new(params.trend_capacity),
            backend,
            params,
            running: false,
            generation: 0,
            next_sequence: 0,
            latest_begun: None,
        }
    }

    /// Start (or restart) the session with empty trend state.
    pub fn start(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.tracker.reset();
        self.throttle.reset();
        self.next_sequence = 0;
        self.latest_begun = None;
        self.running = true;
        info!("session started");
    }

    /// Stop scoring. Trend state is kept for inspection until the next start.
    pub fn stop(&mut self) {
        if self.running {
            info!(
                "session stopped after {} ticks, max score {}",
                self.next_sequence,
                self.tracker.current_max()
            );
        }
        self.running = false;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tracker(&self) -> &TrendTracker {
        &self.tracker
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Open a tick for a frame arriving at `now`.
    ///
    /// `None` when the session is stopped or the throttle rejects the frame.
    pub fn begin_tick(&mut self, now: Instant) -> Option<TickId> {
        if !self.running || !self.throttle.admit(now) {
            return None;
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.latest_begun = Some(sequence);
        Some(TickId {
            generation: self.generation,
            sequence,
        })
    }

    /// Apply the result of tick `id` to the tracker.
    pub fn complete_tick(
        &mut self,
        id: TickId,
        result: Result<RebaResponse, BackendError>,
    ) -> TickOutcome {
        let current = self.running
            && id.generation == self.generation
            && self.latest_begun == Some(id.sequence);
        if !current {
            debug!("dropping stale tick {}", id.sequence);
            return TickOutcome::Stale;
        }
        self.latest_begun = None;
        match result {
            Ok(response) => {
                let sample = TrendSample::from_response(id.sequence, &response);
                let new_max = self.tracker.push(sample);
                if new_max {
                    info!(
                        "new session max {} ({})",
                        sample.final_score, response.risk_level
                    );
                }
                TickOutcome::Recorded {
                    sample,
                    new_max,
                    response,
                }
            }
            Err(err) => {
                warn!("tick {} failed: {err}", id.sequence);
                TickOutcome::Failed(err)
            }
        }
    }

    /// Throttle, score and record one frame synchronously.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn on_frame(&mut self, now: Instant, request: &RebaRequest) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Stopped;
        }
        let Some(id) = self.begin_tick(now) else {
            return FrameOutcome::Throttled;
        };
        let result = self.backend.score(request);
        FrameOutcome::Tick(self.complete_tick(id, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reba_score::IntermediateScores;
    use std::cell::RefCell;

    fn response(final_score: u8) -> RebaResponse {
        RebaResponse {
            final_score,
            risk_level: RiskLevel::from_score(final_score),
            intermediate_scores: IntermediateScores {
                score_a: final_score,
                score_b: 1,
                ..IntermediateScores::default()
            },
            computed_angles: None,
            fallbacks: Vec::new(),
        }
    }

    fn sample(sequence: u64, final_score: u8) -> TrendSample {
        TrendSample {
            sequence,
            final_score,
            score_a: final_score,
            score_b: 1,
        }
    }

    /// Replays a scripted list of results.
    struct Scripted(RefCell<VecDeque<Result<RebaResponse, BackendError>>>);

    impl Scripted {
        fn new(results: Vec<Result<RebaResponse, BackendError>>) -> Self {
            Self(RefCell::new(results.into()))
        }
    }

    impl ScoringBackend for Scripted {
        fn score(&self, _: &RebaRequest) -> Result<RebaResponse, BackendError> {
            self.0
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(BackendError::Unavailable("script exhausted".into())))
        }
    }

    fn fast_params() -> SessionParams {
        SessionParams {
            throttle_interval_ms: 500,
            trend_capacity: 3,
        }
    }

    #[test]
    fn tracker_max_is_monotonic_and_resets() {
        let mut t = TrendTracker::new(10);
        assert_eq!(t.current_max(), 0);
        assert_eq!(t.current_risk(), None);
        assert!(t.push(sample(0, 4)));
        assert!(!t.push(sample(1, 2)));
        assert!(t.push(sample(2, 9)));
        assert!(!t.push(sample(3, 9)));
        assert_eq!(t.current_max(), 9);
        assert_eq!(t.current_risk(), Some(RiskLevel::High));
        t.reset();
        assert_eq!(t.current_max(), 0);
        assert_eq!(t.samples().len(), 0);
    }

    #[test]
    fn tracker_evicts_oldest_at_capacity() {
        let mut t = TrendTracker::new(3);
        for (seq, score) in [(0, 1), (1, 5), (2, 2), (3, 3)] {
            t.push(sample(seq, score));
        }
        let seqs: Vec<u64> = t.samples().map(|s| s.sequence).collect();
        assert_eq!(seqs, [1, 2, 3]);
        assert_eq!(t.latest().map(|s| s.sequence), Some(3));
        // The evicted sample no longer counts, but the max it set stays.
        t.push(sample(4, 1));
        assert_eq!(t.current_max(), 5);
        assert!(t.samples().all(|s| s.final_score != 5));
    }

    #[test]
    fn zero_capacity_keeps_one_sample() {
        let mut t = TrendTracker::new(0);
        t.push(sample(0, 3));
        t.push(sample(1, 2));
        assert_eq!(t.capacity(), 1);
        assert_eq!(t.samples().len(), 1);
    }

    #[test]
    fn throttle_spaces_admitted_frames() {
        let t0 = Instant::now();
        let ms = |n| t0 + Duration::from_millis(n);
        let mut th = FrameThrottle::new(Duration::from_millis(500));
        let admitted: Vec<u64> = [0, 16, 499, 500, 700, 1001, 1200]
            .into_iter()
            .filter(|&n| th.admit(ms(n)))
            .collect();
        assert_eq!(admitted, [0, 500, 1001]);

        th.reset();
        assert!(th.admit(ms(1002)));
    }

    #[test]
    fn stopped_session_scores_nothing() {
        let mut s = Session::new(Scripted::new(vec![Ok(response(3))]), fast_params());
        let now = Instant::now();
        assert_eq!(s.on_frame(now, &RebaRequest::default()), FrameOutcome::Stopped);
        assert!(s.begin_tick(now).is_none());

        s.start();
        assert!(matches!(
            s.on_frame(now, &RebaRequest::default()),
            FrameOutcome::Tick(TickOutcome::Recorded { new_max: true, .. })
        ));
        s.stop();
        assert!(!s.is_running());
        assert_eq!(
            s.on_frame(now + Duration::from_secs(5), &RebaRequest::default()),
            FrameOutcome::Stopped
        );
        assert_eq!(s.tracker().current_max(), 3);
    }

    #[test]
    fn failed_tick_leaves_state_untouched() {
        let script = vec![
            Ok(response(4)),
            Err(BackendError::Timeout),
            Ok(response(2)),
        ];
        let mut s = Session::new(Scripted::new(script), fast_params());
        s.start();
        let t0 = Instant::now();
        let req = RebaRequest::default();

        s.on_frame(t0, &req);
        let before = s.tracker().snapshot();
        assert_eq!(
            s.on_frame(t0 + Duration::from_millis(500), &req),
            FrameOutcome::Tick(TickOutcome::Failed(BackendError::Timeout))
        );
        assert_eq!(s.tracker().snapshot(), before);

        assert_eq!(
            s.on_frame(t0 + Duration::from_millis(600), &req),
            FrameOutcome::Throttled
        );
        s.on_frame(t0 + Duration::from_millis(1000), &req);
        let scores: Vec<u8> = s.tracker().samples().map(|x| x.final_score).collect();
        assert_eq!(scores, [4, 2]);
        assert_eq!(s.tracker().current_max(), 4);
    }

    #[test]
    fn late_result_of_older_tick_is_dropped() {
        let mut s = Session::new(Scripted::new(Vec::new()), fast_params());
        s.start();
        let t0 = Instant::now();
        let first = s.begin_tick(t0).expect("first tick");
        let second = s
            .begin_tick(t0 + Duration::from_millis(500))
            .expect("second tick");

        assert!(matches!(
            s.complete_tick(second, Ok(response(2))),
            TickOutcome::Recorded { .. }
        ));
        assert_eq!(s.complete_tick(first, Ok(response(9))), TickOutcome::Stale);
        assert_eq!(s.complete_tick(second, Ok(response(9))), TickOutcome::Stale);
        assert_eq!(s.tracker().current_max(), 2);
    }

    #[test]
    fn restart_resets_trend_and_orphans_open_ticks() {
        let mut s = Session::new(Scripted::new(vec![Ok(response(7))]), fast_params());
        s.start();
        let t0 = Instant::now();
        s.on_frame(t0, &RebaRequest::default());
        let open = s.begin_tick(t0 + Duration::from_secs(1)).expect("tick");
        assert_eq!(s.tracker().current_max(), 7);

        s.start();
        assert_eq!(s.tracker().current_max(), 0);
        assert_eq!(s.tracker().samples().len(), 0);
        assert_eq!(s.complete_tick(open, Ok(response(12))), TickOutcome::Stale);

        // Throttle was reset too: the first frame after restart is admitted.
        let id = s.begin_tick(t0 + Duration::from_secs(1)).expect("tick");
        assert_eq!(id.sequence(), 0);
    }
}
