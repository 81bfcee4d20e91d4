use approx::assert_abs_diff_eq;
use reba::{
    replay, FrameLog, FrameOutcome, InProcessBackend, RebaRequest, RiskLevel, Session,
    SessionParams, TickOutcome,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

fn testdata_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata")
        .join(name)
}

#[test]
fn replayed_log_tracks_max_and_skips_bad_frames() {
    let log = FrameLog::load_json(testdata_path("session_frames.json")).expect("frame log");
    let mut session = Session::new(InProcessBackend::default(), SessionParams::default());
    let report = replay(&mut session, &log);

    assert_eq!(report.frames, 5);
    assert_eq!(report.throttled, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.scored, 3);
    assert_eq!(report.stale, 0);

    let trend = report.trend.expect("trend");
    assert_eq!(trend.current_max, 2);
    assert_eq!(trend.risk_level, Some(RiskLevel::Low));
    let seq: Vec<(u64, u8)> = trend
        .samples
        .iter()
        .map(|s| (s.sequence, s.final_score))
        .collect();
    assert_eq!(seq, [(0, 1), (1, 2), (3, 1)]);
}

#[test]
fn live_session_reports_angles_per_tick() {
    let bend = RebaRequest::load_json(testdata_path("forward_bend.json")).expect("request");
    let mut session = Session::new(InProcessBackend::default(), SessionParams::default());
    session.start();

    let t0 = Instant::now();
    match session.on_frame(t0, &bend) {
        FrameOutcome::Tick(TickOutcome::Recorded {
            sample,
            new_max,
            response,
        }) => {
            assert!(new_max);
            assert_eq!(sample.sequence, 0);
            assert_eq!(sample.final_score, 2);
            let angles = response.computed_angles.expect("angles");
            assert_abs_diff_eq!(angles.trunk_flexion, 40.0, epsilon = 0.5);
            assert_abs_diff_eq!(angles.neck, 0.0, epsilon = 0.5);
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    // 60 fps: every frame inside the interval is throttled.
    for i in 1..30 {
        let now = t0 + Duration::from_millis(i * 16);
        assert_eq!(session.on_frame(now, &bend), FrameOutcome::Throttled);
    }
    assert_eq!(session.tracker().samples().len(), 1);
}

#[test]
fn trend_buffer_is_bounded_by_config() {
    let req = RebaRequest::load_json(testdata_path("neutral_standing.json")).expect("request");
    let params = SessionParams {
        throttle_interval_ms: 500,
        trend_capacity: 4,
    };
    let mut session = Session::new(InProcessBackend::default(), params);
    session.start();
    let t0 = Instant::now();
    for i in 0..10 {
        session.on_frame(t0 + Duration::from_millis(i * 500), &req);
    }
    let seqs: Vec<u64> = session.tracker().samples().map(|s| s.sequence).collect();
    assert_eq!(seqs, [6, 7, 8, 9]);
    assert_eq!(session.tracker().current_max(), 1);
}
