//! Integration tests for the steady-state capture → invoke → respond loop.

use crate::mock_hw::{
    EngineMode, FakeClock, MockStorage, RecordingResponder, RecordingSink, ScriptedCamera,
    StubEngine,
};

use persondetect::app::events::DetectorEvent;
use persondetect::app::ports::{CaptureError, EngineError};
use persondetect::app::service::DetectorService;
use persondetect::config::DetectorConfig;
use persondetect::error::CycleError;
use persondetect::lifecycle::PhaseId;
use persondetect::pipeline::{CycleOutcome, DetectionScores};

fn ready_service(engine: StubEngine) -> DetectorService<StubEngine> {
    ready_service_with(DetectorConfig::default(), engine)
}

fn ready_service_with(config: DetectorConfig, engine: StubEngine) -> DetectorService<StubEngine> {
    let mut svc = DetectorService::new(config);
    svc.setup(&MockStorage::person_model(), engine, &mut RecordingSink::new())
        .unwrap();
    svc
}

// ── End to end ────────────────────────────────────────────────

#[test]
fn fixed_scores_are_delivered_every_cycle() {
    let mut svc = ready_service(StubEngine::new(EngineMode::Fixed(100, -20)));
    let mut camera = ScriptedCamera::new(0);
    let mut responder = RecordingResponder::default();
    let clock = FakeClock::new(3);
    let mut sink = RecordingSink::new();

    for cycle in 1..=10 {
        let report = svc
            .run_cycle(&mut camera, &mut responder, &clock, &mut sink)
            .unwrap();
        assert_eq!(report.cycle, cycle);
        assert_eq!(
            report.outcome,
            CycleOutcome::Responded(DetectionScores {
                person: 100,
                not_person: -20
            })
        );
        assert_eq!(svc.phase(), PhaseId::Ready);
    }

    assert_eq!(responder.calls, vec![(100, -20); 10]);
    assert_eq!(camera.calls, vec![(96, 96, 1); 10]);
}

#[test]
fn echo_round_trip_delivers_scores_unmodified() {
    let mut svc = ready_service(StubEngine::new(EngineMode::Echo));
    // ScriptedCamera writes fill + i, so output[0] = -128, output[1] = -127.
    let mut camera = ScriptedCamera::new(-128);
    let mut responder = RecordingResponder::default();

    svc.run_cycle(&mut camera, &mut responder, &FakeClock::new(1), &mut RecordingSink::new())
        .unwrap();

    assert_eq!(responder.calls, [(-127, -128)]);
}

#[test]
fn negative_scores_are_read_signed() {
    let mut svc = ready_service(StubEngine::new(EngineMode::Fixed(-128, 127)));
    let mut responder = RecordingResponder::default();
    svc.run_cycle(
        &mut ScriptedCamera::new(0),
        &mut responder,
        &FakeClock::new(1),
        &mut RecordingSink::new(),
    )
    .unwrap();
    assert_eq!(responder.calls, [(-128, 127)]);
}

// ── Capture failure ───────────────────────────────────────────

#[test]
fn capture_failure_still_invokes_and_responds() {
    let engine = StubEngine::new(EngineMode::Fixed(5, 6));
    let probe = engine.probe();
    let mut svc = ready_service(engine);
    let mut camera = ScriptedCamera::scripted(0, [Some(CaptureError::Timeout)]);
    let mut responder = RecordingResponder::default();
    let mut sink = RecordingSink::new();

    let report = svc
        .run_cycle(&mut camera, &mut responder, &FakeClock::new(1), &mut sink)
        .unwrap();

    assert_eq!(report.capture, Err(CaptureError::Timeout));
    assert_eq!(probe.invokes.get(), 1);
    assert_eq!(responder.calls, [(5, 6)]);
    assert_eq!(
        report.errors().as_slice(),
        [CycleError::CaptureFailure(CaptureError::Timeout)]
    );
    assert!(sink.events.contains(&DetectorEvent::CaptureFailed(CaptureError::Timeout)));
    assert_eq!(svc.phase(), PhaseId::Ready);
}

#[test]
fn capture_failure_invokes_on_previous_frame() {
    let mut svc = ready_service(StubEngine::new(EngineMode::Echo));
    let mut camera = ScriptedCamera::scripted(10, [None, Some(CaptureError::Driver(-1))]);
    let mut responder = RecordingResponder::default();
    let clock = FakeClock::new(1);
    let mut sink = RecordingSink::new();

    svc.run_cycle(&mut camera, &mut responder, &clock, &mut sink);
    camera.fill = 50;
    svc.run_cycle(&mut camera, &mut responder, &clock, &mut sink);

    // Second capture failed, so invoke saw the first frame again.
    assert_eq!(responder.calls, [(11, 10), (11, 10)]);
}

// ── Invoke failure ────────────────────────────────────────────

#[test]
fn invoke_failure_skips_response_for_that_cycle_only() {
    let mut engine = StubEngine::new(EngineMode::Fixed(100, -20));
    engine.invoke_failures = [false, true, false].into_iter().collect();
    let mut svc = ready_service(engine);
    let mut camera = ScriptedCamera::new(0);
    let mut responder = RecordingResponder::default();
    let mut sink = RecordingSink::new();
    let clock = FakeClock::new(1);

    let reports: Vec<_> = (0..3)
        .map(|_| {
            svc.run_cycle(&mut camera, &mut responder, &clock, &mut sink)
                .unwrap()
        })
        .collect();

    assert_eq!(responder.calls, [(100, -20), (100, -20)]);
    assert_eq!(camera.calls.len(), 3, "cycle after failure captures again");
    assert_eq!(
        reports[1].outcome,
        CycleOutcome::InvokeFailed(EngineError::Status(1))
    );
    assert_eq!(reports[1].postprocessing_us, None);
    assert!(reports[2].postprocessing_us.is_some());
    assert_eq!(
        sink.count(|e| matches!(e, DetectorEvent::InvokeFailed(_))),
        1
    );
    assert_eq!(svc.phase(), PhaseId::Ready);
}

// ── Timing and stats ──────────────────────────────────────────

#[test]
fn every_stage_is_timed_from_the_clock() {
    let mut svc = ready_service(StubEngine::new(EngineMode::Fixed(1, 2)));
    let clock = FakeClock::new(25);

    let report = svc
        .run_cycle(
            &mut ScriptedCamera::new(0),
            &mut RecordingResponder::default(),
            &clock,
            &mut RecordingSink::new(),
        )
        .unwrap();

    assert_eq!(report.preprocessing_us, 25);
    assert_eq!(report.inference_us, 25);
    assert_eq!(report.postprocessing_us, Some(25));
    assert_eq!(clock.reads.get(), 6);
}

#[test]
fn stats_accumulate_and_summarise_on_interval() {
    let config = DetectorConfig {
        stats_report_interval: 3,
        ..DetectorConfig::default()
    };
    let mut engine = StubEngine::new(EngineMode::Fixed(1, 2));
    engine.invoke_failures = [false, false, true].into_iter().collect();
    let mut svc = ready_service_with(config, engine);
    let mut camera = ScriptedCamera::scripted(0, [Some(CaptureError::Timeout)]);
    let mut sink = RecordingSink::new();
    let clock = FakeClock::new(2);

    for _ in 0..6 {
        svc.run_cycle(&mut camera, &mut RecordingResponder::default(), &clock, &mut sink);
    }

    let stats = svc.session().unwrap().stats();
    assert_eq!(stats.cycles, 6);
    assert_eq!(stats.capture_failures, 1);
    assert_eq!(stats.invoke_failures, 1);
    assert_eq!(stats.responses, 5);
    assert_eq!(stats.inference.samples, 6);
    assert_eq!(stats.postprocessing.samples, 5);
    assert_eq!(stats.inference.mean_us(), 2);

    let summaries: Vec<u64> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            DetectorEvent::StatsSummary(s) => Some(s.cycles),
            _ => None,
        })
        .collect();
    assert_eq!(summaries, [3, 6]);
}
