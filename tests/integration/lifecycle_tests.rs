//! Integration tests for DetectorService setup and phase gating.
//!
//! Setup runs against mock storage and a stub engine; no real model or
//! TFLM runtime is involved.

use crate::mock_hw::{
    EngineMode, FakeClock, MockStorage, PERSON_OPS, RecordingResponder, RecordingSink,
    ScriptedCamera, StubEngine,
};

use persondetect::app::events::DetectorEvent;
use persondetect::app::ports::{EngineError, StorageError};
use persondetect::app::service::DetectorService;
use persondetect::config::DetectorConfig;
use persondetect::engine::DType;
use persondetect::error::SetupError;
use persondetect::lifecycle::PhaseId;
use persondetect::model::schema::BuiltinOperator;

fn service() -> DetectorService<StubEngine> {
    DetectorService::new(DetectorConfig::default())
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn valid_v3_model_reaches_ready_with_tensors() {
    let mut svc = service();
    let mut sink = RecordingSink::new();
    assert_eq!(svc.phase(), PhaseId::Uninitialized);

    svc.setup(
        &MockStorage::person_model(),
        StubEngine::new(EngineMode::Fixed(0, 0)),
        &mut sink,
    )
    .unwrap();

    assert_eq!(svc.phase(), PhaseId::Ready);
    let interp = svc.session().unwrap().interpreter();
    assert_eq!(interp.input().spec.dtype, DType::Int8);
    assert_eq!(interp.input().spec.element_count(), Some(96 * 96));
    assert_eq!(interp.output().spec.element_count(), Some(2));
    assert!(interp.arena_used_bytes() <= interp.arena_capacity());

    assert!(matches!(sink.events.first(), Some(DetectorEvent::SetupStarted { .. })));
    assert_eq!(
        sink.events.last(),
        Some(&DetectorEvent::PhaseChanged {
            from: PhaseId::Uninitialized,
            to: PhaseId::Ready
        })
    );
}

#[test]
fn second_setup_is_a_noop() {
    let mut svc = service();
    let mut sink = RecordingSink::new();
    let storage = MockStorage::person_model();
    svc.setup(&storage, StubEngine::new(EngineMode::Fixed(0, 0)), &mut sink)
        .unwrap();

    let second = StubEngine::new(EngineMode::Fixed(0, 0));
    let probe = second.probe();
    let events_before = sink.events.len();
    assert!(svc.setup(&storage, second, &mut sink).is_ok());

    assert_eq!(storage.reads.get(), 1, "model must be read once");
    assert_eq!(probe.prepares.get(), 0);
    assert_eq!(sink.events.len(), events_before);
    assert_eq!(svc.phase(), PhaseId::Ready);
}

// ── Setup failures ────────────────────────────────────────────

#[test]
fn version_mismatch_fails_without_engine_prepare() {
    let mut svc = service();
    let engine = StubEngine::new(EngineMode::Fixed(0, 0));
    let probe = engine.probe();

    let err = svc
        .setup(&MockStorage::with_model(2, &PERSON_OPS), engine, &mut RecordingSink::new())
        .unwrap_err();

    assert_eq!(
        err,
        SetupError::SchemaVersionMismatch {
            found: 2,
            expected: 3
        }
    );
    assert_eq!(svc.phase(), PhaseId::Failed);
    assert_eq!(svc.failure(), Some(err));
    assert_eq!(probe.prepares.get(), 0);
}

#[test]
fn unsupported_operator_fails_setup() {
    let mut svc = service();
    let mut ops = PERSON_OPS.to_vec();
    ops.push(BuiltinOperator::FULLY_CONNECTED);

    let err = svc
        .setup(
            &MockStorage::with_model(3, &ops),
            StubEngine::new(EngineMode::Fixed(0, 0)),
            &mut RecordingSink::new(),
        )
        .unwrap_err();

    assert_eq!(err, SetupError::UnsupportedOperator(9));
    assert_eq!(svc.phase(), PhaseId::Failed);
}

#[test]
fn missing_model_is_storage_failure() {
    let mut svc = service();
    let mut sink = RecordingSink::new();
    let err = svc
        .setup(
            &MockStorage::failing(StorageError::NotFound),
            StubEngine::new(EngineMode::Fixed(0, 0)),
            &mut sink,
        )
        .unwrap_err();

    assert_eq!(err, SetupError::StorageReadFailure(StorageError::NotFound));
    assert!(sink.events.contains(&DetectorEvent::SetupFailed(err)));
}

#[test]
fn garbage_model_is_malformed() {
    let mut svc = service();
    let err = svc
        .setup(
            &MockStorage::with_bytes(vec![0xde, 0xad, 0xbe, 0xef]),
            StubEngine::new(EngineMode::Fixed(0, 0)),
            &mut RecordingSink::new(),
        )
        .unwrap_err();
    assert_eq!(err, SetupError::MalformedModel);
}

#[test]
fn oversized_plan_exhausts_arena() {
    let mut svc = service();
    let mut engine = StubEngine::new(EngineMode::Fixed(0, 0));
    engine.scratch_bytes = 200 * 1024;

    let err = svc
        .setup(&MockStorage::person_model(), engine, &mut RecordingSink::new())
        .unwrap_err();

    match err {
        SetupError::ArenaExhausted { required, capacity } => {
            assert!(required > capacity);
            assert!(capacity <= 96 * 1024);
        }
        other => panic!("expected ArenaExhausted, got {other:?}"),
    }
}

#[test]
fn unrepresentable_scratch_request_fails_setup_cleanly() {
    let mut svc = service();
    let mut engine = StubEngine::new(EngineMode::Fixed(0, 0));
    engine.scratch_bytes = usize::MAX;
    let mut sink = RecordingSink::new();

    let err = svc.setup(&MockStorage::person_model(), engine, &mut sink).unwrap_err();

    assert!(matches!(
        err,
        SetupError::ArenaExhausted { required: usize::MAX, .. }
    ));
    assert_eq!(svc.phase(), PhaseId::Failed);
    assert_eq!(sink.count(|e| matches!(e, DetectorEvent::SetupFailed(_))), 1);
}

#[test]
fn engine_prepare_error_fails_setup() {
    let mut svc = service();
    let mut engine = StubEngine::new(EngineMode::Fixed(0, 0));
    engine.prepare_error = Some(EngineError::Status(-3));

    let err = svc
        .setup(&MockStorage::person_model(), engine, &mut RecordingSink::new())
        .unwrap_err();
    assert_eq!(err, SetupError::Engine(EngineError::Status(-3)));
}

#[test]
fn input_geometry_mismatch_fails_setup() {
    let mut svc = service();
    let mut engine = StubEngine::new(EngineMode::Fixed(0, 0));
    engine.input_dims = vec![1, 48, 48, 1];

    let err = svc
        .setup(&MockStorage::person_model(), engine, &mut RecordingSink::new())
        .unwrap_err();
    assert!(matches!(err, SetupError::TensorMismatch(_)));
}

#[test]
fn invalid_config_fails_before_reading_storage() {
    let config = DetectorConfig {
        category_count: 1,
        ..DetectorConfig::default()
    };
    let mut svc: DetectorService<StubEngine> = DetectorService::new(config);
    let storage = MockStorage::person_model();

    let err = svc
        .setup(&storage, StubEngine::new(EngineMode::Fixed(0, 0)), &mut RecordingSink::new())
        .unwrap_err();

    assert!(matches!(err, SetupError::InvalidConfig(_)));
    assert_eq!(storage.reads.get(), 0);
}

#[test]
fn failed_setup_is_never_retried() {
    let mut svc = service();
    let bad = MockStorage::with_model(4, &PERSON_OPS);
    let first = svc
        .setup(&bad, StubEngine::new(EngineMode::Fixed(0, 0)), &mut RecordingSink::new())
        .unwrap_err();

    let good = MockStorage::person_model();
    let engine = StubEngine::new(EngineMode::Fixed(0, 0));
    let probe = engine.probe();
    let again = svc.setup(&good, engine, &mut RecordingSink::new()).unwrap_err();

    assert_eq!(first, again);
    assert_eq!(good.reads.get(), 0);
    assert_eq!(probe.prepares.get(), 0);
    assert_eq!(svc.phase(), PhaseId::Failed);
}

// ── Phase gating ──────────────────────────────────────────────

#[test]
fn run_cycle_before_setup_does_nothing() {
    let mut svc = service();
    let mut camera = ScriptedCamera::new(0);
    let mut responder = RecordingResponder::default();
    let clock = FakeClock::new(10);

    let report = svc.run_cycle(&mut camera, &mut responder, &clock, &mut RecordingSink::new());

    assert!(report.is_none());
    assert!(camera.calls.is_empty());
    assert!(responder.calls.is_empty());
    assert_eq!(clock.reads.get(), 0);
}

#[test]
fn failed_controller_stops_producing_inferences() {
    let mut svc = service();
    let engine = StubEngine::new(EngineMode::Fixed(1, 1));
    let probe = engine.probe();
    let _ = svc.setup(&MockStorage::with_model(1, &PERSON_OPS), engine, &mut RecordingSink::new());

    let mut camera = ScriptedCamera::new(0);
    let mut responder = RecordingResponder::default();
    for _ in 0..5 {
        assert!(
            svc.run_cycle(&mut camera, &mut responder, &FakeClock::new(1), &mut RecordingSink::new())
                .is_none()
        );
    }
    assert!(camera.calls.is_empty());
    assert!(responder.calls.is_empty());
    assert_eq!(probe.invokes.get(), 0);
}
