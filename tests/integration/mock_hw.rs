//! Mock adapters for integration tests.
//!
//! Every mock records its calls so tests can assert on the full
//! interaction history without a camera, flash or TFLM runtime.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use persondetect::app::events::DetectorEvent;
use persondetect::app::ports::{
    CaptureError, Clock, DetectionResponder, EngineError, EventSink, GraphEngine, ImageSource,
    StorageError, StoragePort, TensorIo, TensorPlan,
};
use persondetect::config::{MODEL_PATH, NOT_A_PERSON_INDEX, PERSON_INDEX};
use persondetect::engine::{OpKind, QuantParams, TensorSpec};
use persondetect::model::schema::{self, BuiltinOperator};

pub const Q: QuantParams = QuantParams {
    scale: 1.0 / 256.0,
    zero_point: -128,
};

/// The five operator codes of the person-detection graph.
pub const PERSON_OPS: [BuiltinOperator; 5] = [
    BuiltinOperator::CONV_2D,
    BuiltinOperator::DEPTHWISE_CONV_2D,
    BuiltinOperator::AVERAGE_POOL_2D,
    BuiltinOperator::RESHAPE,
    BuiltinOperator::SOFTMAX,
];

// ── Storage ───────────────────────────────────────────────────

pub struct MockStorage {
    pub result: Result<Vec<u8>, StorageError>,
    pub reads: Cell<u32>,
}

#[allow(dead_code)]
impl MockStorage {
    pub fn with_model(version: u32, ops: &[BuiltinOperator]) -> Self {
        Self::with_bytes(schema::build_header(version, ops))
    }

    pub fn person_model() -> Self {
        Self::with_model(3, &PERSON_OPS)
    }

    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            result: Ok(bytes),
            reads: Cell::new(0),
        }
    }

    pub fn failing(e: StorageError) -> Self {
        Self {
            result: Err(e),
            reads: Cell::new(0),
        }
    }
}

impl StoragePort for MockStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.reads.set(self.reads.get() + 1);
        if path != MODEL_PATH {
            return Err(StorageError::NotFound);
        }
        self.result.clone()
    }
}

// ── Camera ────────────────────────────────────────────────────

/// Fills every frame with `fill`; pops scripted failures first.
pub struct ScriptedCamera {
    pub fill: i8,
    pub failures: VecDeque<Option<CaptureError>>,
    pub calls: Vec<(usize, usize, usize)>,
}

#[allow(dead_code)]
impl ScriptedCamera {
    pub fn new(fill: i8) -> Self {
        Self {
            fill,
            failures: VecDeque::new(),
            calls: Vec::new(),
        }
    }

    /// `None` entries succeed; `Some(e)` entries fail without touching the buffer.
    pub fn scripted(fill: i8, script: impl IntoIterator<Item = Option<CaptureError>>) -> Self {
        Self {
            failures: script.into_iter().collect(),
            ..Self::new(fill)
        }
    }
}

impl ImageSource for ScriptedCamera {
    fn capture(
        &mut self,
        cols: usize,
        rows: usize,
        channels: usize,
        out: &mut [i8],
    ) -> Result<(), CaptureError> {
        self.calls.push((cols, rows, channels));
        if let Some(Some(e)) = self.failures.pop_front() {
            return Err(e);
        }
        for (i, px) in out.iter_mut().enumerate() {
            *px = self.fill.wrapping_add(i as i8);
        }
        Ok(())
    }
}

// ── Engine ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub enum EngineMode {
    /// Write `(person, not_person)` at the configured indices.
    Fixed(i8, i8),
    /// Copy `input[i]` to `output[i]` for every output element.
    Echo,
}

/// Shared call counters; survive the engine being moved into the service.
#[derive(Debug, Default, Clone)]
pub struct EngineProbe {
    pub prepares: Rc<Cell<u32>>,
    pub invokes: Rc<Cell<u32>>,
}

pub struct StubEngine {
    pub mode: EngineMode,
    pub input_dims: Vec<usize>,
    pub output_dims: Vec<usize>,
    pub scratch_bytes: usize,
    /// Per-invoke failure script; exhausted entries succeed.
    pub invoke_failures: VecDeque<bool>,
    pub prepare_error: Option<EngineError>,
    pub probe: EngineProbe,
}

#[allow(dead_code)]
impl StubEngine {
    pub fn new(mode: EngineMode) -> Self {
        Self {
            mode,
            input_dims: vec![1, 96, 96, 1],
            output_dims: vec![1, 2],
            scratch_bytes: 16 * 1024,
            invoke_failures: VecDeque::new(),
            prepare_error: None,
            probe: EngineProbe::default(),
        }
    }

    pub fn probe(&self) -> EngineProbe {
        self.probe.clone()
    }
}

impl GraphEngine for StubEngine {
    fn prepare(&mut self, _model: &[u8], _ops: &[OpKind]) -> Result<TensorPlan, EngineError> {
        self.probe.prepares.set(self.probe.prepares.get() + 1);
        if let Some(e) = self.prepare_error {
            return Err(e);
        }
        Ok(TensorPlan {
            input: TensorSpec::int8(&self.input_dims, Q).ok_or(EngineError::Rejected("rank"))?,
            output: TensorSpec::int8(&self.output_dims, Q).ok_or(EngineError::Rejected("rank"))?,
            scratch_bytes: self.scratch_bytes,
        })
    }

    fn invoke(&mut self, io: TensorIo<'_>) -> Result<(), EngineError> {
        self.probe.invokes.set(self.probe.invokes.get() + 1);
        if self.invoke_failures.pop_front().unwrap_or(false) {
            return Err(EngineError::Status(1));
        }
        match self.mode {
            EngineMode::Fixed(person, not_person) => {
                io.output[PERSON_INDEX] = person;
                io.output[NOT_A_PERSON_INDEX] = not_person;
            }
            EngineMode::Echo => {
                let n = io.output.len().min(io.input.len());
                io.output[..n].copy_from_slice(&io.input[..n]);
            }
        }
        Ok(())
    }
}

// ── Responder ─────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingResponder {
    pub calls: Vec<(i8, i8)>,
}

impl DetectionResponder for RecordingResponder {
    fn respond(&mut self, person_score: i8, not_person_score: i8) {
        self.calls.push((person_score, not_person_score));
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Advances `step` microseconds on every read.
pub struct FakeClock {
    now: Cell<u64>,
    step: u64,
    pub reads: Cell<u32>,
}

impl FakeClock {
    pub fn new(step: u64) -> Self {
        Self {
            now: Cell::new(0),
            step,
            reads: Cell::new(0),
        }
    }
}

impl Clock for FakeClock {
    fn now_us(&self) -> u64 {
        self.reads.set(self.reads.get() + 1);
        let t = self.now.get();
        self.now.set(t + self.step);
        t
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<DetectorEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&DetectorEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &DetectorEvent) {
        self.events.push(event.clone());
    }
}
