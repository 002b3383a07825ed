//! Steady-state inference pipeline.
//!
//! One cycle, strictly sequential:
//!
//! ```text
//!  capture ──▶ invoke ──▶ decode scores ──▶ respond
//!  (Preprocessing) (Inference)  (Postprocessing)
//! ```
//!
//! - A failed capture is logged and the cycle carries on: invoke runs over
//!   whatever the input tensor already holds.
//! - A failed invoke ends the cycle.  No scores are decoded and the
//!   responder is not called.  The next cycle starts from capture as usual.
//!
//! Nothing in here can move the controller out of `Ready`.

use log::{debug, error, warn};
use serde::Serialize;

use crate::app::events::DetectorEvent;
use crate::app::ports::{
    CaptureError, Clock, DetectionResponder, EngineError, EventSink, GraphEngine, ImageSource,
};
use crate::config::DetectorConfig;
use crate::diagnostics::{PipelineStats, Stage, StageTimer};
use crate::engine::interpreter::ReadyInterpreter;
use crate::engine::tensor::DType;
use crate::error::{CycleError, SetupError};

/// Raw classifier output for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectionScores {
    pub person: i8,
    pub not_person: i8,
}

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Scores were decoded and handed to the responder.
    Responded(DetectionScores),
    /// Invoke failed; postprocess and respond were skipped.
    InvokeFailed(EngineError),
}

/// Everything observable about one completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub cycle: u64,
    pub capture: Result<(), CaptureError>,
    pub outcome: CycleOutcome,
    pub preprocessing_us: u64,
    pub inference_us: u64,
    /// `None` when the cycle never reached the responder.
    pub postprocessing_us: Option<u64>,
}

impl CycleReport {
    pub fn scores(&self) -> Option<DetectionScores> {
        match self.outcome {
            CycleOutcome::Responded(s) => Some(s),
            CycleOutcome::InvokeFailed(_) => None,
        }
    }

    /// Per-cycle errors in stage order.
    pub fn errors(&self) -> heapless::Vec<CycleError, 2> {
        let mut out = heapless::Vec::new();
        if let Err(e) = self.capture {
            let _ = out.push(CycleError::CaptureFailure(e));
        }
        if let CycleOutcome::InvokeFailed(e) = self.outcome {
            let _ = out.push(CycleError::InvokeFailure(e));
        }
        out
    }
}

/// The allocated interpreter plus the fixed frame/score layout, ready to
/// run cycles.  Only constructible from a tensor layout that matches the
/// config, so the per-cycle path never re-checks it.
pub struct InferenceSession<E: GraphEngine> {
    interpreter: ReadyInterpreter<E>,
    cols: usize,
    rows: usize,
    channels: usize,
    person_index: usize,
    not_person_index: usize,
    stats_report_interval: u32,
    stats: PipelineStats,
}

impl<E: GraphEngine> InferenceSession<E> {
    /// Bind an allocated interpreter to `config`, checking that input and
    /// output tensors fit the configured geometry.
    pub fn new(interpreter: ReadyInterpreter<E>, config: &DetectorConfig) -> Result<Self, SetupError> {
        let input = &interpreter.input().spec;
        if input.dtype != DType::Int8 {
            return Err(SetupError::TensorMismatch("input tensor is not int8"));
        }
        if input.element_count() != Some(config.frame_len()) {
            return Err(SetupError::TensorMismatch(
                "input tensor size does not match frame geometry",
            ));
        }

        let output = &interpreter.output().spec;
        if output.dtype != DType::Int8 {
            return Err(SetupError::TensorMismatch("output tensor is not int8"));
        }
        if output.element_count().is_none_or(|n| n < config.category_count) {
            return Err(SetupError::TensorMismatch(
                "output tensor holds fewer scores than categories",
            ));
        }

        Ok(Self {
            interpreter,
            cols: config.cols,
            rows: config.rows,
            channels: config.channels,
            person_index: config.person_index,
            not_person_index: config.not_person_index,
            stats_report_interval: config.stats_report_interval,
            stats: PipelineStats::default(),
        })
    }

    pub fn interpreter(&self) -> &ReadyInterpreter<E> {
        &self.interpreter
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Run one capture → invoke → respond cycle.
    pub fn run_cycle(
        &mut self,
        camera: &mut impl ImageSource,
        responder: &mut impl DetectionResponder,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) -> CycleReport {
        self.stats.cycles += 1;
        let cycle = self.stats.cycles;

        // 1. Capture straight into the input tensor.
        let timer = StageTimer::start(Stage::Preprocessing, clock);
        let capture = camera.capture(
            self.cols,
            self.rows,
            self.channels,
            self.interpreter.input_data_mut(),
        );
        if let Err(e) = capture {
            warn!("Image capture failed: {}", e);
            self.stats.capture_failures += 1;
            sink.emit(&DetectorEvent::CaptureFailed(e));
        }
        let preprocessing_us = timer.finish(clock);
        self.stats.record_stage(Stage::Preprocessing, preprocessing_us);

        // 2. Invoke.
        let timer = StageTimer::start(Stage::Inference, clock);
        let invoked = self.interpreter.invoke();
        let inference_us = timer.finish(clock);
        self.stats.record_stage(Stage::Inference, inference_us);

        // 3. Postprocess and respond.
        let timer = StageTimer::start(Stage::Postprocessing, clock);
        let (outcome, postprocessing_us) = match invoked {
            Ok(()) => {
                let scores = self.read_scores();
                responder.respond(scores.person, scores.not_person);
                let us = timer.finish(clock);
                self.stats.record_stage(Stage::Postprocessing, us);
                self.stats.responses += 1;
                debug!(
                    "Cycle {}: person={} not_person={}",
                    cycle, scores.person, scores.not_person
                );
                sink.emit(&DetectorEvent::Detection(scores));
                (CycleOutcome::Responded(scores), Some(us))
            }
            Err(e) => {
                error!("Invoke failed: {}", e);
                self.stats.invoke_failures += 1;
                sink.emit(&DetectorEvent::InvokeFailed(e));
                (CycleOutcome::InvokeFailed(e), None)
            }
        };

        if self.stats_report_interval > 0 && cycle % u64::from(self.stats_report_interval) == 0 {
            sink.emit(&DetectorEvent::StatsSummary(self.stats));
        }

        CycleReport {
            cycle,
            capture,
            outcome,
            preprocessing_us,
            inference_us,
            postprocessing_us,
        }
    }

    /// Both scores as signed 8-bit, verbatim.
    fn read_scores(&self) -> DetectionScores {
        let output = self.interpreter.output_data();
        DetectionScores {
            person: output[self.person_index],
            not_person: output[self.not_person_index],
        }
    }
}
