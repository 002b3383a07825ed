//! Outbound detector events.
//!
//! The [`DetectorService`](super::service::DetectorService) and the
//! inference pipeline emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::app::ports::{CaptureError, EngineError};
use crate::diagnostics::PipelineStats;
use crate::error::SetupError;
use crate::lifecycle::PhaseId;
use crate::pipeline::DetectionScores;

/// Structured events emitted by the detector core.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorEvent {
    /// Setup began loading the model at this path.
    SetupStarted { model_path: heapless::String<64> },

    /// The lifecycle moved between phases.
    PhaseChanged { from: PhaseId, to: PhaseId },

    /// Tensors are allocated; carries the arena high-water mark.
    Ready {
        model_bytes: usize,
        arena_used: usize,
        arena_capacity: usize,
    },

    /// Setup failed for good.
    SetupFailed(SetupError),

    /// The image source failed; invoke still ran on stale input.
    CaptureFailed(CaptureError),

    /// The interpreter failed; this cycle produced no response.
    InvokeFailed(EngineError),

    /// Scores handed to the responder.
    Detection(DetectionScores),

    /// Periodic running statistics.
    StatsSummary(PipelineStats),
}
