//! Detector service: the hexagonal core.
//!
//! [`DetectorService`] owns the configuration and the lifecycle state.
//! All I/O flows through port traits injected at call sites, so the whole
//! service runs against mock adapters on the host.
//!
//! ```text
//!  StoragePort ──▶ ┌───────────────────────────┐ ──▶ EventSink
//!  GraphEngine ──▶ │      DetectorService       │
//!  ImageSource ──▶ │ Lifecycle · Session · Stats│ ──▶ DetectionResponder
//!        Clock ──▶ └───────────────────────────┘
//! ```

use log::{error, info, warn};

use crate::config::DetectorConfig;
use crate::engine::{Interpreter, OpResolver, PERSON_DETECTION_OPS, TensorArena};
use crate::error::SetupError;
use crate::lifecycle::{Lifecycle, PhaseId};
use crate::model::load_model;
use crate::pipeline::{CycleReport, InferenceSession};

use super::events::DetectorEvent;
use super::ports::{Clock, DetectionResponder, EventSink, GraphEngine, ImageSource, StoragePort};

// ───────────────────────────────────────────────────────────────
// DetectorService
// ───────────────────────────────────────────────────────────────

/// Drives setup once, then the repeating inference cycle.
pub struct DetectorService<E: GraphEngine> {
    config: DetectorConfig,
    lifecycle: Lifecycle<E>,
}

impl<E: GraphEngine> DetectorService<E> {
    /// Construct in `Uninitialized`.  Nothing is loaded until [`setup`](Self::setup).
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> PhaseId {
        self.lifecycle.phase()
    }

    pub fn failure(&self) -> Option<SetupError> {
        self.lifecycle.failure()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// The ready session, if setup succeeded.
    pub fn session(&self) -> Option<&InferenceSession<E>> {
        self.lifecycle.session()
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// One-time setup: validate config, load the model, allocate tensors.
    ///
    /// Only acts from `Uninitialized`.  Any later call is a logged no-op
    /// that reports the outcome of the first attempt; `engine` is dropped.
    pub fn setup(
        &mut self,
        storage: &impl StoragePort,
        engine: E,
        sink: &mut impl EventSink,
    ) -> Result<(), SetupError> {
        match &self.lifecycle {
            Lifecycle::Uninitialized => {}
            Lifecycle::Ready(_) => {
                warn!("setup() called while Ready; ignoring");
                return Ok(());
            }
            Lifecycle::Failed(e) => {
                warn!("setup() called after failed setup; not retrying");
                return Err(*e);
            }
        }

        sink.emit(&DetectorEvent::SetupStarted {
            model_path: self.config.model_path.clone(),
        });
        info!("Setup: loading model from {}", self.config.model_path);

        let (next, result) = match self.build_session(storage, engine) {
            Ok(session) => {
                let interp = session.interpreter();
                sink.emit(&DetectorEvent::Ready {
                    model_bytes: interp.model().size_bytes(),
                    arena_used: interp.arena_used_bytes(),
                    arena_capacity: interp.arena_capacity(),
                });
                info!(
                    "Setup complete: arena {}/{} bytes",
                    interp.arena_used_bytes(),
                    interp.arena_capacity()
                );
                (Lifecycle::Ready(session), Ok(()))
            }
            Err(e) => {
                error!("Setup failed: {}", e);
                sink.emit(&DetectorEvent::SetupFailed(e));
                (Lifecycle::Failed(e), Err(e))
            }
        };

        let from = self.lifecycle.phase();
        self.lifecycle = next;
        sink.emit(&DetectorEvent::PhaseChanged {
            from,
            to: self.lifecycle.phase(),
        });
        result
    }

    fn build_session(&self, storage: &impl StoragePort, engine: E) -> Result<InferenceSession<E>, SetupError> {
        self.config.validate()?;

        let model = load_model(storage, &self.config.model_path)?;
        let resolver = OpResolver::<PERSON_DETECTION_OPS>::person_detection()?;
        let arena = TensorArena::new(self.config.arena_size);

        let ready = Interpreter::new(model, resolver, arena, engine).allocate_tensors()?;
        InferenceSession::new(ready, &self.config)
    }

    // ── Steady state ──────────────────────────────────────────

    /// Run one pipeline cycle.  Returns `None` without touching any port
    /// unless the controller is `Ready`.
    pub fn run_cycle(
        &mut self,
        camera: &mut impl ImageSource,
        responder: &mut impl DetectionResponder,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) -> Option<CycleReport> {
        let session = self.lifecycle.session_mut()?;
        Some(session.run_cycle(camera, responder, clock, sink))
    }
}
