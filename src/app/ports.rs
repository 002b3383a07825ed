//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DetectorService (domain)
//! ```
//!
//! Driven adapters (storage, camera, graph engine, responder, clock, event
//! sinks) implement these traits.  The [`DetectorService`](super::service::DetectorService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! All calls are synchronous and run to completion.  There is no timeout:
//! a stuck capture or invoke blocks the loop.

use crate::engine::resolver::OpKind;
use crate::engine::tensor::TensorSpec;

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: flash filesystem → domain)
// ───────────────────────────────────────────────────────────────

/// Read-only access to the persistent store holding the model artifact.
pub trait StoragePort {
    /// Read the whole file at `path`.
    fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Image source port (driven adapter: camera → domain)
// ───────────────────────────────────────────────────────────────

/// Frame capture.
///
/// Implementations write exactly `cols * rows * channels` signed 8-bit
/// samples into `out`, in the `cols × rows × channels` layout the model
/// expects.
/// Any unsigned-to-signed shift (subtract 128) is the source's job.
pub trait ImageSource {
    fn capture(
        &mut self,
        cols: usize,
        rows: usize,
        channels: usize,
        out: &mut [i8],
    ) -> Result<(), CaptureError>;
}

// ───────────────────────────────────────────────────────────────
// Detection responder port (driven adapter: domain → actuation)
// ───────────────────────────────────────────────────────────────

/// One-way notification sink for raw detection scores.
///
/// The responder owns every thresholding and actuation decision; the
/// pipeline forwards scores verbatim.
pub trait DetectionResponder {
    fn respond(&mut self, person_score: i8, not_person_score: i8);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic microsecond clock used for stage timing.
pub trait Clock {
    fn now_us(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Graph engine port (opaque tensor-graph executor)
// ───────────────────────────────────────────────────────────────

/// Memory requirements the engine reports for a model.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorPlan {
    pub input: TensorSpec,
    pub output: TensorSpec,
    /// Workspace for intermediate activations and kernel scratch.
    pub scratch_bytes: usize,
}

/// Disjoint arena views handed to the engine for one invocation.
pub struct TensorIo<'a> {
    pub input: &'a [i8],
    pub output: &'a mut [i8],
    pub scratch: &'a mut [u8],
}

/// The tensor-graph execution engine, consumed as a black box.
///
/// `prepare` runs once during tensor allocation; `invoke` runs once per
/// cycle against memory the interpreter carved from its arena.  The
/// engine must not allocate.
pub trait GraphEngine {
    /// Inspect the model and report the tensor plan.  `ops` is the
    /// resolved operator set, one entry per model operator code.
    fn prepare(&mut self, model: &[u8], ops: &[OpKind]) -> Result<TensorPlan, EngineError>;

    /// Execute the graph over `io.input`, writing `io.output`.
    fn invoke(&mut self, io: TensorIo<'_>) -> Result<(), EngineError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`DetectorEvent`](super::events::DetectorEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::DetectorEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// No file at the requested path.
    NotFound,
    /// File exists but exceeds the adapter's size cap.
    TooLarge,
    /// Generic I/O error.
    IoError,
}

/// Errors from [`ImageSource::capture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    /// Sensor did not deliver a frame in time.
    Timeout,
    /// Output buffer does not hold `cols * rows * channels` samples.
    BufferSize,
    /// Driver-level failure with its native status code.
    Driver(i32),
}

/// Errors from [`GraphEngine`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// Engine returned a non-OK status code.
    Status(i32),
    /// Engine rejected the request; the tag says why.
    Rejected(&'static str),
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "file not found"),
            Self::TooLarge => write!(f, "file too large"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "frame timeout"),
            Self::BufferSize => write!(f, "buffer size mismatch"),
            Self::Driver(rc) => write!(f, "driver error (rc={})", rc),
        }
    }
}

impl core::fmt::Display for EngineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Status(rc) => write!(f, "engine status {}", rc),
            Self::Rejected(why) => write!(f, "engine rejected: {}", why),
        }
    }
}
