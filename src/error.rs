//! Unified error types for the PersonDetect firmware.
//!
//! Errors are split by lifecycle phase.  [`SetupError`] covers everything
//! that can go wrong before the controller reaches `Ready`; every variant is
//! terminal.  [`CycleError`] covers the steady-state pipeline; every variant
//! is scoped to a single cycle.  All variants are `Copy` so they can be
//! stored in the lifecycle state and passed through events without
//! allocation.

use core::fmt;

use crate::app::ports::{CaptureError, EngineError, StorageError};
use crate::engine::resolver::RegistryError;

// ---------------------------------------------------------------------------
// Setup-phase errors
// ---------------------------------------------------------------------------

/// A failure during one-time setup.  The controller enters `Failed` and
/// never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    /// The detector configuration failed range validation.
    InvalidConfig(&'static str),
    /// The model blob could not be read from storage.
    StorageReadFailure(StorageError),
    /// The blob is not a FlatBuffer model at all.
    MalformedModel,
    /// The model was produced with a different schema version.
    SchemaVersionMismatch { found: u32, expected: u32 },
    /// The operator registry rejected a registration.
    Registry(RegistryError),
    /// The model graph references an operator outside the registered set.
    UnsupportedOperator(i32),
    /// The model's operator table has more entries than the interpreter holds.
    TooManyModelOperators { capacity: usize },
    /// The graph engine failed to prepare the model.
    Engine(EngineError),
    /// Tensor and workspace storage does not fit the arena.
    ArenaExhausted { required: usize, capacity: usize },
    /// Allocated tensors do not match the configured frame/category layout.
    TensorMismatch(&'static str),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::StorageReadFailure(e) => write!(f, "failed to read model: {e}"),
            Self::MalformedModel => write!(f, "model blob is not a valid flatbuffer"),
            Self::SchemaVersionMismatch { found, expected } => write!(
                f,
                "model provided is schema version {found} not equal to supported version {expected}"
            ),
            Self::Registry(e) => write!(f, "op registry: {e}"),
            Self::UnsupportedOperator(code) => {
                write!(f, "model requires unregistered operator (builtin code {code})")
            }
            Self::TooManyModelOperators { capacity } => {
                write!(f, "model operator table exceeds {capacity} entries")
            }
            Self::Engine(e) => write!(f, "engine prepare failed: {e}"),
            Self::ArenaExhausted { required, capacity } => write!(
                f,
                "AllocateTensors() failed: {required} bytes required, arena holds {capacity}"
            ),
            Self::TensorMismatch(msg) => write!(f, "tensor mismatch: {msg}"),
        }
    }
}

impl From<StorageError> for SetupError {
    fn from(e: StorageError) -> Self {
        Self::StorageReadFailure(e)
    }
}

impl From<RegistryError> for SetupError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Steady-state errors
// ---------------------------------------------------------------------------

/// A failure inside one pipeline cycle.  The controller stays `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleError {
    /// The image source did not deliver a frame; invoke still runs.
    CaptureFailure(CaptureError),
    /// The interpreter failed; postprocess and respond are skipped.
    InvokeFailure(EngineError),
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CaptureFailure(e) => write!(f, "image capture failed: {e}"),
            Self::InvokeFailure(e) => write!(f, "invoke failed: {e}"),
        }
    }
}

impl From<CaptureError> for CycleError {
    fn from(e: CaptureError) -> Self {
        Self::CaptureFailure(e)
    }
}

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Setup(SetupError),
    Cycle(CycleError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup(e) => write!(f, "setup: {e}"),
            Self::Cycle(e) => write!(f, "cycle: {e}"),
        }
    }
}

impl From<SetupError> for Error {
    fn from(e: SetupError) -> Self {
        Self::Setup(e)
    }
}

impl From<CycleError> for Error {
    fn from(e: CycleError) -> Self {
        Self::Cycle(e)
    }
}

impl core::error::Error for SetupError {}
impl core::error::Error for CycleError {}
impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
