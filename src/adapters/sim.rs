//! Host simulation adapters.
//!
//! Stand-ins for the camera, the TFLM engine and the flash filesystem so
//! the full setup → cycle loop runs on a workstation.
//!
//! - [`SyntheticCamera`] renders a moving gradient, shifted to signed.
//! - [`SimEngine`] "classifies" by mean brightness.  Its plan matches the
//!   96×96×1 / 2-category person-detection model.
//! - [`SimStorage`] serves in-memory files; [`SimStorage::with_person_model`]
//!   preloads a minimal schema-v3 model header at [`MODEL_PATH`].

use std::collections::HashMap;

use log::debug;

use crate::app::ports::{
    CaptureError, EngineError, GraphEngine, ImageSource, StorageError, StoragePort, TensorIo,
    TensorPlan,
};
use crate::config::{CATEGORY_COUNT, MODEL_PATH, NUM_CHANNELS, NUM_COLS, NUM_ROWS};
use crate::engine::resolver::OpKind;
use crate::engine::tensor::{QuantParams, TensorSpec};
use crate::model::schema::{self, BuiltinOperator, SUPPORTED_SCHEMA_VERSION};

/// Quantisation of the person-detection model's softmax output.
pub const OUTPUT_QUANT: QuantParams = QuantParams {
    scale: 1.0 / 256.0,
    zero_point: -128,
};

/// Quantisation of the grayscale input.
pub const INPUT_QUANT: QuantParams = QuantParams {
    scale: 1.0,
    zero_point: -128,
};

/// Intermediate activation workspace the simulated graph asks for.
pub const SIM_SCRATCH_BYTES: usize = 48 * 1024;

// ───────────────────────────────────────────────────────────────
// Camera
// ───────────────────────────────────────────────────────────────

/// Deterministic frame generator.
#[derive(Debug, Default)]
pub struct SyntheticCamera {
    frame: u32,
    /// Fail every Nth capture (1-based), leaving the buffer untouched.
    fail_every: Option<u32>,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_every(n: u32) -> Self {
        Self {
            frame: 0,
            fail_every: (n > 0).then_some(n),
        }
    }

    pub fn frames_requested(&self) -> u32 {
        self.frame
    }
}

impl ImageSource for SyntheticCamera {
    fn capture(
        &mut self,
        cols: usize,
        rows: usize,
        channels: usize,
        out: &mut [i8],
    ) -> Result<(), CaptureError> {
        self.frame = self.frame.wrapping_add(1);
        if out.len() != cols * rows * channels {
            return Err(CaptureError::BufferSize);
        }
        if self.fail_every.is_some_and(|n| self.frame % n == 0) {
            return Err(CaptureError::Timeout);
        }

        let shift = self.frame as usize * 7;
        for (i, px) in out.iter_mut().enumerate() {
            let pixel = i / channels;
            let (x, y) = (pixel % cols, pixel / cols);
            let gray = ((x + y + shift) % 256) as u8;
            *px = (i16::from(gray) - 128) as i8;
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Engine
// ───────────────────────────────────────────────────────────────

/// Brightness "classifier" with the person-detection tensor layout.
#[derive(Debug, Default)]
pub struct SimEngine {
    invocations: u64,
}

impl SimEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> u64 {
        self.invocations
    }
}

impl GraphEngine for SimEngine {
    fn prepare(&mut self, model: &[u8], ops: &[OpKind]) -> Result<TensorPlan, EngineError> {
        if ops.is_empty() {
            return Err(EngineError::Rejected("model has no operators"));
        }
        debug!("SimEngine: preparing {}-byte model, {} ops", model.len(), ops.len());

        let input = TensorSpec::int8(&[1, NUM_ROWS, NUM_COLS, NUM_CHANNELS], INPUT_QUANT)
            .ok_or(EngineError::Rejected("input rank"))?;
        let output = TensorSpec::int8(&[1, CATEGORY_COUNT], OUTPUT_QUANT)
            .ok_or(EngineError::Rejected("output rank"))?;
        Ok(TensorPlan {
            input,
            output,
            scratch_bytes: SIM_SCRATCH_BYTES,
        })
    }

    fn invoke(&mut self, io: TensorIo<'_>) -> Result<(), EngineError> {
        if io.output.len() < 2 {
            return Err(EngineError::Rejected("output too small"));
        }
        self.invocations += 1;

        let sum: i64 = io.input.iter().map(|&v| i64::from(v)).sum();
        let mean = sum.checked_div(io.input.len() as i64).unwrap_or(0);
        let person = mean.clamp(-128, 127) as i8;

        io.scratch.fill(0);
        // Quantised softmax pair: (q0 + 128) + (q1 + 128) == 256.
        io.output[1] = person;
        io.output[0] = person.saturating_neg();
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Storage
// ───────────────────────────────────────────────────────────────

/// In-memory file map.
#[derive(Debug, Default)]
pub struct SimStorage {
    files: HashMap<String, Vec<u8>>,
}

impl SimStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage holding a schema-v3 header that lists the five
    /// person-detection operators.
    pub fn with_person_model() -> Self {
        let mut s = Self::new();
        s.insert(
            MODEL_PATH,
            schema::build_header(
                SUPPORTED_SCHEMA_VERSION,
                &[
                    BuiltinOperator::CONV_2D,
                    BuiltinOperator::DEPTHWISE_CONV_2D,
                    BuiltinOperator::AVERAGE_POOL_2D,
                    BuiltinOperator::RESHAPE,
                    BuiltinOperator::SOFTMAX,
                ],
            ),
        );
        s
    }

    pub fn insert(&mut self, path: &str, data: Vec<u8>) {
        self.files.insert(path.to_owned(), data);
    }
}

impl StoragePort for SimStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.files.get(path).cloned().ok_or(StorageError::NotFound)
    }
}
