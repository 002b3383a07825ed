//! Detector configuration.
//!
//! Build-time constants for the person-detection deployment plus a
//! [`DetectorConfig`] that carries them into setup.  There is no runtime
//! override path: the firmware always boots with [`DetectorConfig::default`];
//! tests and the host simulation construct variants directly.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// Location of the model artifact on the flash filesystem.
pub const MODEL_PATH: &str = "/models/person_detect_model.tflite";

/// Arena for input, output and intermediate tensors.
pub const TENSOR_ARENA_SIZE: usize = 96 * 1024;

// --- Model input geometry ---
pub const NUM_COLS: usize = 96;
pub const NUM_ROWS: usize = 96;
pub const NUM_CHANNELS: usize = 1;
pub const MAX_IMAGE_SIZE: usize = NUM_COLS * NUM_ROWS * NUM_CHANNELS;

// --- Model output layout ---
pub const CATEGORY_COUNT: usize = 2;
pub const PERSON_INDEX: usize = 1;
pub const NOT_A_PERSON_INDEX: usize = 0;

/// Core detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Model artifact path on the storage collaborator.
    pub model_path: String<64>,
    /// Arena size in bytes, reserved once at setup.
    pub arena_size: usize,

    // --- Frame geometry ---
    pub cols: usize,
    pub rows: usize,
    pub channels: usize,

    // --- Output decoding ---
    pub category_count: usize,
    pub person_index: usize,
    pub not_person_index: usize,

    /// Emit a stats summary every N cycles (0 disables).
    pub stats_report_interval: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        let mut model_path = String::new();
        // MODEL_PATH is well under 64 bytes.
        let _ = model_path.push_str(MODEL_PATH);
        Self {
            model_path,
            arena_size: TENSOR_ARENA_SIZE,

            cols: NUM_COLS,
            rows: NUM_ROWS,
            channels: NUM_CHANNELS,

            category_count: CATEGORY_COUNT,
            person_index: PERSON_INDEX,
            not_person_index: NOT_A_PERSON_INDEX,

            stats_report_interval: 100,
        }
    }
}

impl DetectorConfig {
    /// Samples per captured frame.
    pub fn frame_len(&self) -> usize {
        self.cols * self.rows * self.channels
    }

    /// Range-check every field.  Rejects, never clamps.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.model_path.is_empty() {
            return Err(SetupError::InvalidConfig("model_path must not be empty"));
        }
        if self.arena_size == 0 {
            return Err(SetupError::InvalidConfig("arena_size must be non-zero"));
        }
        if self.cols == 0 || self.rows == 0 || self.channels == 0 {
            return Err(SetupError::InvalidConfig("frame dimensions must be non-zero"));
        }
        if self.category_count < 2 {
            return Err(SetupError::InvalidConfig("category_count must be at least 2"));
        }
        if self.person_index >= self.category_count || self.not_person_index >= self.category_count {
            return Err(SetupError::InvalidConfig("score index out of category range"));
        }
        if self.person_index == self.not_person_index {
            return Err(SetupError::InvalidConfig("score indices must differ"));
        }
        Ok(())
    }
}
