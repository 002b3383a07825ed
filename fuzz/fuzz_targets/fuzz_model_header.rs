//! Fuzz target: TFLite model header loader
//!
//! Feeds arbitrary bytes to `ValidatedModel::from_bytes` and verifies:
//! - No panics, whatever the input
//! - Only schema-v3 blobs are accepted
//! - Accepted blobs yield a finite operator-code list
//!
//! cargo fuzz run fuzz_model_header

#![no_main]

use libfuzzer_sys::fuzz_target;
use persondetect::error::SetupError;
use persondetect::model::{SUPPORTED_SCHEMA_VERSION, ValidatedModel};

fuzz_target!(|data: &[u8]| {
    match ValidatedModel::from_bytes(data.to_vec()) {
        Ok(model) => {
            assert_eq!(model.version(), SUPPORTED_SCHEMA_VERSION);
            assert_eq!(model.size_bytes(), data.len());
            let _ = model.operator_codes().take(1 << 16).count();
        }
        Err(SetupError::MalformedModel | SetupError::SchemaVersionMismatch { .. }) => {}
        Err(other) => panic!("unexpected loader error: {other:?}"),
    }
});
