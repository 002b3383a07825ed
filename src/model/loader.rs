//! Model acquisition and schema gating.
//!
//! `load_model` reads the blob through [`StoragePort`], maps the FlatBuffer
//! header in place (no copy, no graph deserialisation) and checks the
//! schema version.  That version check is the only compatibility gate at
//! this layer; anything wrong deeper in the graph surfaces later, during
//! tensor allocation.

use log::{error, info};

use crate::app::ports::StoragePort;
use crate::error::SetupError;

use super::schema::{self, BuiltinOperator, SUPPORTED_SCHEMA_VERSION};

/// A model blob whose header has been verified and whose schema version
/// matches this build.
#[derive(Debug)]
pub struct ValidatedModel {
    blob: Vec<u8>,
    version: u32,
}

impl ValidatedModel {
    /// Verify `blob` and gate on the schema version.
    pub fn from_bytes(blob: Vec<u8>) -> Result<Self, SetupError> {
        let version = match schema::root_as_model(&blob) {
            Ok(model) => model.version(),
            Err(e) => {
                error!("Model header failed verification: {}", e);
                return Err(SetupError::MalformedModel);
            }
        };

        if version != SUPPORTED_SCHEMA_VERSION {
            return Err(SetupError::SchemaVersionMismatch {
                found: version,
                expected: SUPPORTED_SCHEMA_VERSION,
            });
        }

        Ok(Self { blob, version })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.blob
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn size_bytes(&self) -> usize {
        self.blob.len()
    }

    /// Resolved operator code for every entry in the model's operator table.
    pub fn operator_codes(&self) -> impl Iterator<Item = BuiltinOperator> + '_ {
        schema::root_as_model(&self.blob)
            .ok()
            .and_then(|m| m.operator_codes())
            .into_iter()
            .flat_map(|codes| codes.iter().map(|c| c.resolved_code()))
    }
}

/// Read the model at `path` and validate its header.
///
/// Storage failures short-circuit before any parsing.
pub fn load_model(storage: &impl StoragePort, path: &str) -> Result<ValidatedModel, SetupError> {
    let blob = storage.read_file(path).map_err(|e| {
        error!("Failed to read model '{}': {}", path, e);
        SetupError::from(e)
    })?;

    let model = ValidatedModel::from_bytes(blob)?;
    info!(
        "Model loaded: {} bytes, schema v{}",
        model.size_bytes(),
        model.version()
    );
    Ok(model)
}
