//! Model acquisition: storage read, header mapping, schema-version gate.

pub mod loader;
pub mod schema;

pub use loader::{ValidatedModel, load_model};
pub use schema::{BuiltinOperator, SUPPORTED_SCHEMA_VERSION};
