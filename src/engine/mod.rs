//! Resource allocation: operator registry, tensor arena, interpreter.
//!
//! ```text
//!  ValidatedModel ─┐
//!  OpResolver<N> ──┼──▶ Interpreter ──allocate_tensors()──▶ ReadyInterpreter
//!  TensorArena ────┤                                         (input/output/invoke)
//!  GraphEngine ────┘
//! ```

pub mod arena;
pub mod interpreter;
pub mod resolver;
pub mod tensor;

pub use arena::TensorArena;
pub use interpreter::{Interpreter, ReadyInterpreter, TensorSlot};
pub use resolver::{OpKind, OpResolver, PERSON_DETECTION_OPS, RegistryError};
pub use tensor::{DType, QuantParams, TensorSpec};
