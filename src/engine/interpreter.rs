//! Interpreter: binds model, operator registry, arena and graph engine.
//!
//! Type-state split:
//!
//! - [`Interpreter`] is the unallocated binding.  Its only operation is
//!   [`allocate_tensors`](Interpreter::allocate_tensors), which consumes it.
//! - [`ReadyInterpreter`] owns the carved tensor regions.  Input/output
//!   access and `invoke` exist only here, so tensor handles cannot be used
//!   before allocation and are never re-established afterwards.

use log::{debug, info};

use crate::app::ports::{EngineError, GraphEngine, TensorIo, TensorPlan};
use crate::error::SetupError;
use crate::model::ValidatedModel;

use super::arena::{ArenaFull, Region, TensorArena, as_i8, as_i8_mut};
use super::resolver::{OpKind, OpResolver};
use super::tensor::TensorSpec;

/// Upper bound on distinct operator-table entries in a model.
pub const MAX_MODEL_OPERATORS: usize = 32;

/// Model + registry + arena + engine, not yet allocated.
pub struct Interpreter<E: GraphEngine, const N: usize> {
    model: ValidatedModel,
    resolver: OpResolver<N>,
    arena: TensorArena,
    engine: E,
}

impl<E: GraphEngine, const N: usize> Interpreter<E, N> {
    pub fn new(model: ValidatedModel, resolver: OpResolver<N>, arena: TensorArena, engine: E) -> Self {
        Self {
            model,
            resolver,
            arena,
            engine,
        }
    }

    /// One-time tensor allocation.
    ///
    /// 1. Resolve every model operator code against the registry.
    /// 2. Let the engine report its tensor plan.
    /// 3. Carve input, output and scratch from the arena, in that order.
    pub fn allocate_tensors(mut self) -> Result<ReadyInterpreter<E>, SetupError> {
        let ops = self.resolve_operators()?;

        let plan = self
            .engine
            .prepare(self.model.bytes(), &ops)
            .map_err(SetupError::Engine)?;

        // An unrepresentable size can never fit.
        let capacity = self.arena.capacity();
        let (Some(input_len), Some(output_len)) = (plan.input.byte_len(), plan.output.byte_len())
        else {
            return Err(SetupError::ArenaExhausted {
                required: usize::MAX,
                capacity,
            });
        };
        let required = self
            .arena
            .footprint(&[input_len, output_len, plan.scratch_bytes])
            .unwrap_or(usize::MAX);
        let exhausted = |_: ArenaFull| SetupError::ArenaExhausted { required, capacity };

        let input_region = self.arena.carve(input_len).map_err(exhausted)?;
        let output_region = self.arena.carve(output_len).map_err(exhausted)?;
        let scratch_region = self.arena.carve(plan.scratch_bytes).map_err(exhausted)?;

        info!(
            "Tensors allocated: {} of {} arena bytes used",
            self.arena.used(),
            capacity
        );

        let TensorPlan { input, output, .. } = plan;
        Ok(ReadyInterpreter {
            model: self.model,
            arena: self.arena,
            engine: self.engine,
            input: TensorSlot {
                spec: input,
                region: input_region,
            },
            output: TensorSlot {
                spec: output,
                region: output_region,
            },
            scratch: scratch_region,
        })
    }

    fn resolve_operators(&self) -> Result<heapless::Vec<OpKind, MAX_MODEL_OPERATORS>, SetupError> {
        let mut ops = heapless::Vec::new();
        for code in self.model.operator_codes() {
            let Some(kind) = self.resolver.resolve(code) else {
                return Err(SetupError::UnsupportedOperator(code.0));
            };
            debug!("Resolved builtin {} -> {:?}", code.0, kind);
            ops.push(kind).map_err(|_| SetupError::TooManyModelOperators {
                capacity: MAX_MODEL_OPERATORS,
            })?;
        }
        Ok(ops)
    }
}

/// A tensor spec bound to its arena region.
#[derive(Debug, Clone)]
pub struct TensorSlot {
    pub spec: TensorSpec,
    pub region: Region,
}

/// Allocated interpreter.  Tensor regions are fixed for its lifetime.
pub struct ReadyInterpreter<E: GraphEngine> {
    model: ValidatedModel,
    arena: TensorArena,
    engine: E,
    input: TensorSlot,
    output: TensorSlot,
    scratch: Region,
}

impl<E: GraphEngine> ReadyInterpreter<E> {
    /// Input tensor slot 0.
    pub fn input(&self) -> &TensorSlot {
        &self.input
    }

    /// Output tensor slot 0.
    pub fn output(&self) -> &TensorSlot {
        &self.output
    }

    pub fn input_data_mut(&mut self) -> &mut [i8] {
        as_i8_mut(self.arena.slice_mut(self.input.region))
    }

    pub fn output_data(&self) -> &[i8] {
        as_i8(self.arena.slice(self.output.region))
    }

    /// Run the graph over the current input contents.
    pub fn invoke(&mut self) -> Result<(), EngineError> {
        let (input, output, scratch) =
            self.arena
                .split3_mut(self.input.region, self.output.region, self.scratch);
        self.engine.invoke(TensorIo {
            input: as_i8(input),
            output: as_i8_mut(output),
            scratch,
        })
    }

    pub fn arena_used_bytes(&self) -> usize {
        self.arena.used()
    }

    pub fn arena_capacity(&self) -> usize {
        self.arena.capacity()
    }

    pub fn model(&self) -> &ValidatedModel {
        &self.model
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}
