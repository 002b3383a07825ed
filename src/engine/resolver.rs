//! Closed operator registry.
//!
//! The firmware registers, up front, exactly the operator kinds its model
//! needs.  This keeps unused kernels out of flash at the cost of failing
//! allocation outright if the graph references anything else.
//!
//! Capacity is a const generic so the registry lives inline with no heap.

use core::fmt;

use heapless::Vec;

use crate::model::schema::BuiltinOperator;

/// Operator kinds this firmware knows how to register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    AveragePool2D,
    Conv2D,
    DepthwiseConv2D,
    FullyConnected,
    MaxPool2D,
    Reshape,
    Softmax,
    Logistic,
    Quantize,
    Dequantize,
}

impl OpKind {
    /// The TFLite builtin operator code for this kind.
    pub const fn builtin(self) -> BuiltinOperator {
        match self {
            Self::AveragePool2D => BuiltinOperator::AVERAGE_POOL_2D,
            Self::Conv2D => BuiltinOperator::CONV_2D,
            Self::DepthwiseConv2D => BuiltinOperator::DEPTHWISE_CONV_2D,
            Self::FullyConnected => BuiltinOperator::FULLY_CONNECTED,
            Self::MaxPool2D => BuiltinOperator::MAX_POOL_2D,
            Self::Reshape => BuiltinOperator::RESHAPE,
            Self::Softmax => BuiltinOperator::SOFTMAX,
            Self::Logistic => BuiltinOperator::LOGISTIC,
            Self::Quantize => BuiltinOperator::QUANTIZE,
            Self::Dequantize => BuiltinOperator::DEQUANTIZE,
        }
    }

    /// Map a builtin code back to a kind.  Custom and unknown codes map to `None`.
    pub fn from_builtin(code: BuiltinOperator) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.builtin() == code)
    }

    const ALL: [Self; 10] = [
        Self::AveragePool2D,
        Self::Conv2D,
        Self::DepthwiseConv2D,
        Self::FullyConnected,
        Self::MaxPool2D,
        Self::Reshape,
        Self::Softmax,
        Self::Logistic,
        Self::Quantize,
        Self::Dequantize,
    ];
}

/// Registry capacity for the person-detection graph.
pub const PERSON_DETECTION_OPS: usize = 5;

/// Errors from [`OpResolver::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// All `capacity` slots are taken.
    Full { capacity: usize },
    /// The kind is already registered.
    Duplicate(OpKind),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full { capacity } => write!(f, "registry full ({capacity} ops)"),
            Self::Duplicate(kind) => write!(f, "{kind:?} registered more than once"),
        }
    }
}

/// Fixed-capacity set of registered operator kinds.
#[derive(Debug, Clone, Default)]
pub struct OpResolver<const N: usize> {
    ops: Vec<OpKind, N>,
}

impl<const N: usize> OpResolver<N> {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Register `kind`.  Fails when full or when `kind` is already present.
    pub fn add(&mut self, kind: OpKind) -> Result<(), RegistryError> {
        if self.ops.contains(&kind) {
            return Err(RegistryError::Duplicate(kind));
        }
        self.ops
            .push(kind)
            .map_err(|_| RegistryError::Full { capacity: N })
    }

    /// Look up a model operator code.  `None` if the code is unknown to the
    /// firmware or known but not registered.
    pub fn resolve(&self, code: BuiltinOperator) -> Option<OpKind> {
        OpKind::from_builtin(code).filter(|k| self.ops.contains(k))
    }

    pub fn registered(&self) -> &[OpKind] {
        &self.ops
    }
}

impl OpResolver<PERSON_DETECTION_OPS> {
    /// The five kernels the person-detection graph uses.
    pub fn person_detection() -> Result<Self, RegistryError> {
        let mut resolver = Self::new();
        resolver.add(OpKind::AveragePool2D)?;
        resolver.add(OpKind::Conv2D)?;
        resolver.add(OpKind::DepthwiseConv2D)?;
        resolver.add(OpKind::Reshape)?;
        resolver.add(OpKind::Softmax)?;
        Ok(resolver)
    }
}
