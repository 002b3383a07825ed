//! Tensor metadata: shape, element type, quantisation.
//!
//! Specs are produced once by the engine during allocation and are
//! immutable afterwards.

use heapless::Vec;

/// Maximum tensor rank this firmware handles (NHWC).
pub const MAX_RANK: usize = 4;

/// Tensor element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Int8,
    UInt8,
    Int32,
    Float32,
}

impl DType {
    pub const fn size_bytes(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int32 | Self::Float32 => 4,
        }
    }
}

/// Affine quantisation: `real = scale * (q - zero_point)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantParams {
    pub scale: f32,
    pub zero_point: i32,
}

impl QuantParams {
    pub fn dequantize(&self, q: i8) -> f32 {
        self.scale * (i32::from(q) - self.zero_point) as f32
    }
}

/// Shape, dtype and quantisation of one tensor slot.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorSpec {
    pub shape: Vec<usize, MAX_RANK>,
    pub dtype: DType,
    pub quant: Option<QuantParams>,
}

impl TensorSpec {
    /// Build an int8 spec.  Returns `None` if `dims` exceeds [`MAX_RANK`].
    pub fn int8(dims: &[usize], quant: QuantParams) -> Option<Self> {
        Some(Self {
            shape: Vec::from_slice(dims).ok()?,
            dtype: DType::Int8,
            quant: Some(quant),
        })
    }

    /// Number of elements (product of dims; a rank-0 tensor holds one).
    /// `None` if the product overflows `usize`.
    pub fn element_count(&self) -> Option<usize> {
        self.shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    pub fn byte_len(&self) -> Option<usize> {
        self.element_count()?.checked_mul(self.dtype.size_bytes())
    }
}
