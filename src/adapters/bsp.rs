//! Board-support bindings (ESP-IDF only).
//!
//! The camera driver and the TFLM kernel runtime are C components linked
//! into the ESP-IDF image by the board package.  This module declares
//! their entry points and wraps them in [`ImageSource`] and
//! [`GraphEngine`].
//!
//! | Symbol                    | Wrapped by      |
//! |---------------------------|-----------------|
//! | `bsp_camera_init`         | `BspCamera::new`|
//! | `bsp_camera_get_image`    | `ImageSource`   |
//! | `tflm_shim_prepare`       | `GraphEngine`   |
//! | `tflm_shim_invoke`        | `GraphEngine`   |

use log::{info, warn};

use crate::app::ports::{CaptureError, EngineError, GraphEngine, ImageSource, TensorIo, TensorPlan};
use crate::engine::interpreter::MAX_MODEL_OPERATORS;
use crate::engine::resolver::OpKind;
use crate::engine::tensor::{DType, MAX_RANK, QuantParams, TensorSpec};

// TfLiteType values the shim reports.
const TFLITE_FLOAT32: i32 = 1;
const TFLITE_INT32: i32 = 2;
const TFLITE_UINT8: i32 = 3;
const TFLITE_INT8: i32 = 9;

/// Tensor description as filled in by `tflm_shim_prepare`.
#[repr(C)]
#[derive(Default, Clone, Copy)]
struct TflmTensorDesc {
    dims: [i32; MAX_RANK],
    rank: i32,
    dtype: i32,
    scale: f32,
    zero_point: i32,
}

#[repr(C)]
#[derive(Default)]
struct TflmPlan {
    input: TflmTensorDesc,
    output: TflmTensorDesc,
    scratch_bytes: usize,
}

unsafe extern "C" {
    fn bsp_camera_init() -> i32;
    fn bsp_camera_get_image(cols: i32, rows: i32, channels: i32, out: *mut i8) -> i32;

    fn tflm_shim_prepare(
        model: *const u8,
        model_len: usize,
        ops: *const i32,
        op_count: usize,
        plan: *mut TflmPlan,
    ) -> i32;
    fn tflm_shim_invoke(
        input: *const i8,
        input_len: usize,
        output: *mut i8,
        output_len: usize,
        scratch: *mut u8,
        scratch_len: usize,
    ) -> i32;
}

// ───────────────────────────────────────────────────────────────
// Camera
// ───────────────────────────────────────────────────────────────

/// Board camera.  The driver already shifts pixels to signed int8.
pub struct BspCamera {
    _private: (),
}

impl BspCamera {
    pub fn new() -> Result<Self, CaptureError> {
        // SAFETY: called once from the main task before any capture.
        let rc = unsafe { bsp_camera_init() };
        if rc != 0 {
            warn!("BspCamera: init failed (rc={})", rc);
            return Err(CaptureError::Driver(rc));
        }
        info!("BspCamera: initialised");
        Ok(Self { _private: () })
    }
}

impl ImageSource for BspCamera {
    fn capture(
        &mut self,
        cols: usize,
        rows: usize,
        channels: usize,
        out: &mut [i8],
    ) -> Result<(), CaptureError> {
        if out.len() != cols * rows * channels {
            return Err(CaptureError::BufferSize);
        }
        // SAFETY: `out` holds exactly cols*rows*channels samples and is
        // exclusively borrowed for the duration of the call.
        let rc = unsafe {
            bsp_camera_get_image(cols as i32, rows as i32, channels as i32, out.as_mut_ptr())
        };
        if rc != 0 {
            return Err(CaptureError::Driver(rc));
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Engine
// ───────────────────────────────────────────────────────────────

/// TFLM kernels behind the C shim.
pub struct TflmEngine {
    _private: (),
}

impl Default for TflmEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TflmEngine {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl GraphEngine for TflmEngine {
    fn prepare(&mut self, model: &[u8], ops: &[OpKind]) -> Result<TensorPlan, EngineError> {
        let mut codes: heapless::Vec<i32, MAX_MODEL_OPERATORS> = heapless::Vec::new();
        for kind in ops {
            codes
                .push(kind.builtin().0)
                .map_err(|_| EngineError::Rejected("operator table too large"))?;
        }
        let mut plan = TflmPlan::default();
        // SAFETY: all pointers are valid for the stated lengths; `plan` is
        // a plain repr(C) out-parameter.
        let rc = unsafe {
            tflm_shim_prepare(
                model.as_ptr(),
                model.len(),
                codes.as_ptr(),
                codes.len(),
                &mut plan,
            )
        };
        if rc != 0 {
            return Err(EngineError::Status(rc));
        }
        Ok(TensorPlan {
            input: tensor_spec(&plan.input)?,
            output: tensor_spec(&plan.output)?,
            scratch_bytes: plan.scratch_bytes,
        })
    }

    fn invoke(&mut self, io: TensorIo<'_>) -> Result<(), EngineError> {
        // SAFETY: the three slices are disjoint arena regions that outlive
        // the call.
        let rc = unsafe {
            tflm_shim_invoke(
                io.input.as_ptr(),
                io.input.len(),
                io.output.as_mut_ptr(),
                io.output.len(),
                io.scratch.as_mut_ptr(),
                io.scratch.len(),
            )
        };
        if rc != 0 {
            return Err(EngineError::Status(rc));
        }
        Ok(())
    }
}

fn tensor_spec(desc: &TflmTensorDesc) -> Result<TensorSpec, EngineError> {
    let rank = usize::try_from(desc.rank)
        .ok()
        .filter(|&r| r <= MAX_RANK)
        .ok_or(EngineError::Rejected("tensor rank"))?;
    let mut shape = heapless::Vec::new();
    for &d in &desc.dims[..rank] {
        let d = usize::try_from(d).map_err(|_| EngineError::Rejected("negative dim"))?;
        let _ = shape.push(d);
    }
    let dtype = match desc.dtype {
        TFLITE_INT8 => DType::Int8,
        TFLITE_UINT8 => DType::UInt8,
        TFLITE_INT32 => DType::Int32,
        TFLITE_FLOAT32 => DType::Float32,
        _ => return Err(EngineError::Rejected("tensor dtype")),
    };
    Ok(TensorSpec {
        shape,
        dtype,
        quant: Some(QuantParams {
            scale: desc.scale,
            zero_point: desc.zero_point,
        }),
    })
}
