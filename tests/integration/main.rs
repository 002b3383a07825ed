//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host (x86_64) with no
//! camera, flash or TFLM runtime required.

mod lifecycle_tests;
mod mock_hw;
mod pipeline_tests;
