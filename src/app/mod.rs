//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the detector's lifecycle orchestration.  All
//! interaction with storage, camera, engine and responder happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
