//! Controller lifecycle state.
//!
//! ```text
//!                  setup() ok
//!  Uninitialized ─────────────▶ Ready(InferenceSession) ──┐
//!        │                            ▲                   │ run_cycle()
//!        │ setup() err                └───────────────────┘
//!        ▼
//!  Failed(SetupError)      (terminal, never retried)
//! ```
//!
//! The pipeline lives inside the `Ready` payload, so there is no way to
//! run a cycle from any other phase.

use serde::Serialize;

use crate::app::ports::GraphEngine;
use crate::error::SetupError;
use crate::pipeline::InferenceSession;

/// Payload-free phase discriminant for queries and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum PhaseId {
    Uninitialized = 0,
    Ready = 1,
    Failed = 2,
}

/// Tagged lifecycle state.
pub enum Lifecycle<E: GraphEngine> {
    Uninitialized,
    Ready(InferenceSession<E>),
    Failed(SetupError),
}

impl<E: GraphEngine> Default for Lifecycle<E> {
    fn default() -> Self {
        Self::Uninitialized
    }
}

impl<E: GraphEngine> Lifecycle<E> {
    pub fn phase(&self) -> PhaseId {
        match self {
            Self::Uninitialized => PhaseId::Uninitialized,
            Self::Ready(_) => PhaseId::Ready,
            Self::Failed(_) => PhaseId::Failed,
        }
    }

    /// The setup error, if setup failed.
    pub fn failure(&self) -> Option<SetupError> {
        match self {
            Self::Failed(e) => Some(*e),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&InferenceSession<E>> {
        match self {
            Self::Ready(s) => Some(s),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut InferenceSession<E>> {
        match self {
            Self::Ready(s) => Some(s),
            _ => None,
        }
    }
}

impl<E: GraphEngine> core::fmt::Debug for Lifecycle<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("Uninitialized"),
            Self::Ready(s) => f
                .debug_struct("Ready")
                .field("cycles", &s.stats().cycles)
                .finish(),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}
