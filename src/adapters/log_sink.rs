//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured detector events to the
//! `log` facade (ESP-IDF logger on device, `tracing-subscriber` on host).
//! Stats summaries go out as a single JSON line for scraping.

use log::{debug, error, info, warn};

use crate::app::events::DetectorEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`DetectorEvent`] to the console.
pub struct LogEventSink;

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &DetectorEvent) {
        match event {
            DetectorEvent::SetupStarted { model_path } => {
                info!("SETUP | loading {}", model_path);
            }
            DetectorEvent::PhaseChanged { from, to } => {
                info!("PHASE | {:?} -> {:?}", from, to);
            }
            DetectorEvent::Ready {
                model_bytes,
                arena_used,
                arena_capacity,
            } => {
                info!(
                    "READY | model={}B | arena={}/{}B",
                    model_bytes, arena_used, arena_capacity
                );
            }
            DetectorEvent::SetupFailed(e) => {
                error!("SETUP | failed: {}", e);
            }
            DetectorEvent::CaptureFailed(e) => {
                warn!("CYCLE | capture failed: {}", e);
            }
            DetectorEvent::InvokeFailed(e) => {
                error!("CYCLE | invoke failed: {}", e);
            }
            DetectorEvent::Detection(s) => {
                debug!("CYCLE | person={} not_person={}", s.person, s.not_person);
            }
            DetectorEvent::StatsSummary(stats) => match serde_json::to_string(stats) {
                Ok(json) => info!("STATS | {}", json),
                Err(e) => warn!("STATS | serialise failed: {}", e),
            },
        }
    }
}
