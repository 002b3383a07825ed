//! Stage timing and running pipeline statistics.
//!
//! Every pipeline stage is bracketed by two reads of the monotonic
//! [`Clock`].  The elapsed microseconds are printed as one line per stage
//! (`Preprocessing time: N us`) and folded into [`PipelineStats`], which
//! the session snapshots into a summary event every
//! `stats_report_interval` cycles.
//!
//! Timing is purely observational: nothing here feeds back into control
//! flow.

use core::fmt;

use log::info;
use serde::Serialize;

use crate::app::ports::Clock;

/// Pipeline stage being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    /// Capture plus any in-driver preprocessing.
    Preprocessing,
    Inference,
    /// Score decode plus the responder call.
    Postprocessing,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Self::Preprocessing => "Preprocessing",
            Self::Inference => "Inference",
            Self::Postprocessing => "Postprocessing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A started stage measurement.
#[derive(Debug, Clone, Copy)]
pub struct StageTimer {
    stage: Stage,
    start_us: u64,
}

impl StageTimer {
    pub fn start(stage: Stage, clock: &impl Clock) -> Self {
        Self {
            stage,
            start_us: clock.now_us(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Microseconds since [`start`](Self::start).  Saturates at zero if
    /// the clock misbehaves.
    pub fn elapsed_us(&self, clock: &impl Clock) -> u64 {
        clock.now_us().saturating_sub(self.start_us)
    }

    /// Stop the timer and print the stage's timing line.
    pub fn finish(self, clock: &impl Clock) -> u64 {
        let us = self.elapsed_us(clock);
        report_stage(self.stage, us);
        us
    }
}

/// Print the human-readable timing line for one stage.
pub fn report_stage(stage: Stage, micros: u64) {
    info!("{} time: {} us", stage, micros);
}

// ───────────────────────────────────────────────────────────────
// Running statistics
// ───────────────────────────────────────────────────────────────

/// min/max/total over every sample recorded for one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageStats {
    pub samples: u64,
    pub min_us: u64,
    pub max_us: u64,
    pub total_us: u64,
}

impl StageStats {
    pub fn record(&mut self, micros: u64) {
        if self.samples == 0 {
            self.min_us = micros;
            self.max_us = micros;
        } else {
            self.min_us = self.min_us.min(micros);
            self.max_us = self.max_us.max(micros);
        }
        self.samples += 1;
        self.total_us = self.total_us.saturating_add(micros);
    }

    /// Integer mean, or 0 before the first sample.
    pub fn mean_us(&self) -> u64 {
        self.total_us.checked_div(self.samples).unwrap_or(0)
    }
}

/// Counters and stage timings accumulated across cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub cycles: u64,
    pub capture_failures: u64,
    pub invoke_failures: u64,
    pub responses: u64,
    pub preprocessing: StageStats,
    pub inference: StageStats,
    pub postprocessing: StageStats,
}

impl PipelineStats {
    pub fn record_stage(&mut self, stage: Stage, micros: u64) {
        self.stage_mut(stage).record(micros);
    }

    pub fn stage(&self, stage: Stage) -> &StageStats {
        match stage {
            Stage::Preprocessing => &self.preprocessing,
            Stage::Inference => &self.inference,
            Stage::Postprocessing => &self.postprocessing,
        }
    }

    fn stage_mut(&mut self, stage: Stage) -> &mut StageStats {
        match stage {
            Stage::Preprocessing => &mut self.preprocessing,
            Stage::Inference => &mut self.inference,
            Stage::Postprocessing => &mut self.postprocessing,
        }
    }
}
