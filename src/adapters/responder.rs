//! Log-only detection responder.
//!
//! Prints both raw scores on every cycle.  Actuation (LEDs, GPIO) is a
//! board concern and would live in another [`DetectionResponder`].

use log::info;

use crate::app::ports::DetectionResponder;

/// Logs the scores and remembers the last pair.
#[derive(Debug, Default)]
pub struct LogResponder {
    last: Option<(i8, i8)>,
}

impl LogResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent `(person, not_person)` pair.
    pub fn last(&self) -> Option<(i8, i8)> {
        self.last
    }
}

impl DetectionResponder for LogResponder {
    fn respond(&mut self, person_score: i8, not_person_score: i8) {
        info!(
            "person score:{} no person score {}",
            person_score, not_person_score
        );
        self.last = Some((person_score, not_person_score));
    }
}
