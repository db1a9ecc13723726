//! Per-sample outcomes and running diagnostics counters.

use crate::tracking::sample::SampleRejection;
use crate::tracking::state::TrackingStatus;

/// What the engine did with one tracking sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// The sample updated the real camera transform.
    Applied,
    /// The sample was discarded; no state changed.
    Rejected(SampleRejection),
}

/// Running counters for the diagnostics collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineMetrics {
    pub samples_applied: u64,
    pub samples_rejected: u64,
    pub status: TrackingStatus,
}

impl EngineMetrics {
    pub fn record(&mut self, outcome: SampleOutcome) {
        match outcome {
            SampleOutcome::Applied => {
                self.samples_applied += 1;
                self.status = TrackingStatus::Ok;
            }
            SampleOutcome::Rejected(_) => {
                self.samples_rejected += 1;
                self.status = TrackingStatus::Lost;
            }
        }
    }
}
