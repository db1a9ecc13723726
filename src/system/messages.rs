//! Inter-thread message types.

use crate::tracking::TrackingSample;

/// Message carried on the sample channel from the tracking collaborator's
/// thread to the ingest thread.
#[derive(Debug, Clone, Copy)]
pub enum IngestMsg {
    /// A new tracking sample to apply.
    Sample(TrackingSample),
    /// Unblock and exit the ingest loop.
    Shutdown,
}
