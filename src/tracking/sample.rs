//! Tracking samples as emitted by the stereo camera's positional tracking.

use nalgebra::{UnitQuaternion, Vector3};

/// Positional-tracking confidence reported alongside each sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingConfidence {
    /// Tracking locked, pose usable.
    Tracked,
    /// Tracking lost, the device is searching for its position.
    Searching,
    /// Positional tracking disabled or not yet started.
    Off,
}

/// Reason a sample was discarded by the pose engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRejection {
    /// Confidence was `Searching` or `Off`.
    NotTracked,
    /// Position or orientation contained NaN or infinite components.
    NonFinite,
}

/// A single pose sample from the tracking device, in the device frame
/// (RDF: X-right, Y-down, Z-forward). Immutable once emitted.
///
/// Samples arrive at the tracking subsystem's own cadence, independent of
/// (and possibly on a different thread than) the render loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingSample {
    pub timestamp_ns: u64,
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub confidence: TrackingConfidence,
}

impl TrackingSample {
    pub fn new(
        timestamp_ns: u64,
        position: Vector3<f64>,
        orientation: UnitQuaternion<f64>,
        confidence: TrackingConfidence,
    ) -> Self {
        Self {
            timestamp_ns,
            position,
            orientation,
            confidence,
        }
    }

    /// Classify this sample as applicable or give the rejection reason.
    ///
    /// Malformed values are treated as invalid data, never as an error: the
    /// engine discards them without touching its state.
    pub fn validate(&self) -> Result<(), SampleRejection> {
        if self.confidence != TrackingConfidence::Tracked {
            return Err(SampleRejection::NotTracked);
        }
        let finite = self.position.iter().all(|c| c.is_finite())
            && self.orientation.coords.iter().all(|c| c.is_finite());
        if !finite {
            return Err(SampleRejection::NonFinite);
        }
        Ok(())
    }
}
