//! Pose smoothing & offset engine.
//!
//! Consumes positional-tracking samples from the stereo camera and maintains
//! two transforms:
//! - the *real* camera transform, integrated from device-space translation
//!   deltas (axis-converted, per-axis multiplied) plus the sample orientation
//! - the *virtual* transform handed to the renderer, which is the real
//!   transform plus a user offset, optionally smoothed over render ticks and
//!   freezable for repositioning without a visual jump

pub mod config;
pub mod pose_engine;
pub mod result;
pub mod sample;
pub mod state;

pub use config::{ConfigError, EngineConfig};
pub use pose_engine::PoseEngine;
pub use result::{EngineMetrics, SampleOutcome};
pub use sample::{SampleRejection, TrackingConfidence, TrackingSample};
pub use state::{FreezeState, TrackingStatus};
