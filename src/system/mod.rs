//! Rig orchestration and cross-thread state.
//!
//! This module contains the top-level [`ViewpointRig`] that owns the shared
//! state, spawns the sample-ingest thread, and exposes the render-loop and
//! tracking-feed entry points, along with the shared state and channel
//! message types.

pub mod messages;
pub mod rig;
pub mod shared_state;

pub use messages::IngestMsg;
pub use rig::{DisplayConfig, RigConfig, TrackingFeed, ViewpointRig};
pub use shared_state::SharedState;
