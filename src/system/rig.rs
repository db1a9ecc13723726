//! Top-level rig binding the tracking feed, the render loop and the remap
//! builder together.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::geometry::Pose;
use crate::remap::{build_remap, CameraResolution, RemapError, RemapTable};
use crate::system::messages::IngestMsg;
use crate::system::shared_state::SharedState;
use crate::tracking::{EngineConfig, EngineMetrics, TrackingSample};

/// Capacity of the sample channel between the tracking collaborator and the
/// ingest thread. A full queue drops the newest sample rather than blocking
/// the tracking thread.
const DEFAULT_SAMPLE_QUEUE_CAPACITY: usize = 8;

/// Display-side configuration for remap construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub device_name: String,
    pub camera_resolution: CameraResolution,
    /// Distortion/depth parameter in `[0, 1]`.
    pub distortion: f64,
}

/// Full rig configuration, supplied by the hosting controller at
/// construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub engine: EngineConfig,
    pub sample_queue_capacity: usize,
    /// Display profile to build the remap table for. `None` disables the
    /// undistortion display path entirely.
    pub display: Option<DisplayConfig>,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            sample_queue_capacity: DEFAULT_SAMPLE_QUEUE_CAPACITY,
            display: None,
        }
    }
}

/// Cloneable handle the tracking collaborator pushes samples through.
///
/// Sending never blocks: when the ingest queue is full the sample is dropped
/// with a warning and the next valid sample re-establishes the delta
/// baseline.
#[derive(Clone)]
pub struct TrackingFeed {
    tx: Sender<IngestMsg>,
}

impl TrackingFeed {
    /// Push one sample. Returns `false` if the sample was dropped (queue
    /// full) or the rig has shut down.
    pub fn send(&self, sample: TrackingSample) -> bool {
        match self.tx.try_send(IngestMsg::Sample(sample)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(
                    timestamp_ns = sample.timestamp_ns,
                    "sample queue full, dropping tracking sample"
                );
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Binds the stereo camera's tracking output to a virtual viewpoint.
///
/// Owns the shared state and the ingest thread. Construction registers the
/// tracking subscription (spawns the ingest thread); `shutdown` or `Drop`
/// unregisters it.
pub struct ViewpointRig {
    shared: Arc<SharedState>,
    sample_tx: Sender<IngestMsg>,
    ingest_handle: Option<JoinHandle<()>>,
    display: Option<DisplayConfig>,
}

impl ViewpointRig {
    /// Create the rig and start listening for tracking samples.
    ///
    /// Fails only on invalid engine configuration. The display remap is not
    /// built here: call [`build_display_remap`](Self::build_display_remap)
    /// so a bad display profile cannot take the pose pipeline down with it.
    pub fn new(config: RigConfig) -> Result<Self> {
        config
            .engine
            .validate()
            .context("invalid engine configuration")?;

        let shared = SharedState::new(config.engine);
        let capacity = config.sample_queue_capacity.max(1);
        let (sample_tx, sample_rx) = bounded::<IngestMsg>(capacity);

        let ingest_handle = Self::spawn_ingest(shared.clone(), sample_rx);
        info!(queue_capacity = capacity, "viewpoint rig started");

        Ok(Self {
            shared,
            sample_tx,
            ingest_handle: Some(ingest_handle),
            display: config.display,
        })
    }

    fn spawn_ingest(shared: Arc<SharedState>, rx: Receiver<IngestMsg>) -> JoinHandle<()> {
        thread::spawn(move || {
            for msg in rx.iter() {
                match msg {
                    IngestMsg::Sample(sample) => {
                        if shared.is_shutdown_requested() {
                            break;
                        }
                        shared.engine.lock().on_tracking_sample(&sample);
                    }
                    IngestMsg::Shutdown => break,
                }
            }
        })
    }

    /// Handle for the tracking collaborator to push samples through.
    pub fn feed(&self) -> TrackingFeed {
        TrackingFeed {
            tx: self.sample_tx.clone(),
        }
    }

    /// Advance the virtual transform and publish it for the renderer.
    /// Called once per render frame.
    pub fn tick(&self, delta_seconds: f64) {
        let pose = {
            let mut engine = self.shared.engine.lock();
            engine.tick(delta_seconds);
            engine.virtual_transform()
        };
        self.shared.publish_render_pose(pose);
    }

    /// The transform the renderer should use this frame.
    pub fn render_pose(&self) -> Pose {
        self.shared.render_pose()
    }

    /// Freeze or unfreeze the virtual viewpoint. Atomic with respect to
    /// sample ingestion and ticking.
    pub fn set_freeze(&self, enable: bool) {
        self.shared.engine.lock().set_freeze(enable);
    }

    pub fn is_frozen(&self) -> bool {
        self.shared.engine.lock().is_frozen()
    }

    /// Align the tracked origin with a scene-defined spawn point. Call once
    /// before tracking begins; calling again replaces the baseline.
    pub fn set_start_offset_location(&self, location: Vector3<f64>) {
        self.shared.engine.lock().set_start_offset_location(location);
    }

    /// Preview the device→scene translation mapping without mutating state.
    pub fn real_translation_to_virtual_translation(
        &self,
        real_translation: &Vector3<f64>,
    ) -> Vector3<f64> {
        self.shared
            .engine
            .lock()
            .real_translation_to_virtual_translation(real_translation)
    }

    pub fn metrics(&self) -> EngineMetrics {
        self.shared.engine.lock().metrics()
    }

    /// Build and publish the remap table for the configured display.
    ///
    /// May run off the render thread; the table is swapped in whole on
    /// success. On failure the previous table (or none) stays in place and
    /// the pose pipeline is unaffected.
    pub fn build_display_remap(&self) -> Result<Arc<RemapTable>, RemapError> {
        let display = self.display.as_ref().ok_or(RemapError::NotConfigured)?;
        self.rebuild_remap(display)
    }

    /// Rebuild the remap table for a new display configuration, replacing
    /// the stored one on success.
    pub fn rebuild_remap(&self, display: &DisplayConfig) -> Result<Arc<RemapTable>, RemapError> {
        let table = Arc::new(build_remap(
            &display.device_name,
            display.camera_resolution,
            display.distortion,
        )?);
        self.shared.publish_remap(table.clone());
        let device_name = &display.device_name;
        info!(
            device = %device_name,
            width = table.width(),
            height = table.height(),
            "remap table published"
        );
        Ok(table)
    }

    /// The published remap table, if any.
    pub fn remap(&self) -> Option<Arc<RemapTable>> {
        self.shared.remap()
    }

    /// Stop listening for samples and join the ingest thread.
    pub fn shutdown(&mut self) {
        self.shared.request_shutdown();
        // Unblocks the ingest loop if the queue is empty.
        let _ = self.sample_tx.try_send(IngestMsg::Shutdown);
        if let Some(handle) = self.ingest_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ViewpointRig {
    fn drop(&mut self) {
        self.shutdown();
    }
}
