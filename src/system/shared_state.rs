//! Shared state between the sample-ingest thread and the render loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::geometry::Pose;
use crate::remap::RemapTable;
use crate::tracking::{EngineConfig, PoseEngine};

/// State shared by the sample callback, the render tick and freeze toggling.
///
/// The engine sits behind a single mutex: every mutation (sample, tick,
/// freeze, start offset) is one short critical section, which is what makes
/// freeze toggling atomic with respect to both call sites. The render pose
/// and remap table are published whole behind read-write locks so the
/// renderer only ever observes complete values.
pub struct SharedState {
    /// The pose engine. Sample ingest writes, tick reads and writes.
    pub engine: Mutex<PoseEngine>,

    /// Last virtual transform published by `tick`, read by the renderer.
    render_pose: RwLock<Pose>,

    /// Remap table, swapped in atomically once built. `None` until the first
    /// successful build.
    remap: RwLock<Option<Arc<RemapTable>>>,

    /// Request the ingest thread to finish and exit.
    shutdown_requested: AtomicBool,
}

impl SharedState {
    pub fn new(config: EngineConfig) -> Arc<Self> {
        Arc::new(Self {
            engine: Mutex::new(PoseEngine::new(config)),
            render_pose: RwLock::new(Pose::identity()),
            remap: RwLock::new(None),
            shutdown_requested: AtomicBool::new(false),
        })
    }

    /// The most recently published virtual transform.
    pub fn render_pose(&self) -> Pose {
        *self.render_pose.read()
    }

    pub fn publish_render_pose(&self, pose: Pose) {
        *self.render_pose.write() = pose;
    }

    /// The current remap table, if one has been built.
    pub fn remap(&self) -> Option<Arc<RemapTable>> {
        self.remap.read().clone()
    }

    /// Swap in a fully-built remap table. Never called with a partial table.
    pub fn publish_remap(&self, table: Arc<RemapTable>) {
        *self.remap.write() = Some(table);
    }

    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }
}
