//! The pose smoothing & offset engine.
//!
//! Integrates device-space translation deltas into a scene-space real camera
//! transform, and advances the virtual (render) transform towards
//! real ⊕ offset once per render tick, with optional frame-rate-independent
//! smoothing and a freeze mechanism for repositioning without a visual jump.

use nalgebra::{UnitQuaternion, Vector3};
use tracing::{debug, warn};

use crate::geometry::frames::{device_position_to_scene, device_rotation_to_scene};
use crate::geometry::Pose;
use crate::tracking::config::EngineConfig;
use crate::tracking::result::{EngineMetrics, SampleOutcome};
use crate::tracking::sample::TrackingSample;
use crate::tracking::state::{FreezeState, TrackingStatus};

/// Pose smoothing & offset engine.
///
/// Single-writer state machine: all mutation goes through
/// [`on_tracking_sample`](Self::on_tracking_sample),
/// [`tick`](Self::tick), [`set_freeze`](Self::set_freeze) and
/// [`set_start_offset_location`](Self::set_start_offset_location). Callers
/// arriving from different threads serialize through the rig's lock.
pub struct PoseEngine {
    config: EngineConfig,

    /// Scene-space baseline the accumulated motion rides on.
    start_offset: Vector3<f64>,

    /// Scene-space motion accumulated from sample deltas.
    accumulated: Vector3<f64>,

    /// Real camera orientation in scene frame, from the latest valid sample.
    real_rotation: UnitQuaternion<f64>,

    /// Device-space position of the last applied sample. `None` until the
    /// first valid sample, which establishes the delta baseline and
    /// contributes no motion.
    previous_location: Option<Vector3<f64>>,

    /// Device-space delta applied by the most recent valid sample.
    previous_to_current: Vector3<f64>,

    freeze: FreezeState,

    virtual_pose: Pose,
    previous_virtual: Pose,

    metrics: EngineMetrics,
}

impl PoseEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            start_offset: Vector3::zeros(),
            accumulated: Vector3::zeros(),
            real_rotation: UnitQuaternion::identity(),
            previous_location: None,
            previous_to_current: Vector3::zeros(),
            freeze: FreezeState::Tracking,
            virtual_pose: Pose::identity(),
            previous_virtual: Pose::identity(),
            metrics: EngineMetrics::default(),
        }
    }

    /// Ingest one tracking sample.
    ///
    /// Invalid samples (low confidence, NaN/inf values) leave every field
    /// untouched, including the rolling previous location, and are reported
    /// through the returned outcome and a warning. Never panics.
    pub fn on_tracking_sample(&mut self, sample: &TrackingSample) -> SampleOutcome {
        let outcome = match sample.validate() {
            Ok(()) => {
                if let Some(prev) = self.previous_location {
                    let delta_device = sample.position - prev;
                    self.previous_to_current = delta_device;
                    let delta_scene = self.map_translation(&delta_device);
                    self.accumulated += delta_scene;
                }
                self.previous_location = Some(sample.position);
                self.real_rotation = device_rotation_to_scene(&sample.orientation);
                SampleOutcome::Applied
            }
            Err(reason) => {
                warn!(?reason, timestamp_ns = sample.timestamp_ns, "discarding tracking sample");
                SampleOutcome::Rejected(reason)
            }
        };
        self.metrics.record(outcome);
        outcome
    }

    /// Advance the virtual transform once per render frame.
    ///
    /// No-op while frozen: the virtual transform holds steady until the
    /// unfreeze fold. With lerp enabled the blend factor is
    /// `1 - exp(-lerp_intensity * dt)`, so N sub-ticks summing to T land on
    /// the same pose as a single tick of T.
    pub fn tick(&mut self, delta_seconds: f64) {
        if self.freeze.is_frozen() {
            self.previous_virtual = self.virtual_pose;
            return;
        }

        let target = self.render_target();
        self.virtual_pose = if self.config.enable_lerp && self.config.lerp_intensity > 0.0 {
            let dt = delta_seconds.max(0.0);
            let alpha = 1.0 - (-self.config.lerp_intensity * dt).exp();
            self.previous_virtual.blend_towards(&target, alpha)
        } else {
            target
        };
        self.previous_virtual = self.virtual_pose;

        debug!(
            x = self.virtual_pose.translation.x,
            y = self.virtual_pose.translation.y,
            z = self.virtual_pose.translation.z,
            "virtual transform advanced"
        );
    }

    /// Toggle the freeze state.
    ///
    /// Freezing captures the current real transform as the baseline and
    /// stops feeding motion into the virtual transform. Unfreezing folds the
    /// baseline→current delta into the transform offset so the render target
    /// is continuous: translation always, rotation only when
    /// `use_rotation_offset` is set (composed via quaternions). Toggling to
    /// the state already in effect is a no-op.
    pub fn set_freeze(&mut self, enable: bool) {
        match (enable, self.freeze) {
            (true, FreezeState::Tracking) => {
                self.freeze = FreezeState::Frozen {
                    baseline: self.real_transform(),
                };
            }
            (false, FreezeState::Frozen { baseline }) => {
                let real = self.real_transform();
                self.config.transform_offset.translation +=
                    baseline.translation - real.translation;
                if self.config.use_rotation_offset {
                    // offset' ∘ real == offset ∘ baseline, the target held
                    // while frozen.
                    self.config.transform_offset.rotation = self.config.transform_offset.rotation
                        * baseline.rotation
                        * real.rotation.inverse();
                }
                self.freeze = FreezeState::Tracking;
            }
            // Double-toggle either way: not an error.
            _ => {}
        }
    }

    /// Replace the scene-space baseline under the accumulated motion.
    ///
    /// Intended to be called once before tracking begins, aligning the
    /// tracked origin with a scene-defined spawn point. Calling it again
    /// replaces the baseline, it never accumulates.
    pub fn set_start_offset_location(&mut self, location: Vector3<f64>) {
        self.start_offset = location;
    }

    /// Pure preview of the device→scene translation mapping: axis conversion
    /// followed by the per-axis multiplier. Does not mutate state.
    pub fn real_translation_to_virtual_translation(
        &self,
        real_translation: &Vector3<f64>,
    ) -> Vector3<f64> {
        self.map_translation(real_translation)
    }

    /// The unsmoothed, continuously-updated pose of the physical camera in
    /// scene space.
    pub fn real_transform(&self) -> Pose {
        Pose::new(self.real_rotation, self.start_offset + self.accumulated)
    }

    /// The transform handed to the renderer.
    pub fn virtual_transform(&self) -> Pose {
        self.virtual_pose
    }

    /// Device-space delta applied by the most recent valid sample.
    pub fn previous_to_current_location(&self) -> Vector3<f64> {
        self.previous_to_current
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze.is_frozen()
    }

    pub fn status(&self) -> TrackingStatus {
        self.metrics.status
    }

    pub fn metrics(&self) -> EngineMetrics {
        self.metrics
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Mutable access to the runtime-tunable configuration
    /// (offset, lerp settings, multiplier).
    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    /// Target the virtual transform converges to: real transform with the
    /// offset applied in scene frame.
    fn render_target(&self) -> Pose {
        let real = self.real_transform();
        Pose::new(
            self.config.transform_offset.rotation * real.rotation,
            real.translation + self.config.transform_offset.translation,
        )
    }

    fn map_translation(&self, delta_device: &Vector3<f64>) -> Vector3<f64> {
        device_position_to_scene(delta_device).component_mul(&self.config.translation_multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::sample::{SampleRejection, TrackingConfidence};
    use approx::assert_relative_eq;

    fn tracked(timestamp_ns: u64, position: Vector3<f64>) -> TrackingSample {
        TrackingSample::new(
            timestamp_ns,
            position,
            UnitQuaternion::identity(),
            TrackingConfidence::Tracked,
        )
    }

    fn engine_with(config: EngineConfig) -> PoseEngine {
        PoseEngine::new(config)
    }

    #[test]
    fn test_accumulation_matches_worked_example() {
        // Multiplier (1,1,1), start offset (0,0,0), samples at the origin
        // then at device (1,0,0): real position ends at the scene image of
        // that delta.
        let mut engine = engine_with(EngineConfig::default());
        engine.set_start_offset_location(Vector3::zeros());

        engine.on_tracking_sample(&tracked(0, Vector3::zeros()));
        engine.on_tracking_sample(&tracked(1, Vector3::new(1.0, 0.0, 0.0)));

        let expected = device_position_to_scene(&Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(engine.real_transform().translation, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_accumulation_is_cumulative_sum_of_deltas() {
        let multiplier = Vector3::new(2.0, 0.5, 1.0);
        let mut engine = engine_with(EngineConfig {
            translation_multiplier: multiplier,
            ..Default::default()
        });
        let start = Vector3::new(10.0, 0.0, -3.0);
        engine.set_start_offset_location(start);

        let positions = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.2, 0.0, 0.1),
            Vector3::new(0.5, -0.3, 0.1),
            Vector3::new(0.4, -0.3, 0.6),
        ];
        let mut expected = start;
        for pair in positions.windows(2) {
            expected += device_position_to_scene(&(pair[1] - pair[0])).component_mul(&multiplier);
        }
        for (i, p) in positions.iter().enumerate() {
            engine.on_tracking_sample(&tracked(i as u64, *p));
        }

        assert_relative_eq!(engine.real_transform().translation, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_first_sample_contributes_no_motion() {
        let mut engine = engine_with(EngineConfig::default());
        engine.on_tracking_sample(&tracked(0, Vector3::new(5.0, 5.0, 5.0)));

        assert_relative_eq!(
            engine.real_transform().translation,
            Vector3::zeros(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_invalid_samples_change_nothing() {
        let mut engine = engine_with(EngineConfig::default());
        engine.on_tracking_sample(&tracked(0, Vector3::zeros()));
        engine.on_tracking_sample(&tracked(1, Vector3::new(1.0, 0.0, 0.0)));
        let before = engine.real_transform();
        let prev_delta = engine.previous_to_current_location();

        let mut searching = tracked(2, Vector3::new(50.0, 0.0, 0.0));
        searching.confidence = TrackingConfidence::Searching;
        let outcome = engine.on_tracking_sample(&searching);
        assert_eq!(outcome, SampleOutcome::Rejected(SampleRejection::NotTracked));

        let nan = tracked(3, Vector3::new(f64::NAN, 0.0, 0.0));
        let outcome = engine.on_tracking_sample(&nan);
        assert_eq!(outcome, SampleOutcome::Rejected(SampleRejection::NonFinite));

        assert_eq!(engine.real_transform(), before);
        assert_eq!(engine.previous_to_current_location(), prev_delta);
        assert_eq!(engine.status(), TrackingStatus::Lost);

        // A following valid sample integrates against the last applied
        // position, not the rejected ones.
        engine.on_tracking_sample(&tracked(4, Vector3::new(2.0, 0.0, 0.0)));
        let expected =
            before.translation + device_position_to_scene(&Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(engine.real_transform().translation, expected, epsilon = 1e-12);
        assert_eq!(engine.status(), TrackingStatus::Ok);
    }

    #[test]
    fn test_tick_without_lerp_is_exact() {
        let offset = Pose::new(
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.4),
            Vector3::new(0.0, 1.0, 0.0),
        );
        let mut engine = engine_with(EngineConfig {
            enable_lerp: false,
            transform_offset: offset,
            ..Default::default()
        });
        engine.on_tracking_sample(&tracked(0, Vector3::zeros()));
        engine.on_tracking_sample(&tracked(1, Vector3::new(0.0, 0.0, 2.0)));
        engine.tick(1.0 / 90.0);

        let real = engine.real_transform();
        let virt = engine.virtual_transform();
        assert_relative_eq!(
            virt.translation,
            real.translation + offset.translation,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            virt.rotation.angle_to(&(offset.rotation * real.rotation)),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_lerp_converges_to_fixed_target() {
        let mut engine = engine_with(EngineConfig {
            enable_lerp: true,
            lerp_intensity: 8.0,
            ..Default::default()
        });
        engine.on_tracking_sample(&tracked(0, Vector3::zeros()));
        engine.on_tracking_sample(&tracked(1, Vector3::new(1.0, -1.0, 3.0)));

        for _ in 0..2000 {
            engine.tick(1.0 / 90.0);
        }

        assert_relative_eq!(
            engine.virtual_transform().translation,
            engine.real_transform().translation,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_lerp_is_independent_of_tick_granularity() {
        let config = EngineConfig {
            enable_lerp: true,
            lerp_intensity: 5.0,
            ..Default::default()
        };

        let mut coarse = engine_with(config.clone());
        let mut fine = engine_with(config);
        for engine in [&mut coarse, &mut fine] {
            engine.on_tracking_sample(&tracked(0, Vector3::zeros()));
            engine.on_tracking_sample(&tracked(1, Vector3::new(2.0, 0.5, -1.0)));
        }

        coarse.tick(0.1);
        for _ in 0..10 {
            fine.tick(0.01);
        }

        assert_relative_eq!(
            coarse.virtual_transform().translation,
            fine.virtual_transform().translation,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_freeze_holds_virtual_while_real_moves() {
        let mut engine = engine_with(EngineConfig::default());
        engine.on_tracking_sample(&tracked(0, Vector3::zeros()));
        engine.tick(0.01);
        let held = engine.virtual_transform();

        engine.set_freeze(true);
        assert!(engine.is_frozen());

        engine.on_tracking_sample(&tracked(1, Vector3::new(3.0, 0.0, 0.0)));
        engine.tick(0.01);
        engine.tick(0.01);

        assert_eq!(engine.virtual_transform(), held);
        // The real transform kept integrating underneath.
        assert_relative_eq!(
            engine.real_transform().translation,
            device_position_to_scene(&Vector3::new(3.0, 0.0, 0.0)),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_freeze_unfreeze_round_trip_without_samples_is_seamless() {
        let mut engine = engine_with(EngineConfig::default());
        engine.on_tracking_sample(&tracked(0, Vector3::zeros()));
        engine.on_tracking_sample(&tracked(1, Vector3::new(1.0, 1.0, 1.0)));
        engine.tick(0.01);
        let before = engine.virtual_transform();
        let offset_before = engine.config().transform_offset;

        engine.set_freeze(true);
        engine.set_freeze(false);
        engine.tick(0.01);

        assert_relative_eq!(
            engine.virtual_transform().translation,
            before.translation,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            engine.config().transform_offset.translation,
            offset_before.translation,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_unfreeze_folds_motion_into_offset() {
        // Camera translates while frozen; after unfreezing the render target
        // is continuous, so the virtual transform does not jump.
        let mut engine = engine_with(EngineConfig::default());
        engine.on_tracking_sample(&tracked(0, Vector3::zeros()));
        engine.tick(0.01);
        let held = engine.virtual_transform();

        engine.set_freeze(true);
        engine.on_tracking_sample(&tracked(1, Vector3::new(0.0, 0.0, 5.0)));
        engine.set_freeze(false);
        engine.tick(0.01);

        assert_relative_eq!(
            engine.virtual_transform().translation,
            held.translation,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_unfreeze_folds_rotation_when_enabled() {
        let mut engine = engine_with(EngineConfig {
            use_rotation_offset: true,
            ..Default::default()
        });
        engine.on_tracking_sample(&tracked(0, Vector3::zeros()));
        engine.tick(0.01);
        let held = engine.virtual_transform();

        engine.set_freeze(true);
        let mut turned = tracked(1, Vector3::zeros());
        turned.orientation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.9);
        engine.on_tracking_sample(&turned);
        engine.set_freeze(false);
        engine.tick(0.01);

        assert_relative_eq!(
            engine.virtual_transform().rotation.angle_to(&held.rotation),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_double_toggle_is_noop() {
        let mut engine = engine_with(EngineConfig::default());
        engine.on_tracking_sample(&tracked(0, Vector3::zeros()));

        // Unfreeze without a prior freeze.
        engine.set_freeze(false);
        assert!(!engine.is_frozen());

        engine.set_freeze(true);
        let frozen_state = engine.config().transform_offset;
        engine.set_freeze(true);
        assert!(engine.is_frozen());
        assert_eq!(engine.config().transform_offset, frozen_state);
    }

    #[test]
    fn test_start_offset_replaces_not_accumulates() {
        let mut engine = engine_with(EngineConfig::default());
        engine.set_start_offset_location(Vector3::new(1.0, 2.0, 3.0));
        engine.set_start_offset_location(Vector3::new(4.0, 0.0, 0.0));

        assert_relative_eq!(
            engine.real_transform().translation,
            Vector3::new(4.0, 0.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_translation_preview_is_pure() {
        let engine = engine_with(EngineConfig {
            translation_multiplier: Vector3::new(2.0, 2.0, 2.0),
            ..Default::default()
        });
        let before = engine.real_transform();

        let mapped =
            engine.real_translation_to_virtual_translation(&Vector3::new(0.0, 0.0, 1.0));

        assert_relative_eq!(mapped, Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
        assert_eq!(engine.real_transform(), before);
    }

    #[test]
    fn test_orientation_is_axis_converted() {
        let mut engine = engine_with(EngineConfig::default());
        let mut sample = tracked(0, Vector3::zeros());
        sample.orientation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.6);
        engine.on_tracking_sample(&sample);

        let expected = device_rotation_to_scene(&sample.orientation);
        assert_relative_eq!(
            engine.real_transform().rotation.angle_to(&expected),
            0.0,
            epsilon = 1e-12
        );
    }
}
