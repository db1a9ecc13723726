use std::f64::consts::TAU;
use std::fs;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use nalgebra::{UnitQuaternion, Vector3};
use tracing::{error, info};

use viewpoint_rig::remap::CameraResolution;
use viewpoint_rig::system::{DisplayConfig, RigConfig, ViewpointRig};
use viewpoint_rig::tracking::{TrackingConfidence, TrackingSample};

/// Tracking callback cadence (device side) and render tick rate.
const SAMPLE_HZ: f64 = 60.0;
const RENDER_HZ: f64 = 90.0;
const RENDER_TICKS: usize = 450;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            serde_json::from_str::<RigConfig>(&text)
                .with_context(|| format!("parsing config file {path}"))?
        }
        None => RigConfig {
            display: Some(DisplayConfig {
                device_name: "HTC_VIVE".to_string(),
                camera_resolution: CameraResolution::Hd720,
                distortion: 0.5,
            }),
            ..Default::default()
        },
    };

    let mut rig = ViewpointRig::new(config)?;
    rig.set_start_offset_location(Vector3::new(0.0, 0.0, 1.7));

    // Remap failure only disables the undistortion display; tracking runs on.
    match rig.build_display_remap() {
        Ok(table) => info!(
            width = table.width(),
            height = table.height(),
            "remap table ready for upload"
        ),
        Err(e) => error!(error = %e, "remap construction failed, continuing without display"),
    }

    // Synthetic tracking feed: a slow circular sweep with a burst of
    // tracking-lost samples in the middle.
    let feed = rig.feed();
    let producer = thread::spawn(move || {
        let n = (SAMPLE_HZ * RENDER_TICKS as f64 / RENDER_HZ) as u64;
        for i in 0..n {
            let t = i as f64 / SAMPLE_HZ;
            let angle = 0.1 * TAU * t;
            let confidence = if (120..140).contains(&i) {
                TrackingConfidence::Searching
            } else {
                TrackingConfidence::Tracked
            };
            let sample = TrackingSample::new(
                (t * 1e9) as u64,
                Vector3::new(0.5 * angle.cos(), 0.0, 0.5 * angle.sin()),
                UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -angle),
                confidence,
            );
            feed.send(sample);
            thread::sleep(Duration::from_secs_f64(1.0 / SAMPLE_HZ));
        }
    });

    // Render loop with a freeze window in the middle.
    for frame in 0..RENDER_TICKS {
        if frame == 150 {
            info!("freezing viewpoint for repositioning");
            rig.set_freeze(true);
        }
        if frame == 240 {
            info!("unfreezing viewpoint");
            rig.set_freeze(false);
        }

        rig.tick(1.0 / RENDER_HZ);

        if frame % 90 == 0 {
            let pose = rig.render_pose();
            info!(
                frame,
                x = pose.translation.x,
                y = pose.translation.y,
                z = pose.translation.z,
                frozen = rig.is_frozen(),
                "render pose"
            );
        }
        thread::sleep(Duration::from_secs_f64(1.0 / RENDER_HZ));
    }

    producer.join().ok();
    let metrics = rig.metrics();
    info!(
        applied = metrics.samples_applied,
        rejected = metrics.samples_rejected,
        status = ?metrics.status,
        "feed finished"
    );

    rig.shutdown();
    Ok(())
}
