use anyhow::Result;
use handpose_config::AppConfig;
use handpose_input::{HandEvent, HandSourceRegistry};
use handpose_reconstruct::{CanonicalJoint, HandPoseReconstructor, JointMapping};
use handpose_sensor::{Handedness, KeyPointSampler, SensorClient, SyntheticSensor};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Connect to the bridge, or fall back per `config.synthetic`.
async fn open_sampler(config: &AppConfig) -> Box<dyn KeyPointSampler> {
    match SensorClient::connect(&config.sensor.bridge_addr, config.tracking).await {
        Ok(client) => {
            info!("Hand-tracking bridge connected");
            Box::new(client)
        }
        Err(e) => {
            warn!(?e, "Bridge not available");
            fallback_sampler(config)
        }
    }
}

/// Synthetic hands when enabled, otherwise a sensor that never reports a hand.
fn fallback_sampler(config: &AppConfig) -> Box<dyn KeyPointSampler> {
    let synthetic = &config.synthetic;
    if synthetic.enabled {
        info!("Using synthetic hands");
        Box::new(SyntheticSensor::new(
            synthetic.left_origin,
            synthetic.right_origin,
            synthetic.cycle_secs,
            synthetic.hidden_fraction,
        ))
    } else {
        info!("Synthetic hands disabled, hands will read as not visible");
        Box::new(SensorClient::disconnected())
    }
}

fn log_event(event: &HandEvent) {
    match event {
        HandEvent::SourceDetected(hand) => info!(hand = hand.as_str(), "Source detected"),
        HandEvent::SourceLost(hand) => info!(hand = hand.as_str(), "Source lost"),
        HandEvent::PoseChanged {
            handedness,
            timestamp,
            joints,
        } => {
            let palm = joints[CanonicalJoint::Palm.index()].position;
            trace!(
                hand = handedness.as_str(),
                timestamp,
                palm_x = palm.x,
                palm_y = palm.y,
                palm_z = palm.z,
                "Pose changed"
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "handpose_app=info,handpose_sensor=info,handpose_reconstruct=info,handpose_input=info"
                    .into()
            }),
        )
        .init();

    info!("Hand pose reconstruction starting");

    // Load config.
    let config = handpose_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    let mapping = config.joint_mapping().unwrap_or_else(|e| {
        warn!(%e, "Invalid joint mapping overrides, using default table");
        JointMapping::default()
    });

    info!(
        ?config.tracking,
        overrides = config.mapping.len(),
        frame_rate_hz = config.sensor.frame_rate_hz,
        "Config loaded"
    );

    let sampler = open_sampler(&config).await;
    let mut reconstructor = HandPoseReconstructor::new(mapping, &config.tracking);
    let mut registry = HandSourceRegistry::new();

    let period = Duration::from_secs_f64(1.0 / config.sensor.frame_rate_hz.max(1) as f64);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut frame_count: u64 = 0;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for hand in Handedness::HANDS {
                    let result = reconstructor.poll(sampler.as_ref(), hand)?;
                    for event in registry.on_frame(&result) {
                        log_event(&event);
                    }
                }
                frame_count += 1;
                if frame_count % 600 == 0 {
                    debug!(
                        frame_count,
                        active = registry.active_sources().len(),
                        "Frames reconstructed"
                    );
                }
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                for event in registry.clear() {
                    log_event(&event);
                }
                break;
            }
        }
    }

    Ok(())
}
