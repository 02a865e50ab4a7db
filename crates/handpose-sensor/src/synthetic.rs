use crate::types::{HandSample, Handedness, KeyPoint, KeyPointId};
use crate::{KeyPointSampler, SensorError};
use glam::Vec3;
use std::collections::HashMap;
use std::time::Instant;

/// Finger layout relative to the wrist center (meters, +Y toward fingertips,
/// +X toward the little finger on a right hand).
struct FingerLayout {
    /// Base key point (CMC for the thumb, MCP otherwise) and the three above it.
    chain: [KeyPointId; 4],
    base: Vec3,
    segments: [f32; 3],
}

const FINGERS: [FingerLayout; 5] = [
    FingerLayout {
        chain: [
            KeyPointId::ThumbCmc,
            KeyPointId::ThumbMcp,
            KeyPointId::ThumbIp,
            KeyPointId::ThumbTip,
        ],
        base: Vec3::new(-0.025, 0.02, 0.0),
        segments: [0.045, 0.032, 0.027],
    },
    FingerLayout {
        chain: [
            KeyPointId::IndexMcp,
            KeyPointId::IndexPip,
            KeyPointId::IndexDip,
            KeyPointId::IndexTip,
        ],
        base: Vec3::new(-0.022, 0.085, 0.0),
        segments: [0.040, 0.024, 0.020],
    },
    FingerLayout {
        chain: [
            KeyPointId::MiddleMcp,
            KeyPointId::MiddlePip,
            KeyPointId::MiddleDip,
            KeyPointId::MiddleTip,
        ],
        base: Vec3::new(0.0, 0.09, 0.0),
        segments: [0.045, 0.028, 0.022],
    },
    FingerLayout {
        chain: [
            KeyPointId::RingMcp,
            KeyPointId::RingPip,
            KeyPointId::RingDip,
            KeyPointId::RingTip,
        ],
        base: Vec3::new(0.02, 0.085, 0.0),
        segments: [0.042, 0.027, 0.021],
    },
    FingerLayout {
        chain: [
            KeyPointId::PinkyMcp,
            KeyPointId::PinkyPip,
            KeyPointId::PinkyDip,
            KeyPointId::PinkyTip,
        ],
        base: Vec3::new(0.037, 0.075, 0.0),
        segments: [0.032, 0.020, 0.018],
    },
];

/// Animated open/close hands for running without a device.
///
/// Each hand cycles from open to a loose fist and back every `cycle_secs`,
/// and is hidden for the last `hidden_fraction` of each cycle so consumers see
/// tracking loss and recovery.
pub struct SyntheticSensor {
    started: Instant,
    origins: [Vec3; 2],
    cycle_secs: f32,
    hidden_fraction: f32,
}

impl SyntheticSensor {
    pub fn new(left_origin: Vec3, right_origin: Vec3, cycle_secs: f32, hidden_fraction: f32) -> Self {
        Self {
            started: Instant::now(),
            origins: [left_origin, right_origin],
            cycle_secs: cycle_secs.max(0.1),
            hidden_fraction: hidden_fraction.clamp(0.0, 1.0),
        }
    }

    /// Sample a hand at an explicit time since start.
    pub fn sample_at(&self, handedness: Handedness, t_secs: f32) -> Result<HandSample, SensorError> {
        let slot = handedness
            .slot()
            .ok_or(SensorError::InvalidHandedness(handedness))?;

        let phase = (t_secs / self.cycle_secs).fract();
        if phase >= 1.0 - self.hidden_fraction {
            return Ok(HandSample::not_visible());
        }

        // 0 = open, 1 = curled.
        let curl = 0.5 - 0.5 * (phase * std::f32::consts::TAU).cos();
        // Left hands are mirrored across X.
        let mirror = if handedness == Handedness::Left {
            Vec3::new(-1.0, 1.0, 1.0)
        } else {
            Vec3::ONE
        };
        let origin = self.origins[slot];
        let place = |local: Vec3| origin + local * mirror;

        let mut key_points = HashMap::with_capacity(KeyPointId::COUNT);
        key_points.insert(KeyPointId::WristCenter, KeyPoint::valid(place(Vec3::ZERO)));
        key_points.insert(
            KeyPointId::WristUlnar,
            KeyPoint::valid(place(Vec3::new(0.025, 0.0, 0.0))),
        );
        key_points.insert(
            KeyPointId::WristRadial,
            KeyPoint::valid(place(Vec3::new(-0.025, 0.0, 0.0))),
        );
        key_points.insert(
            KeyPointId::HandCenter,
            KeyPoint::valid(place(Vec3::new(0.0, 0.045, 0.0))),
        );

        for finger in &FINGERS {
            let mut point = finger.base;
            let mut angle = 0.0_f32;
            key_points.insert(finger.chain[0], KeyPoint::valid(place(point)));
            for (id, length) in finger.chain[1..].iter().zip(finger.segments) {
                // Each joint bends toward -Z.
                angle += curl * 1.2;
                point += Vec3::new(0.0, angle.cos(), -angle.sin()) * length;
                key_points.insert(*id, KeyPoint::valid(place(point)));
            }
        }

        Ok(HandSample {
            visible: true,
            key_points,
            mesh: None,
            device_timestamp_ns: None,
        })
    }
}

impl KeyPointSampler for SyntheticSensor {
    fn sample(&self, handedness: Handedness) -> Result<HandSample, SensorError> {
        self.sample_at(handedness, self.started.elapsed().as_secs_f32())
    }
}

/// Fixed per-hand samples, returned unchanged until replaced.
#[derive(Debug, Clone, Default)]
pub struct StaticSampler {
    hands: [HandSample; 2],
}

impl StaticSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the sample returned for `handedness`.
    pub fn set(&mut self, handedness: Handedness, sample: HandSample) -> Result<(), SensorError> {
        let slot = handedness
            .slot()
            .ok_or(SensorError::InvalidHandedness(handedness))?;
        self.hands[slot] = sample;
        Ok(())
    }
}

impl KeyPointSampler for StaticSampler {
    fn sample(&self, handedness: Handedness) -> Result<HandSample, SensorError> {
        let slot = handedness
            .slot()
            .ok_or(SensorError::InvalidHandedness(handedness))?;
        Ok(self.hands[slot].clone())
    }
}
