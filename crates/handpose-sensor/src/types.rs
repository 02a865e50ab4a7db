use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which physical hand a sample or skeleton belongs to.
///
/// Only `Left` and `Right` can be sampled. `Both` and `Unknown` exist because
/// the toolkit side routes them around, and asking the sensor for either is a
/// caller error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
    Both,
    Unknown,
}

impl Handedness {
    /// The two hands a sensor can report, in slot order.
    pub const HANDS: [Handedness; 2] = [Handedness::Left, Handedness::Right];

    /// Slot index for per-hand storage, `None` for anything but Left/Right.
    pub fn slot(self) -> Option<usize> {
        match self {
            Self::Left => Some(0),
            Self::Right => Some(1),
            Self::Both | Self::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Both => "both",
            Self::Unknown => "unknown",
        }
    }
}

/// Anatomical points reported by the hand-tracking sensor.
///
/// Declaration order is the wire code order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum KeyPointId {
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
    WristCenter,
    WristUlnar,
    WristRadial,
    HandCenter,
}

impl KeyPointId {
    pub const COUNT: usize = 24;

    pub const ALL: [KeyPointId; Self::COUNT] = [
        Self::ThumbCmc,
        Self::ThumbMcp,
        Self::ThumbIp,
        Self::ThumbTip,
        Self::IndexMcp,
        Self::IndexPip,
        Self::IndexDip,
        Self::IndexTip,
        Self::MiddleMcp,
        Self::MiddlePip,
        Self::MiddleDip,
        Self::MiddleTip,
        Self::RingMcp,
        Self::RingPip,
        Self::RingDip,
        Self::RingTip,
        Self::PinkyMcp,
        Self::PinkyPip,
        Self::PinkyDip,
        Self::PinkyTip,
        Self::WristCenter,
        Self::WristUlnar,
        Self::WristRadial,
        Self::HandCenter,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }
}

/// A single sensor-reported sample. Rotation is never available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPoint {
    pub valid: bool,
    /// Position in meters, in the sensor's coordinate convention.
    pub position: Vec3,
}

impl KeyPoint {
    pub fn valid(position: Vec3) -> Self {
        Self {
            valid: true,
            position,
        }
    }

    pub fn invalid() -> Self {
        Self {
            valid: false,
            position: Vec3::ZERO,
        }
    }
}

/// Raw hand mesh as delivered by the sensor. Opaque to reconstruction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandMesh {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
}

/// One hand's raw read for the current frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandSample {
    /// Coarse whole-hand tracked signal from the sensor.
    pub visible: bool,
    pub key_points: HashMap<KeyPointId, KeyPoint>,
    pub mesh: Option<HandMesh>,
    /// Device capture time in nanoseconds, when the sensor reports one.
    pub device_timestamp_ns: Option<u64>,
}

impl HandSample {
    /// The "hand not visible / sensor not ready" sample.
    pub fn not_visible() -> Self {
        Self::default()
    }

    pub fn key_point(&self, id: KeyPointId) -> Option<&KeyPoint> {
        self.key_points.get(&id)
    }
}

/// Sensor-side smoothing of key-point positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPointFilterLevel {
    None,
    #[default]
    Smoothed,
    ExtraSmoothed,
}

/// Sensor-side robustness filtering of the hand pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseFilterLevel {
    None,
    #[default]
    Robust,
    ExtraRobust,
}

/// Settings forwarded verbatim to the sensor at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSettings {
    pub key_point_filter_level: KeyPointFilterLevel,
    pub pose_filter_level: PoseFilterLevel,
    /// Gates whether skeletons ever carry mesh data.
    pub hand_meshing_enabled: bool,
}
