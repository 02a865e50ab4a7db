use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// The canonical hand joints consumers expect, independent of what the
/// sensor can actually see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalJoint {
    Wrist,
    Palm,
    ThumbMetacarpal,
    ThumbProximal,
    ThumbDistal,
    ThumbTip,
    IndexMetacarpal,
    IndexKnuckle,
    IndexMiddle,
    IndexDistal,
    IndexTip,
    MiddleMetacarpal,
    MiddleKnuckle,
    MiddleMiddle,
    MiddleDistal,
    MiddleTip,
    RingMetacarpal,
    RingKnuckle,
    RingMiddle,
    RingDistal,
    RingTip,
    PinkyMetacarpal,
    PinkyKnuckle,
    PinkyMiddle,
    PinkyDistal,
    PinkyTip,
}

/// Total number of canonical joints per hand.
pub const JOINT_COUNT: usize = 26;

impl CanonicalJoint {
    /// Every joint in index order. This is also the reconstruction order.
    pub const ALL: [CanonicalJoint; JOINT_COUNT] = [
        Self::Wrist,
        Self::Palm,
        Self::ThumbMetacarpal,
        Self::ThumbProximal,
        Self::ThumbDistal,
        Self::ThumbTip,
        Self::IndexMetacarpal,
        Self::IndexKnuckle,
        Self::IndexMiddle,
        Self::IndexDistal,
        Self::IndexTip,
        Self::MiddleMetacarpal,
        Self::MiddleKnuckle,
        Self::MiddleMiddle,
        Self::MiddleDistal,
        Self::MiddleTip,
        Self::RingMetacarpal,
        Self::RingKnuckle,
        Self::RingMiddle,
        Self::RingDistal,
        Self::RingTip,
        Self::PinkyMetacarpal,
        Self::PinkyKnuckle,
        Self::PinkyMiddle,
        Self::PinkyDistal,
        Self::PinkyTip,
    ];

    /// Array index (0-25).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::Palm => "palm",
            Self::ThumbMetacarpal => "thumb-metacarpal",
            Self::ThumbProximal => "thumb-proximal",
            Self::ThumbDistal => "thumb-distal",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMetacarpal => "index-metacarpal",
            Self::IndexKnuckle => "index-knuckle",
            Self::IndexMiddle => "index-middle",
            Self::IndexDistal => "index-distal",
            Self::IndexTip => "index-tip",
            Self::MiddleMetacarpal => "middle-metacarpal",
            Self::MiddleKnuckle => "middle-knuckle",
            Self::MiddleMiddle => "middle-middle",
            Self::MiddleDistal => "middle-distal",
            Self::MiddleTip => "middle-tip",
            Self::RingMetacarpal => "ring-metacarpal",
            Self::RingKnuckle => "ring-knuckle",
            Self::RingMiddle => "ring-middle",
            Self::RingDistal => "ring-distal",
            Self::RingTip => "ring-tip",
            Self::PinkyMetacarpal => "pinky-metacarpal",
            Self::PinkyKnuckle => "pinky-knuckle",
            Self::PinkyMiddle => "pinky-middle",
            Self::PinkyDistal => "pinky-distal",
            Self::PinkyTip => "pinky-tip",
        }
    }

    /// Fingertip joints for convenience.
    pub fn fingertips() -> [CanonicalJoint; 5] {
        [
            Self::ThumbTip,
            Self::IndexTip,
            Self::MiddleTip,
            Self::RingTip,
            Self::PinkyTip,
        ]
    }
}

/// Pose of a single joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPose {
    /// Position in the sensor's linear unit (meters).
    pub position: Vec3,
    pub rotation: Quat,
}

impl JointPose {
    /// Zero position, identity rotation. Means "not meaningfully tracked".
    pub const IDENTITY: JointPose = JointPose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for JointPose {
    fn default() -> Self {
        Self::IDENTITY
    }
}
