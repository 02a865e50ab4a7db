use crate::joints::{CanonicalJoint, JointPose, JOINT_COUNT};
use handpose_sensor::{HandMesh, Handedness};

/// Per-hand tracking state kept between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    #[default]
    NotTracked,
    Tracked,
}

/// Complete skeleton for one hand for one frame.
///
/// An untracked skeleton always carries identity poses, never stale positions.
#[derive(Debug, Clone, PartialEq)]
pub struct HandSkeleton {
    pub handedness: Handedness,
    pub is_tracked: bool,
    /// Monotonic nanoseconds since the reconstructor was created.
    pub timestamp: u64,
    pub joints: [JointPose; JOINT_COUNT],
    /// Populated only when meshing is enabled and the hand is tracked.
    pub mesh: Option<HandMesh>,
}

impl HandSkeleton {
    /// An untracked skeleton with every joint at identity.
    pub fn untracked(handedness: Handedness, timestamp: u64) -> Self {
        Self {
            handedness,
            is_tracked: false,
            timestamp,
            joints: [JointPose::IDENTITY; JOINT_COUNT],
            mesh: None,
        }
    }

    pub fn joint(&self, joint: CanonicalJoint) -> &JointPose {
        &self.joints[joint.index()]
    }

    pub fn tracking_state(&self) -> TrackingState {
        if self.is_tracked {
            TrackingState::Tracked
        } else {
            TrackingState::NotTracked
        }
    }
}

/// Output of one reconstruction call.
#[derive(Debug, Clone, PartialEq)]
pub struct HandSkeletonResult {
    pub skeleton: HandSkeleton,
    /// True when `skeleton.is_tracked` differs from the previous call's.
    pub tracking_state_changed: bool,
}
