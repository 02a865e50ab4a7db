use glam::Vec3;
use handpose_reconstruct::{CanonicalJoint, HandSkeleton, JointPose};
use handpose_sensor::Handedness;

/// Read-only view of one tracked hand for interaction code.
///
/// Joints the sensor cannot see sit at the identity pose every frame; the
/// `tracked_*` accessors filter those out.
#[derive(Debug, Clone)]
pub struct HandController {
    skeleton: HandSkeleton,
}

impl HandController {
    pub fn new(skeleton: HandSkeleton) -> Self {
        Self { skeleton }
    }

    pub fn handedness(&self) -> Handedness {
        self.skeleton.handedness
    }

    pub fn is_tracked(&self) -> bool {
        self.skeleton.is_tracked
    }

    pub fn skeleton(&self) -> &HandSkeleton {
        &self.skeleton
    }

    /// Replace the held skeleton with this frame's.
    pub fn update(&mut self, skeleton: HandSkeleton) {
        self.skeleton = skeleton;
    }

    pub fn joint(&self, joint: CanonicalJoint) -> JointPose {
        *self.skeleton.joint(joint)
    }

    /// The joint pose, or `None` if the hand is untracked or the joint sits
    /// at identity.
    pub fn tracked_joint(&self, joint: CanonicalJoint) -> Option<JointPose> {
        let pose = self.joint(joint);
        (self.skeleton.is_tracked && !pose.is_identity()).then_some(pose)
    }

    /// Euclidean distance between two tracked joints (meters).
    pub fn joint_distance(&self, a: CanonicalJoint, b: CanonicalJoint) -> Option<f32> {
        let a = self.tracked_joint(a)?;
        let b = self.tracked_joint(b)?;
        Some(a.position.distance(b.position))
    }

    pub fn palm(&self) -> Option<JointPose> {
        self.tracked_joint(CanonicalJoint::Palm)
    }

    /// Positions of the fingertips the sensor is currently reporting.
    pub fn fingertips(&self) -> Vec<(CanonicalJoint, Vec3)> {
        CanonicalJoint::fingertips()
            .into_iter()
            .filter_map(|tip| self.tracked_joint(tip).map(|pose| (tip, pose.position)))
            .collect()
    }
}
