pub mod controller;
pub mod registry;

use handpose_reconstruct::JointPose;
use handpose_sensor::Handedness;

pub use controller::HandController;
pub use registry::HandSourceRegistry;

/// Notification raised toward the toolkit for a hand source.
#[derive(Debug, Clone, PartialEq)]
pub enum HandEvent {
    /// Hand became tracked.
    SourceDetected(Handedness),
    /// Hand stopped being tracked.
    SourceLost(Handedness),
    /// New joint poses for a tracked hand.
    PoseChanged {
        handedness: Handedness,
        timestamp: u64,
        joints: Vec<JointPose>,
    },
}
