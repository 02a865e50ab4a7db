//! Hand skeleton reconstruction from sparse key-point samples.
//!
//! The sensor reports positions for a subset of anatomical key points and no
//! rotations. This crate maps them onto the full canonical joint set through
//! a data table, derives the palm, and tracks per-hand visibility transitions.

pub mod joints;
pub mod mapping;
pub mod reconstructor;
pub mod skeleton;

pub use joints::{CanonicalJoint, JointPose, JOINT_COUNT};
pub use mapping::{JointMapping, JointSource, MappingError, MappingOverrides};
pub use reconstructor::HandPoseReconstructor;
pub use skeleton::{HandSkeleton, HandSkeletonResult, TrackingState};
