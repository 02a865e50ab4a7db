use crate::joints::{JointPose, JOINT_COUNT};
use crate::mapping::{JointMapping, JointSource};
use crate::skeleton::{HandSkeleton, HandSkeletonResult, TrackingState};
use handpose_sensor::{HandSample, Handedness, KeyPointSampler, SensorError, TrackingSettings};
use std::time::Instant;

/// Turns one hand's raw key-point sample into a complete skeleton.
///
/// Rotation is not observable from the sensor, so every joint gets identity
/// rotation except derived joints, which inherit from their first input.
/// The only state kept between calls is the previous skeleton per hand,
/// used to report tracking transitions. There is no temporal smoothing.
pub struct HandPoseReconstructor {
    mapping: JointMapping,
    meshing_enabled: bool,
    epoch: Instant,
    /// Last emitted skeleton, indexed by `Handedness::slot`.
    previous: [Option<HandSkeleton>; 2],
}

impl HandPoseReconstructor {
    pub fn new(mapping: JointMapping, settings: &TrackingSettings) -> Self {
        Self {
            mapping,
            meshing_enabled: settings.hand_meshing_enabled,
            epoch: Instant::now(),
            previous: [None, None],
        }
    }

    pub fn mapping(&self) -> &JointMapping {
        &self.mapping
    }

    /// Sample `handedness` from `sampler` and reconstruct it.
    pub fn poll(
        &mut self,
        sampler: &dyn KeyPointSampler,
        handedness: Handedness,
    ) -> Result<HandSkeletonResult, SensorError> {
        let sample = sampler.sample(handedness)?;
        self.reconstruct(handedness, &sample)
    }

    /// Build this frame's skeleton for `handedness` from `sample`.
    pub fn reconstruct(
        &mut self,
        handedness: Handedness,
        sample: &HandSample,
    ) -> Result<HandSkeletonResult, SensorError> {
        let slot = handedness
            .slot()
            .ok_or(SensorError::InvalidHandedness(handedness))?;
        let timestamp = self.epoch.elapsed().as_nanos() as u64;
        let was_tracked = self.tracking_state(handedness) == TrackingState::Tracked;

        let skeleton = if sample.visible {
            HandSkeleton {
                handedness,
                is_tracked: true,
                timestamp,
                joints: self.resolve_joints(sample),
                mesh: if self.meshing_enabled {
                    sample.mesh.clone()
                } else {
                    None
                },
            }
        } else {
            HandSkeleton::untracked(handedness, timestamp)
        };

        let tracking_state_changed = skeleton.is_tracked != was_tracked;
        if tracking_state_changed {
            tracing::debug!(
                hand = handedness.as_str(),
                tracked = skeleton.is_tracked,
                "Hand tracking state changed"
            );
        }

        self.previous[slot] = Some(skeleton.clone());

        Ok(HandSkeletonResult {
            skeleton,
            tracking_state_changed,
        })
    }

    /// The skeleton emitted by the last call for `handedness`, if any.
    pub fn previous(&self, handedness: Handedness) -> Option<&HandSkeleton> {
        handedness
            .slot()
            .and_then(|slot| self.previous[slot].as_ref())
    }

    /// Current tracking state. Hands never reconstructed are `NotTracked`.
    pub fn tracking_state(&self, handedness: Handedness) -> TrackingState {
        self.previous(handedness)
            .map(HandSkeleton::tracking_state)
            .unwrap_or_default()
    }

    /// Direct and unsupported joints first, then averages over those.
    fn resolve_joints(&self, sample: &HandSample) -> [JointPose; JOINT_COUNT] {
        let mut joints = [JointPose::IDENTITY; JOINT_COUNT];

        for (joint, source) in self.mapping.iter() {
            if let JointSource::Direct { key_point } = source {
                // An invalid key point reads as absent, not as last frame's value.
                joints[joint.index()] = match sample.key_point(key_point) {
                    Some(kp) if kp.valid => JointPose::at(kp.position),
                    _ => JointPose::IDENTITY,
                };
            }
        }

        for (joint, source) in self.mapping.iter() {
            if let JointSource::Average { a, b } = source {
                let a = joints[a.index()];
                let b = joints[b.index()];
                joints[joint.index()] = JointPose {
                    position: a.position.lerp(b.position, 0.5),
                    rotation: a.rotation,
                };
            }
        }

        joints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joints::CanonicalJoint;
    use crate::mapping::MappingOverrides;
    use glam::{Quat, Vec3};
    use handpose_sensor::{HandMesh, KeyPoint, KeyPointId, StaticSampler};

    fn reconstructor() -> HandPoseReconstructor {
        HandPoseReconstructor::new(JointMapping::default(), &TrackingSettings::default())
    }

    fn visible(points: &[(KeyPointId, KeyPoint)]) -> HandSample {
        HandSample {
            visible: true,
            key_points: points.iter().copied().collect(),
            mesh: None,
            device_timestamp_ns: None,
        }
    }

    /// Every key point valid, each at a distinct position.
    fn full_sample(offset: f32) -> HandSample {
        let points: Vec<_> = KeyPointId::ALL
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, KeyPoint::valid(Vec3::new(i as f32 + offset, 1.0, -1.0))))
            .collect();
        visible(&points)
    }

    fn unsupported_joints(mapping: &JointMapping) -> Vec<CanonicalJoint> {
        mapping
            .iter()
            .filter(|(_, source)| *source == JointSource::Unsupported)
            .map(|(joint, _)| joint)
            .collect()
    }

    #[test]
    fn unsupported_joints_are_always_identity() {
        let mut recon = reconstructor();
        let unsupported = unsupported_joints(recon.mapping());
        assert!(!unsupported.is_empty());

        for offset in [0.0, 0.5, -3.0] {
            let result = recon.reconstruct(Handedness::Left, &full_sample(offset)).unwrap();
            assert!(result.skeleton.is_tracked);
            for joint in &unsupported {
                assert!(result.skeleton.joint(*joint).is_identity(), "{joint:?}");
            }
        }
    }

    #[test]
    fn invalid_key_point_is_zeroed_not_stale() {
        let mut recon = reconstructor();
        recon
            .reconstruct(Handedness::Right, &full_sample(0.0))
            .unwrap();

        let mut sample = full_sample(0.0);
        sample.key_points.insert(
            KeyPointId::IndexTip,
            KeyPoint {
                valid: false,
                position: Vec3::ONE,
            },
        );
        let result = recon.reconstruct(Handedness::Right, &sample).unwrap();

        assert!(result.skeleton.joint(CanonicalJoint::IndexTip).is_identity());
        assert!(!result.skeleton.joint(CanonicalJoint::MiddleTip).is_identity());
    }

    #[test]
    fn missing_key_point_is_zeroed() {
        let mut recon = reconstructor();
        let sample = visible(&[(KeyPointId::ThumbTip, KeyPoint::valid(Vec3::Y))]);
        let result = recon.reconstruct(Handedness::Left, &sample).unwrap();

        assert_eq!(result.skeleton.joint(CanonicalJoint::ThumbTip).position, Vec3::Y);
        assert!(result.skeleton.joint(CanonicalJoint::IndexTip).is_identity());
    }

    #[test]
    fn visibility_round_trip() {
        let mut recon = reconstructor();
        let shown = full_sample(0.0);
        let hidden = HandSample::not_visible();

        let steps = [(&shown, true), (&hidden, true), (&shown, true), (&shown, false)];
        for (sample, expect_changed) in steps {
            let result = recon.reconstruct(Handedness::Left, sample).unwrap();
            assert_eq!(result.skeleton.is_tracked, sample.visible);
            assert_eq!(result.tracking_state_changed, expect_changed);
        }
    }

    #[test]
    fn untracked_skeleton_is_zeroed() {
        let mut recon = reconstructor();
        recon
            .reconstruct(Handedness::Left, &full_sample(2.0))
            .unwrap();

        // Key points present but the hand is not visible.
        let mut sample = full_sample(2.0);
        sample.visible = false;
        let result = recon.reconstruct(Handedness::Left, &sample).unwrap();

        assert!(!result.skeleton.is_tracked);
        assert!(result.tracking_state_changed);
        assert!(result.skeleton.joints.iter().all(JointPose::is_identity));
        assert_eq!(recon.tracking_state(Handedness::Left), TrackingState::NotTracked);
    }

    #[test]
    fn palm_is_midpoint_of_wrist_and_middle_knuckle() {
        let mut recon = reconstructor();
        let sample = visible(&[
            (KeyPointId::WristCenter, KeyPoint::valid(Vec3::ZERO)),
            (KeyPointId::MiddleMcp, KeyPoint::valid(Vec3::new(0.0, 0.1, 0.0))),
        ]);
        let result = recon.reconstruct(Handedness::Right, &sample).unwrap();

        let palm = result.skeleton.joint(CanonicalJoint::Palm);
        assert_eq!(palm.position, Vec3::new(0.0, 0.05, 0.0));
        assert_eq!(palm.rotation, Quat::IDENTITY);
    }

    #[test]
    fn hand_lost_after_tracking() {
        let mut recon = reconstructor();
        recon
            .reconstruct(Handedness::Left, &full_sample(0.0))
            .unwrap();

        let result = recon
            .reconstruct(Handedness::Left, &HandSample::not_visible())
            .unwrap();
        assert!(!result.skeleton.is_tracked);
        assert!(result.tracking_state_changed);
        assert_eq!(result.skeleton.joints.len(), JOINT_COUNT);
        assert!(result.skeleton.joints.iter().all(JointPose::is_identity));
    }

    #[test]
    fn wrist_only_sample() {
        let mut recon = reconstructor();
        let mut points = vec![(KeyPointId::WristCenter, KeyPoint::valid(Vec3::new(1.0, 2.0, 3.0)))];
        points.extend(
            KeyPointId::ALL
                .iter()
                .filter(|id| **id != KeyPointId::WristCenter)
                .map(|id| (*id, KeyPoint::invalid())),
        );
        let result = recon
            .reconstruct(Handedness::Right, &visible(&points))
            .unwrap();
        let skeleton = &result.skeleton;

        assert!(skeleton.is_tracked);
        assert!(result.tracking_state_changed);
        assert_eq!(skeleton.joint(CanonicalJoint::Wrist).position, Vec3::new(1.0, 2.0, 3.0));
        for (joint, source) in recon.mapping().iter() {
            if joint != CanonicalJoint::Wrist && matches!(source, JointSource::Direct { .. }) {
                assert!(skeleton.joint(joint).is_identity(), "{joint:?}");
            }
        }
        assert_eq!(
            skeleton.joint(CanonicalJoint::Palm).position,
            Vec3::new(0.5, 1.0, 1.5)
        );
    }

    #[test]
    fn consecutive_frames_do_not_blend() {
        let mut recon = reconstructor();
        let first = visible(&[(KeyPointId::IndexTip, KeyPoint::valid(Vec3::new(0.1, 0.0, 0.0)))]);
        let second = visible(&[(KeyPointId::IndexTip, KeyPoint::valid(Vec3::new(0.3, 0.0, 0.0)))]);

        let a = recon.reconstruct(Handedness::Left, &first).unwrap();
        let b = recon.reconstruct(Handedness::Left, &second).unwrap();

        assert!(a.tracking_state_changed);
        assert!(!b.tracking_state_changed);
        assert_eq!(
            b.skeleton.joint(CanonicalJoint::IndexTip).position,
            Vec3::new(0.3, 0.0, 0.0)
        );
        assert!(b.skeleton.timestamp >= a.skeleton.timestamp);
    }

    #[test]
    fn hands_are_tracked_independently() {
        let mut recon = reconstructor();
        recon
            .reconstruct(Handedness::Left, &full_sample(0.0))
            .unwrap();

        assert_eq!(recon.tracking_state(Handedness::Left), TrackingState::Tracked);
        assert_eq!(recon.tracking_state(Handedness::Right), TrackingState::NotTracked);
        assert!(recon.previous(Handedness::Right).is_none());

        let right = recon
            .reconstruct(Handedness::Right, &HandSample::not_visible())
            .unwrap();
        assert!(!right.tracking_state_changed);
    }

    #[test]
    fn rejects_invalid_handedness() {
        let mut recon = reconstructor();
        for hand in [Handedness::Both, Handedness::Unknown] {
            assert_eq!(
                recon.reconstruct(hand, &full_sample(0.0)),
                Err(SensorError::InvalidHandedness(hand))
            );
        }
        assert!(recon.previous(Handedness::Left).is_none());
    }

    #[test]
    fn poll_propagates_sampler_error() {
        let mut recon = reconstructor();
        let sampler = StaticSampler::new();
        assert_eq!(
            recon.poll(&sampler, Handedness::Unknown),
            Err(SensorError::InvalidHandedness(Handedness::Unknown))
        );

        let result = recon.poll(&sampler, Handedness::Left).unwrap();
        assert!(!result.skeleton.is_tracked);
        assert!(!result.tracking_state_changed);
    }

    #[test]
    fn mesh_passes_through_only_when_enabled() {
        let mesh = HandMesh {
            vertices: vec![Vec3::X, Vec3::Y, Vec3::Z],
            indices: vec![0, 1, 2],
        };
        let mut sample = full_sample(0.0);
        sample.mesh = Some(mesh.clone());

        let mut off = reconstructor();
        assert!(off
            .reconstruct(Handedness::Left, &sample)
            .unwrap()
            .skeleton
            .mesh
            .is_none());

        let settings = TrackingSettings {
            hand_meshing_enabled: true,
            ..TrackingSettings::default()
        };
        let mut on = HandPoseReconstructor::new(JointMapping::default(), &settings);
        let result = on.reconstruct(Handedness::Left, &sample).unwrap();
        assert_eq!(result.skeleton.mesh, Some(mesh));

        sample.visible = false;
        let result = on.reconstruct(Handedness::Left, &sample).unwrap();
        assert!(result.skeleton.mesh.is_none());
    }

    #[test]
    fn overridden_mapping_is_used() {
        let mut overrides = MappingOverrides::new();
        overrides.insert(
            CanonicalJoint::RingDistal,
            JointSource::Direct {
                key_point: KeyPointId::RingDip,
            },
        );
        let mapping = JointMapping::with_overrides(&overrides).unwrap();
        let mut recon = HandPoseReconstructor::new(mapping, &TrackingSettings::default());

        let sample = visible(&[(KeyPointId::RingDip, KeyPoint::valid(Vec3::splat(0.2)))]);
        let result = recon.reconstruct(Handedness::Right, &sample).unwrap();
        assert_eq!(
            result.skeleton.joint(CanonicalJoint::RingDistal).position,
            Vec3::splat(0.2)
        );
    }
}
