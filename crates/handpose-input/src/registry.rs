use crate::{HandController, HandEvent};
use handpose_reconstruct::HandSkeletonResult;
use handpose_sensor::Handedness;

/// Live hand sources, one slot per hand.
///
/// Turns reconstruction results into toolkit notifications: detected or lost
/// on tracking transitions, pose-changed for every frame. Untracked frames
/// forward their zeroed joints so consumers never hold a stale pose.
pub struct HandSourceRegistry {
    sources: [Option<HandController>; 2],
}

impl HandSourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: [None, None],
        }
    }

    /// Apply one frame's result and return the events it raises, in order.
    pub fn on_frame(&mut self, result: &HandSkeletonResult) -> Vec<HandEvent> {
        let skeleton = &result.skeleton;
        let handedness = skeleton.handedness;
        let Some(slot) = handedness.slot() else {
            return Vec::new();
        };

        let mut events = Vec::new();
        let registered = self.sources[slot].is_some();

        if skeleton.is_tracked {
            if result.tracking_state_changed || !registered {
                tracing::info!(hand = handedness.as_str(), "Hand source detected");
                events.push(HandEvent::SourceDetected(handedness));
            }
            if let Some(controller) = &mut self.sources[slot] {
                controller.update(skeleton.clone());
            } else {
                self.sources[slot] = Some(HandController::new(skeleton.clone()));
            }
        } else if registered {
            tracing::info!(hand = handedness.as_str(), "Hand source lost");
            self.sources[slot] = None;
            events.push(HandEvent::SourceLost(handedness));
        }

        events.push(HandEvent::PoseChanged {
            handedness,
            timestamp: skeleton.timestamp,
            joints: skeleton.joints.to_vec(),
        });
        events
    }

    pub fn controller(&self, handedness: Handedness) -> Option<&HandController> {
        handedness
            .slot()
            .and_then(|slot| self.sources[slot].as_ref())
    }

    /// Hands currently registered as live sources.
    pub fn active_sources(&self) -> Vec<Handedness> {
        Handedness::HANDS
            .into_iter()
            .filter(|hand| self.controller(*hand).is_some())
            .collect()
    }

    /// Drop all sources, raising `SourceLost` for each.
    pub fn clear(&mut self) -> Vec<HandEvent> {
        let lost = self
            .active_sources()
            .into_iter()
            .map(HandEvent::SourceLost)
            .collect();
        self.sources = [None, None];
        lost
    }
}

impl Default for HandSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handpose_reconstruct::{HandSkeleton, JointPose, JOINT_COUNT};

    fn result(handedness: Handedness, tracked: bool, changed: bool) -> HandSkeletonResult {
        let mut skeleton = HandSkeleton::untracked(handedness, 5);
        skeleton.is_tracked = tracked;
        HandSkeletonResult {
            skeleton,
            tracking_state_changed: changed,
        }
    }

    #[test]
    fn detect_pose_lose_sequence() {
        let mut registry = HandSourceRegistry::new();

        let events = registry.on_frame(&result(Handedness::Left, true, true));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], HandEvent::SourceDetected(Handedness::Left));
        match &events[1] {
            HandEvent::PoseChanged {
                handedness, joints, ..
            } => {
                assert_eq!(*handedness, Handedness::Left);
                assert_eq!(joints.len(), JOINT_COUNT);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(registry.active_sources(), vec![Handedness::Left]);

        let events = registry.on_frame(&result(Handedness::Left, true, false));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], HandEvent::PoseChanged { .. }));

        let events = registry.on_frame(&result(Handedness::Left, false, true));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], HandEvent::SourceLost(Handedness::Left));
        assert!(matches!(events[1], HandEvent::PoseChanged { .. }));
        assert!(registry.active_sources().is_empty());
        assert!(registry.controller(Handedness::Left).is_none());
    }

    #[test]
    fn untracked_frames_forward_zeroed_joints() {
        let mut registry = HandSourceRegistry::new();
        registry.on_frame(&result(Handedness::Left, true, true));
        registry.on_frame(&result(Handedness::Left, false, true));

        // Steady untracked frames keep forwarding, with no further lost events.
        for _ in 0..2 {
            let events = registry.on_frame(&result(Handedness::Left, false, false));
            assert_eq!(events.len(), 1);
            match &events[0] {
                HandEvent::PoseChanged {
                    handedness, joints, ..
                } => {
                    assert_eq!(*handedness, Handedness::Left);
                    assert_eq!(joints.len(), JOINT_COUNT);
                    assert!(joints.iter().all(|j| *j == JointPose::IDENTITY));
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[test]
    fn never_tracked_hand_only_forwards_pose() {
        let mut registry = HandSourceRegistry::new();
        let events = registry.on_frame(&result(Handedness::Right, false, false));
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            HandEvent::PoseChanged {
                handedness: Handedness::Right,
                ..
            }
        ));
        assert!(registry.active_sources().is_empty());
    }

    #[test]
    fn hands_register_independently() {
        let mut registry = HandSourceRegistry::new();
        registry.on_frame(&result(Handedness::Left, true, true));
        registry.on_frame(&result(Handedness::Right, true, true));
        assert_eq!(
            registry.active_sources(),
            vec![Handedness::Left, Handedness::Right]
        );

        registry.on_frame(&result(Handedness::Left, false, true));
        assert_eq!(registry.active_sources(), vec![Handedness::Right]);
        assert!(registry.controller(Handedness::Right).unwrap().is_tracked());
    }

    #[test]
    fn clear_reports_lost_sources() {
        let mut registry = HandSourceRegistry::new();
        registry.on_frame(&result(Handedness::Right, true, true));
        assert_eq!(
            registry.clear(),
            vec![HandEvent::SourceLost(Handedness::Right)]
        );
        assert!(registry.active_sources().is_empty());
    }
}
