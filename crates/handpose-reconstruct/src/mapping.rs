//! Where each canonical joint comes from.
//!
//! The table is data: one `JointSource` per canonical joint, consulted by a
//! single loop in the reconstructor. Which joints the sensor really supports
//! varies by device generation, so the default table can be overridden from
//! configuration.

use crate::joints::{CanonicalJoint, JOINT_COUNT};
use handpose_sensor::KeyPointId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// How a canonical joint is produced from a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JointSource {
    /// Copy the position of one sensor key point.
    Direct { key_point: KeyPointId },
    /// Midpoint of two other joints; rotation taken from `a`.
    Average { a: CanonicalJoint, b: CanonicalJoint },
    /// Not observable; always the identity pose.
    Unsupported,
}

impl JointSource {
    const fn direct(key_point: KeyPointId) -> Self {
        Self::Direct { key_point }
    }
}

/// Per-joint replacements applied on top of the default table.
pub type MappingOverrides = BTreeMap<CanonicalJoint, JointSource>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MappingError {
    #[error("{joint:?} averages {source_joint:?}, which is itself derived")]
    ChainedAverage {
        joint: CanonicalJoint,
        source_joint: CanonicalJoint,
    },
    #[error("{0:?} averages itself")]
    SelfAverage(CanonicalJoint),
}

/// Default table, indexed by `CanonicalJoint::index`.
///
/// Metacarpals of the four fingers are never reported. Ring and pinky only
/// report knuckle and tip, and no finger reports a usable distal joint.
const DEFAULT_SOURCES: [JointSource; JOINT_COUNT] = {
    use crate::mapping::JointSource::Unsupported;
    use handpose_sensor::KeyPointId as K;
    [
        JointSource::direct(K::WristCenter),
        JointSource::Average {
            a: CanonicalJoint::Wrist,
            b: CanonicalJoint::MiddleKnuckle,
        },
        JointSource::direct(K::ThumbCmc),
        JointSource::direct(K::ThumbMcp),
        JointSource::direct(K::ThumbIp),
        JointSource::direct(K::ThumbTip),
        Unsupported,
        JointSource::direct(K::IndexMcp),
        JointSource::direct(K::IndexPip),
        Unsupported,
        JointSource::direct(K::IndexTip),
        Unsupported,
        JointSource::direct(K::MiddleMcp),
        JointSource::direct(K::MiddlePip),
        Unsupported,
        JointSource::direct(K::MiddleTip),
        Unsupported,
        JointSource::direct(K::RingMcp),
        Unsupported,
        Unsupported,
        JointSource::direct(K::RingTip),
        Unsupported,
        JointSource::direct(K::PinkyMcp),
        Unsupported,
        Unsupported,
        JointSource::direct(K::PinkyTip),
    ]
};

/// Validated CanonicalJoint -> JointSource table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointMapping {
    sources: [JointSource; JOINT_COUNT],
}

impl Default for JointMapping {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES,
        }
    }
}

impl JointMapping {
    /// Default table with `overrides` applied, then validated.
    pub fn with_overrides(overrides: &MappingOverrides) -> Result<Self, MappingError> {
        let mut sources = DEFAULT_SOURCES;
        for (joint, source) in overrides {
            sources[joint.index()] = *source;
        }
        let mapping = Self { sources };
        mapping.validate()?;
        Ok(mapping)
    }

    pub fn source(&self, joint: CanonicalJoint) -> JointSource {
        self.sources[joint.index()]
    }

    /// (joint, source) pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalJoint, JointSource)> + '_ {
        CanonicalJoint::ALL
            .into_iter()
            .map(move |joint| (joint, self.sources[joint.index()]))
    }

    /// Averages may only read joints resolved in the first pass.
    fn validate(&self) -> Result<(), MappingError> {
        for (joint, source) in self.iter() {
            if let JointSource::Average { a, b } = source {
                for input in [a, b] {
                    if input == joint {
                        return Err(MappingError::SelfAverage(joint));
                    }
                    if matches!(self.source(input), JointSource::Average { .. }) {
                        return Err(MappingError::ChainedAverage {
                            joint,
                            source_joint: input,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
