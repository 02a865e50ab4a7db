use glam::Vec3;
use handpose_reconstruct::{JointMapping, MappingError, MappingOverrides};
use handpose_sensor::TrackingSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Device bridge connection.
    pub sensor: SensorConfig,
    /// Forwarded verbatim to the sensor at start-up.
    pub tracking: TrackingSettings,
    /// Animated hands used when no bridge is reachable.
    pub synthetic: SyntheticConfig,
    /// Per-joint replacements for the default joint mapping table.
    pub mapping: MappingOverrides,
}

impl AppConfig {
    /// The joint mapping table with this config's overrides applied.
    pub fn joint_mapping(&self) -> Result<JointMapping, MappingError> {
        JointMapping::with_overrides(&self.mapping)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// `host:port` of the hand-tracking bridge.
    pub bridge_addr: String,
    /// Reconstruction ticks per second.
    pub frame_rate_hz: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            bridge_addr: "127.0.0.1:52990".to_string(),
            frame_rate_hz: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Use synthetic hands when the bridge is unreachable. When off, both
    /// hands read as not visible instead.
    pub enabled: bool,
    /// Left wrist position (meters).
    #[serde(with = "vec3_serde")]
    pub left_origin: Vec3,
    /// Right wrist position (meters).
    #[serde(with = "vec3_serde")]
    pub right_origin: Vec3,
    /// Seconds per open/close cycle.
    pub cycle_secs: f32,
    /// Fraction of each cycle the hands are hidden (0.0-1.0).
    pub hidden_fraction: f32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            left_origin: Vec3::new(-0.15, -0.2, -0.4),
            right_origin: Vec3::new(0.15, -0.2, -0.4),
            cycle_secs: 4.0,
            hidden_fraction: 0.2,
        }
    }
}

// glam's own serde output is not the plain array we want in TOML.

mod vec3_serde {
    use glam::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Vec3, s: S) -> Result<S::Ok, S::Error> {
        [v.x, v.y, v.z].serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec3, D::Error> {
        let [x, y, z] = <[f32; 3]>::deserialize(d)?;
        Ok(Vec3::new(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handpose_reconstruct::{CanonicalJoint, JointSource};
    use handpose_sensor::{KeyPointFilterLevel, KeyPointId, PoseFilterLevel};

    #[test]
    fn default_survives_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let text = r#"
            [tracking]
            key_point_filter_level = "extra_smoothed"
            hand_meshing_enabled = true

            [synthetic]
            left_origin = [0.0, 1.0, 2.0]

            [mapping]
            index_distal = { kind = "direct", key_point = "index_dip" }
        "#;
        let config: AppConfig = toml::from_str(text).unwrap();

        assert_eq!(
            config.tracking.key_point_filter_level,
            KeyPointFilterLevel::ExtraSmoothed
        );
        assert_eq!(config.tracking.pose_filter_level, PoseFilterLevel::Robust);
        assert!(config.tracking.hand_meshing_enabled);
        assert_eq!(config.synthetic.left_origin, Vec3::new(0.0, 1.0, 2.0));
        assert!(config.synthetic.enabled);
        assert_eq!(config.synthetic.right_origin, SyntheticConfig::default().right_origin);
        assert_eq!(config.sensor, SensorConfig::default());

        let mapping = config.joint_mapping().unwrap();
        assert_eq!(
            mapping.source(CanonicalJoint::IndexDistal),
            JointSource::Direct {
                key_point: KeyPointId::IndexDip
            }
        );
    }

    #[test]
    fn synthetic_fallback_can_be_disabled() {
        let text = r#"
            [synthetic]
            enabled = false
        "#;
        let config: AppConfig = toml::from_str(text).unwrap();
        assert!(!config.synthetic.enabled);
        assert_eq!(config.synthetic.cycle_secs, SyntheticConfig::default().cycle_secs);
    }

    #[test]
    fn invalid_mapping_is_reported() {
        let text = r#"
            [mapping]
            wrist = { kind = "average", a = "palm", b = "index_tip" }
        "#;
        let config: AppConfig = toml::from_str(text).unwrap();
        assert!(config.joint_mapping().is_err());
    }
}
