use crate::types::{
    HandSample, Handedness, KeyPoint, KeyPointFilterLevel, KeyPointId, PoseFilterLevel,
    TrackingSettings,
};
use glam::Vec3;
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

/// Marker opening every key-point frame from the device bridge.
pub const FRAME_MAGIC: [u8; 4] = *b"HKPF";
/// Marker opening the start request we send to the bridge.
pub const START_MAGIC: [u8; 4] = *b"HKPC";
pub const PROTOCOL_VERSION: u8 = 1;

/// magic (4) + version + hand + flags + count + timestamp (8).
const FRAME_HEADER_LEN: usize = 16;
/// id + valid + 3 x f32.
const KEY_POINT_LEN: usize = 14;
const FLAG_VISIBLE: u8 = 0x01;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("No wire code for handedness {0:?}")]
    UnencodableHand(Handedness),
    #[error("Unsupported frame version {0}")]
    UnsupportedVersion(u8),
    #[error("Unknown hand code {0}")]
    UnknownHand(u8),
    #[error("Unknown key point code {0}")]
    UnknownKeyPoint(u8),
}

/// One decoded key-point frame for a single hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    pub handedness: Handedness,
    /// Carries the device timestamp in `device_timestamp_ns`.
    pub sample: HandSample,
}

/// Streaming parser for the key-point frame protocol.
///
/// Feed raw TCP bytes via `push_data`, then drain parsed frames via `next_frame`.
pub struct FrameParser {
    buffer: VecDeque<u8>,
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(4096),
        }
    }

    /// Append received bytes to the internal buffer.
    pub fn push_data(&mut self, data: &[u8]) {
        self.buffer.extend(data);
    }

    /// Try to extract the next complete frame from the buffer.
    /// Returns `None` if no complete frame is available yet.
    pub fn next_frame(&mut self) -> Option<Result<HandFrame, ProtocolError>> {
        let message = {
            let buf = self.buffer.make_contiguous();

            let Some(start) = find_pattern(buf, &FRAME_MAGIC) else {
                // Keep a possible partial marker at the tail.
                let keep = buf.len().min(FRAME_MAGIC.len() - 1);
                let drop = buf.len() - keep;
                self.buffer.drain(..drop);
                return None;
            };

            let buf = &buf[start..];
            if buf.len() < FRAME_HEADER_LEN {
                self.buffer.drain(..start);
                return None;
            }

            let count = buf[7] as usize;
            let len = FRAME_HEADER_LEN + count * KEY_POINT_LEN;
            if buf.len() < len {
                self.buffer.drain(..start);
                return None;
            }

            let message = buf[..len].to_vec();
            self.buffer.drain(..start + len);
            message
        };

        Some(parse_frame(&message))
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a complete frame (marker through last key point).
fn parse_frame(message: &[u8]) -> Result<HandFrame, ProtocolError> {
    let version = message[4];
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion(version));
    }

    let handedness = match message[5] {
        0 => Handedness::Left,
        1 => Handedness::Right,
        other => return Err(ProtocolError::UnknownHand(other)),
    };
    let visible = message[6] & FLAG_VISIBLE != 0;
    let count = message[7] as usize;
    let timestamp_ns = u64::from_le_bytes(read_array(message, 8));

    let mut key_points = HashMap::with_capacity(count);
    for i in 0..count {
        let at = FRAME_HEADER_LEN + i * KEY_POINT_LEN;
        let id = KeyPointId::from_code(message[at])
            .ok_or(ProtocolError::UnknownKeyPoint(message[at]))?;
        let valid = message[at + 1] != 0;

        let f = |offset: usize| f32::from_le_bytes(read_array(message, at + offset));
        let position = Vec3::new(f(2), f(6), f(10));

        key_points.insert(id, KeyPoint { valid, position });
    }

    Ok(HandFrame {
        handedness,
        sample: HandSample {
            visible,
            key_points,
            mesh: None,
            device_timestamp_ns: Some(timestamp_ns),
        },
    })
}

/// Encode a frame in the wire format. Used by bridges and tests.
///
/// Key points are written in code order so encoding is deterministic.
/// A missing device timestamp is written as 0.
pub fn encode_frame(frame: &HandFrame) -> Result<Vec<u8>, ProtocolError> {
    let hand = match frame.handedness {
        Handedness::Left => 0,
        Handedness::Right => 1,
        other => return Err(ProtocolError::UnencodableHand(other)),
    };
    let mut ids: Vec<_> = frame.sample.key_points.keys().copied().collect();
    ids.sort();

    let mut out = Vec::with_capacity(FRAME_HEADER_LEN + ids.len() * KEY_POINT_LEN);
    out.extend_from_slice(&FRAME_MAGIC);
    out.push(PROTOCOL_VERSION);
    out.push(hand);
    out.push(if frame.sample.visible { FLAG_VISIBLE } else { 0 });
    out.push(ids.len() as u8);
    let timestamp_ns = frame.sample.device_timestamp_ns.unwrap_or(0);
    out.extend_from_slice(&timestamp_ns.to_le_bytes());

    for id in ids {
        let kp = &frame.sample.key_points[&id];
        out.push(id.code());
        out.push(kp.valid as u8);
        for v in kp.position.to_array() {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
    Ok(out)
}

/// Encode the start request that forwards tracking settings to the bridge.
pub fn encode_start_request(settings: &TrackingSettings) -> [u8; 7] {
    let key_point_filter = match settings.key_point_filter_level {
        KeyPointFilterLevel::None => 0,
        KeyPointFilterLevel::Smoothed => 1,
        KeyPointFilterLevel::ExtraSmoothed => 2,
    };
    let pose_filter = match settings.pose_filter_level {
        PoseFilterLevel::None => 0,
        PoseFilterLevel::Robust => 1,
        PoseFilterLevel::ExtraRobust => 2,
    };
    let [a, b, c, d] = START_MAGIC;
    [
        a,
        b,
        c,
        d,
        key_point_filter,
        pose_filter,
        settings.hand_meshing_enabled as u8,
    ]
}

fn read_array<const N: usize>(data: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&data[offset..offset + N]);
    out
}

/// Find the first occurrence of `pattern` in `data`.
fn find_pattern(data: &[u8], pattern: &[u8]) -> Option<usize> {
    data.windows(pattern.len())
        .position(|window| window == pattern)
}
