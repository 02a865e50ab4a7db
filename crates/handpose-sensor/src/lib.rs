pub mod protocol;
pub mod synthetic;
pub mod types;

use anyhow::Result;
use protocol::{FrameParser, HandFrame};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;

pub use synthetic::{StaticSampler, SyntheticSensor};
pub use types::*;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("Invalid handedness {0:?}: only Left or Right can be sampled")]
    InvalidHandedness(Handedness),
}

/// Source of one frame's raw key points for a hand.
///
/// Implementations are pure reads of current sensor state: no caching, no
/// smoothing. A sensor that is not started reports the hand as not visible
/// with no key points rather than failing.
pub trait KeyPointSampler: Send {
    fn sample(&self, handedness: Handedness) -> Result<HandSample, SensorError>;
}

/// Latest decoded frame per hand, indexed by `Handedness::slot`.
#[derive(Debug, Clone, Default)]
struct LatestFrames {
    hands: [Option<HandFrame>; 2],
}

/// Client for a hand-tracking device bridge.
///
/// Connects over TCP, forwards the tracking settings once, parses the
/// key-point frame stream in a background task and publishes the latest
/// frame per hand. Sampling never blocks.
pub struct SensorClient {
    frames_rx: watch::Receiver<LatestFrames>,
    _task: tokio::task::JoinHandle<()>,
}

impl SensorClient {
    /// Connect to the bridge at `addr` and start streaming.
    pub async fn connect(addr: &str, settings: TrackingSettings) -> Result<Self> {
        tracing::info!(%addr, ?settings, "Connecting to hand-tracking bridge");

        let mut stream = TcpStream::connect(addr).await?;
        stream
            .write_all(&protocol::encode_start_request(&settings))
            .await?;
        tracing::info!("Connected to hand-tracking bridge");

        let (frames_tx, frames_rx) = watch::channel(LatestFrames::default());
        let task = tokio::spawn(frame_read_loop(stream, frames_tx));

        Ok(Self {
            frames_rx,
            _task: task,
        })
    }

    /// A client that never receives frames. Both hands read as not visible.
    pub fn disconnected() -> Self {
        let (frames_tx, frames_rx) = watch::channel(LatestFrames::default());
        let task = tokio::spawn(async move {
            // Keep the sender alive.
            let _tx = frames_tx;
            std::future::pending::<()>().await;
        });
        Self {
            frames_rx,
            _task: task,
        }
    }
}

impl KeyPointSampler for SensorClient {
    fn sample(&self, handedness: Handedness) -> Result<HandSample, SensorError> {
        let slot = handedness
            .slot()
            .ok_or(SensorError::InvalidHandedness(handedness))?;
        let frames = self.frames_rx.borrow();
        Ok(frames.hands[slot]
            .as_ref()
            .map(|frame| frame.sample.clone())
            .unwrap_or_default())
    }
}

/// Background task: read TCP stream, parse frames, publish the latest per hand.
async fn frame_read_loop(mut stream: TcpStream, frames_tx: watch::Sender<LatestFrames>) {
    let mut parser = FrameParser::new();
    let mut buf = [0u8; 4096];
    let mut frame_count: u64 = 0;

    loop {
        match stream.read(&mut buf).await {
            Ok(0) => {
                tracing::warn!("Hand-tracking bridge closed the connection");
                break;
            }
            Ok(n) => {
                parser.push_data(&buf[..n]);

                while let Some(result) = parser.next_frame() {
                    match result {
                        Ok(frame) => {
                            // Parsed frames are always Left or Right.
                            if let Some(slot) = frame.handedness.slot() {
                                frames_tx.send_modify(|latest| latest.hands[slot] = Some(frame));
                            }
                            frame_count += 1;
                            if frame_count % 1000 == 0 {
                                tracing::debug!(frame_count, "Hand frames processed");
                            }
                        }
                        Err(e) => {
                            tracing::warn!(?e, "Dropping malformed hand frame");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!(?e, "Hand-tracking bridge read error");
                break;
            }
        }
    }

    // A dead stream reads the same as a sensor that was never started.
    frames_tx.send_replace(LatestFrames::default());
}
