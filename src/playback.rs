//! Playback streamer
//!
//! Drives one frame sequence into a freshly joined transport:
//!
//! 1. join the destination (failure aborts before anything is sent)
//! 2. wait the settle delay
//! 3. mark the session active
//! 4. send every frame in order, each send waiting for the transport
//! 5. mark the session inactive
//! 6. wait the settle delay again
//! 7. release the transport
//!
//! Steps 5 to 7 run even when an earlier step failed. The frame sequence is
//! consumed by the call, so nothing survives into the next playback.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::transport::{Connector, Transport};
use crate::types::{FrameSequence, PlaybackTarget};
use crate::{PlaybackError, TransportError};

/// Default pause before and after emitting audio.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(250);

/// Playback protocol tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Pause after joining and again before leaving. Covers connection warm-up
    /// on the remote side and lets trailing audio flush.
    pub settle_delay: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { settle_delay: DEFAULT_SETTLE_DELAY }
    }
}

/// Outcome of a completed playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub frames_sent: usize,
    pub elapsed: Duration,
}

/// Streams frame sequences to transports.
#[derive(Debug, Clone, Default)]
pub struct PlaybackStreamer {
    config: PlaybackConfig,
}

impl PlaybackStreamer {
    pub fn new(config: PlaybackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Join `target` through `connector` and play `frames` into it.
    pub async fn play<C: Connector>(
        &self,
        connector: &C,
        target: &PlaybackTarget,
        frames: FrameSequence,
    ) -> Result<PlaybackSummary, PlaybackError> {
        let started = Instant::now();
        let total_frames = frames.len();

        let mut transport = connector.join(target).await.map_err(|source| {
            PlaybackError::Connect { destination: target.to_string(), source }
        })?;
        info!("Joined {} ({} frames queued)", target, total_frames);

        let outcome = self.stream(&mut transport, frames).await;

        if let Err(e) = transport.release().await {
            warn!("Failed to release transport for {}: {}", target, e);
        }
        debug!("Released {}", target);

        match outcome {
            Ok(frames_sent) => {
                let summary = PlaybackSummary { frames_sent, elapsed: started.elapsed() };
                info!("Played {} frames to {} in {:?}", frames_sent, target, summary.elapsed);
                Ok(summary)
            }
            Err((frames_sent, source)) => {
                warn!(
                    "Playback to {} stopped after {} of {} frames: {}",
                    target, frames_sent, total_frames, source
                );
                Err(PlaybackError::Transport { frames_sent, total_frames, source })
            }
        }
    }

    /// Steps 2 through 6. Returns the number of frames the transport accepted.
    async fn stream<T: Transport>(
        &self,
        transport: &mut T,
        frames: FrameSequence,
    ) -> Result<usize, (usize, TransportError)> {
        tokio::time::sleep(self.config.settle_delay).await;

        let mut sent = 0usize;
        let mut failure = transport.set_active(true).await.err();

        if failure.is_none() {
            for frame in frames {
                if let Err(e) = transport.send(frame).await {
                    failure = Some(e);
                    break;
                }
                sent += 1;
            }
        }

        if let Err(e) = transport.set_active(false).await {
            if failure.is_none() {
                failure = Some(e);
            } else {
                debug!("Clearing active state also failed: {}", e);
            }
        }

        tokio::time::sleep(self.config.settle_delay).await;

        match failure {
            None => Ok(sent),
            Some(e) => Err((sent, e)),
        }
    }
}
