//! DCA soundboard core: container decoding and paced voice playback.
//!
//! A soundboard turns a trigger ("play `airhorn` in this voice channel") into
//! audio on a voice connection. This crate covers the two steps in between:
//!
//! - **Decoding**: DCA containers are runs of length-prefixed, pre-encoded
//!   audio frames. [`dca::FrameDecoder`] reads one into a [`FrameSequence`],
//!   rejecting truncated input instead of playing half a sound.
//! - **Playback**: [`PlaybackStreamer`] joins a destination, pushes every
//!   frame to the [`Transport`] in order, letting the transport's
//!   backpressure set the pace, and always releases the connection.
//!
//! Sounds are played one at a time. [`Soundboard::spawn`] starts a worker
//! that queues concurrent triggers and runs them back to back.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use soundboard::{PlaybackTarget, Soundboard, SoundboardConfig};
//!
//! #[tokio::main]
//! async fn main() -> soundboard::Result<()> {
//!     let config = SoundboardConfig::load("soundboard.yaml")?;
//!     let (connector, mut listener) = config.loopback_connector();
//!
//!     tokio::spawn(async move {
//!         while let Some(mut sink) = listener.accept().await {
//!             while let Some(frame) = sink.recv().await {
//!                 // hand the encoded frame to the voice client
//!                 let _ = frame;
//!             }
//!         }
//!     });
//!
//!     let worker = Soundboard::with_directory(&config, connector).spawn(config.queue_depth);
//!     let router = config.router();
//!
//!     let command = router.route("!airhorn");
//!     if let Some(identifier) = command.as_ref().and_then(|c| c.sound()) {
//!         worker.submit(identifier, PlaybackTarget::new("guild", "voice")).await?;
//!     }
//!
//!     worker.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod dca;
pub mod driver;
mod error;
pub mod playback;
pub mod source;
pub mod sources;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod transport;
pub mod transports;
pub mod types;

pub use command::{Command, CommandRouter};
pub use config::SoundboardConfig;
pub use driver::{Driver, PendingPlayback, Requester, WorkerHandle};
pub use error::*;
pub use playback::{PlaybackConfig, PlaybackStreamer, PlaybackSummary};
pub use source::{ContainerStream, SoundSource};
pub use transport::{Connector, Transport};
pub use types::{Frame, FrameSequence, PlaybackTarget};

use tracing::info;

use crate::dca::FrameDecoder;
use crate::sources::DirectorySource;

/// Decoder and streamer wired to a sound source and a voice connector.
///
/// # Examples
///
/// ```rust
/// use soundboard::sources::MemorySource;
/// use soundboard::transports::ChannelConnector;
/// use soundboard::{PlaybackConfig, Soundboard};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> soundboard::Result<()> {
/// let source = MemorySource::new().with_sound("ding", vec![0x01, 0x00, 0x7F]);
/// let (connector, _listener) = ChannelConnector::new(2);
/// let board = Soundboard::new(source, connector, PlaybackConfig::default());
///
/// let frames = board.load("ding").await?;
/// assert_eq!(frames.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Soundboard<S, C> {
    source: S,
    connector: C,
    streamer: PlaybackStreamer,
}

impl<C: Connector> Soundboard<DirectorySource, C> {
    /// Soundboard reading containers from the configured sounds directory.
    pub fn with_directory(config: &SoundboardConfig, connector: C) -> Self {
        Self::new(config.directory_source(), connector, config.playback_config())
    }
}

impl<S, C> Soundboard<S, C>
where
    S: SoundSource,
    C: Connector,
{
    pub fn new(source: S, connector: C, config: PlaybackConfig) -> Self {
        Self { source, connector, streamer: PlaybackStreamer::new(config) }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn streamer(&self) -> &PlaybackStreamer {
        &self.streamer
    }

    /// Resolve `identifier` and decode its container.
    ///
    /// The container stream is dropped before this returns, whatever the
    /// outcome.
    pub async fn load(&self, identifier: &str) -> Result<FrameSequence, DecodeError> {
        let stream = self.source.open(identifier).await?;
        FrameDecoder::decode_async(stream).await
    }

    /// Play an already decoded sequence to `target`.
    pub async fn play(
        &self,
        target: &PlaybackTarget,
        frames: FrameSequence,
    ) -> Result<PlaybackSummary, PlaybackError> {
        self.streamer.play(&self.connector, target, frames).await
    }

    /// Load `identifier` and play it to `target`.
    ///
    /// Callers sharing a destination must not overlap calls; [`Soundboard::spawn`]
    /// serializes them.
    pub async fn load_and_play(
        &self,
        identifier: &str,
        target: &PlaybackTarget,
    ) -> Result<PlaybackSummary> {
        info!("Playing '{}' to {}", identifier, target);
        let frames = self.load(identifier).await?;
        Ok(self.play(target, frames).await?)
    }

    /// Move the soundboard into a worker task that runs jobs one at a time.
    pub fn spawn(self, queue_depth: usize) -> WorkerHandle {
        Driver::spawn(self, queue_depth)
    }
}
