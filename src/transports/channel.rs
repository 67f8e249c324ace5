//! In-process loopback transport
//!
//! Every join creates a bounded frame channel. The connector keeps the
//! sending half as a [`ChannelTransport`]; the receiving half is delivered to
//! the [`ChannelListener`] as a [`ChannelSink`]. With a bounded channel,
//! `send` waits whenever the sink falls `capacity` frames behind, so the sink
//! sets the pace exactly like a voice client's outbound queue.
//!
//! At most [`PENDING_SESSIONS`] joined sessions may wait to be accepted.
//! Joins beyond that are rejected until the listener catches up.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::{ReceiverStream, WatchStream};
use tracing::{debug, trace};

use crate::transport::{Connector, Transport};
use crate::types::{Frame, PlaybackTarget};
use crate::TransportError;

/// Joined sessions the listener may leave unaccepted before joins fail.
pub const PENDING_SESSIONS: usize = 8;

/// Connector handing out loopback transports.
#[derive(Debug, Clone)]
pub struct ChannelConnector {
    capacity: usize,
    sinks: mpsc::Sender<ChannelSink>,
}

/// Receives one [`ChannelSink`] per join.
#[derive(Debug)]
pub struct ChannelListener {
    sinks: mpsc::Receiver<ChannelSink>,
}

impl ChannelConnector {
    /// Create a connector whose transports buffer at most `capacity` frames.
    pub fn new(capacity: usize) -> (Self, ChannelListener) {
        let (tx, rx) = mpsc::channel(PENDING_SESSIONS);
        (Self { capacity: capacity.max(1), sinks: tx }, ChannelListener { sinks: rx })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl ChannelListener {
    /// Wait for the next joined session. `None` once every connector is gone.
    pub async fn accept(&mut self) -> Option<ChannelSink> {
        self.sinks.recv().await
    }
}

#[async_trait::async_trait]
impl Connector for ChannelConnector {
    type Transport = ChannelTransport;

    async fn join(&self, target: &PlaybackTarget) -> Result<ChannelTransport, TransportError> {
        let (frame_tx, frame_rx) = mpsc::channel(self.capacity);
        let (active_tx, active_rx) = watch::channel(false);

        let sink = ChannelSink {
            target: target.clone(),
            frames: ReceiverStream::new(frame_rx),
            active: active_rx,
        };
        self.sinks.try_send(sink).map_err(|e| {
            TransportError::rejected(match e {
                TrySendError::Full(_) => "listener has too many unaccepted sessions",
                TrySendError::Closed(_) => "no listener is accepting sessions",
            })
        })?;

        debug!("Loopback session opened for {}", target);
        Ok(ChannelTransport { target: target.clone(), frames: Some(frame_tx), active: active_tx })
    }
}

/// Sending half of a loopback session.
#[derive(Debug)]
pub struct ChannelTransport {
    target: PlaybackTarget,
    frames: Option<mpsc::Sender<Frame>>,
    active: watch::Sender<bool>,
}

impl ChannelTransport {
    pub fn target(&self) -> &PlaybackTarget {
        &self.target
    }

    pub fn is_released(&self) -> bool {
        self.frames.is_none()
    }
}

#[async_trait::async_trait]
impl Transport for ChannelTransport {
    async fn set_active(&mut self, active: bool) -> Result<(), TransportError> {
        if self.frames.is_none() {
            return Err(TransportError::Closed);
        }
        self.active.send_replace(active);
        Ok(())
    }

    async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        let frames = self.frames.as_ref().ok_or(TransportError::Closed)?;
        trace!("Sending {} byte frame to {}", frame.len(), self.target);
        frames.send(frame).await.map_err(|_| TransportError::Closed)
    }

    async fn release(&mut self) -> Result<(), TransportError> {
        if self.frames.take().is_some() {
            debug!("Loopback session released for {}", self.target);
        }
        Ok(())
    }
}

/// Receiving half of a loopback session.
///
/// Yields frames in send order and ends once the transport is released.
#[derive(Debug)]
pub struct ChannelSink {
    target: PlaybackTarget,
    frames: ReceiverStream<Frame>,
    active: watch::Receiver<bool>,
}

impl ChannelSink {
    pub fn target(&self) -> &PlaybackTarget {
        &self.target
    }

    /// Current speaking state.
    pub fn is_active(&self) -> bool {
        *self.active.borrow()
    }

    /// Stream of speaking-state changes, starting with the current value.
    pub fn active_updates(&self) -> WatchStream<bool> {
        WatchStream::new(self.active.clone())
    }

    /// Receive the next frame, or `None` once the transport is released.
    pub async fn recv(&mut self) -> Option<Frame> {
        futures::StreamExt::next(&mut self.frames).await
    }
}

impl Stream for ChannelSink {
    type Item = Frame;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Frame>> {
        Pin::new(&mut self.frames).poll_next(cx)
    }
}
