//! Transport traits for the voice connection
//!
//! A [`Connector`] joins a [`PlaybackTarget`] and hands back a [`Transport`]:
//! the live outbound channel frames are pushed into. Implementations wrap a
//! real voice client; [`crate::transports::channel`] provides an in-process
//! loopback.

use crate::TransportError;
use crate::types::{Frame, PlaybackTarget};

/// Live outbound audio channel for one playback session.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Signal speaking/live status to the remote side.
    async fn set_active(&mut self, active: bool) -> Result<(), TransportError>;

    /// Hand one frame to the transport.
    ///
    /// Must not return until the transport has accepted the frame; this is
    /// the only pacing applied to playback. Returns
    /// [`TransportError::Closed`] once the outbound channel is gone.
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError>;

    /// Leave the destination and release the connection.
    ///
    /// Called exactly once per successful join.
    async fn release(&mut self) -> Result<(), TransportError>;
}

/// Joins playback destinations.
#[async_trait::async_trait]
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport;

    /// Join `target` and return a transport bound to it.
    async fn join(&self, target: &PlaybackTarget) -> Result<Self::Transport, TransportError>;
}
