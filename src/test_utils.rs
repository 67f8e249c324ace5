//! Test utilities for building containers and observing playback
//!
//! This module provides container builders and a recording transport double
//! with fault injection, shared by unit tests, integration tests and
//! benchmarks.

#![cfg(any(test, feature = "benchmark"))]

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::TransportError;
use crate::dca::format;
use crate::transport::{Connector, Transport};
use crate::types::{Frame, FrameSequence, PlaybackTarget};

/// Build a sequence of one-byte frames, one per element of `bytes`.
pub fn sequence_of(bytes: &[u8]) -> FrameSequence {
    bytes.iter().map(|&b| Frame::new(vec![b]).expect("one-byte frame")).collect()
}

/// Encode `payloads` as a container.
pub fn container_of<P: AsRef<[u8]>>(payloads: &[P]) -> Vec<u8> {
    format::encode_container(payloads).expect("test payloads fit in a record")
}

/// A container of `frame_count` frames of `frame_len` bytes with a
/// recognisable byte pattern.
pub fn synthetic_container(frame_count: usize, frame_len: usize) -> Vec<u8> {
    let payloads: Vec<Vec<u8>> = (0..frame_count)
        .map(|i| (0..frame_len).map(|j| (i + j) as u8).collect())
        .collect();
    container_of(&payloads)
}

/// Observable transport activity, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Joined(PlaybackTarget),
    Active(bool),
    Sent(Vec<u8>),
    Released,
}

#[derive(Debug, Default)]
struct Log {
    events: Vec<TransportEvent>,
    attempted: Vec<Vec<u8>>,
    joins: usize,
    releases: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Faults {
    join: bool,
    activation: bool,
    send_at: Option<usize>,
    send_delay: Option<Duration>,
}

/// Connector double that records every transport call.
///
/// Clones share the same log, so a clone can be handed to the code under
/// test while the first handle is inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordingConnector {
    log: Arc<Mutex<Log>>,
    faults: Faults,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every join fails.
    pub fn fail_join(mut self) -> Self {
        self.faults.join = true;
        self
    }

    /// `set_active(true)` fails.
    pub fn fail_activation(mut self) -> Self {
        self.faults.activation = true;
        self
    }

    /// The send with zero-based index `index` fails with [`TransportError::Closed`].
    pub fn fail_send_at(mut self, index: usize) -> Self {
        self.faults.send_at = Some(index);
        self
    }

    /// Each send waits `delay` before being accepted.
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.faults.send_delay = Some(delay);
        self
    }

    fn log(&self) -> MutexGuard<'_, Log> {
        self.log.lock().expect("recording log poisoned")
    }

    pub fn events(&self) -> Vec<TransportEvent> {
        self.log().events.clone()
    }

    /// Payloads the transport accepted.
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.log()
            .events
            .iter()
            .filter_map(|e| match e {
                TransportEvent::Sent(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    /// Payloads passed to `send`, including a failed attempt.
    pub fn attempted_frames(&self) -> Vec<Vec<u8>> {
        self.log().attempted.clone()
    }

    pub fn join_count(&self) -> usize {
        self.log().joins
    }

    pub fn release_count(&self) -> usize {
        self.log().releases
    }

    /// The most recent successful `set_active` value.
    pub fn last_active(&self) -> Option<bool> {
        self.log().events.iter().rev().find_map(|e| match e {
            TransportEvent::Active(active) => Some(*active),
            _ => None,
        })
    }
}

#[async_trait::async_trait]
impl Connector for RecordingConnector {
    type Transport = RecordingTransport;

    async fn join(&self, target: &PlaybackTarget) -> Result<RecordingTransport, TransportError> {
        if self.faults.join {
            return Err(TransportError::rejected("join refused"));
        }
        let mut log = self.log();
        log.joins += 1;
        log.events.push(TransportEvent::Joined(target.clone()));
        Ok(RecordingTransport { log: Arc::clone(&self.log), faults: self.faults, sends: 0 })
    }
}

/// Transport half of [`RecordingConnector`].
#[derive(Debug)]
pub struct RecordingTransport {
    log: Arc<Mutex<Log>>,
    faults: Faults,
    sends: usize,
}

impl RecordingTransport {
    fn log(&self) -> MutexGuard<'_, Log> {
        self.log.lock().expect("recording log poisoned")
    }
}

#[async_trait::async_trait]
impl Transport for RecordingTransport {
    async fn set_active(&mut self, active: bool) -> Result<(), TransportError> {
        if active && self.faults.activation {
            return Err(TransportError::rejected("speaking refused"));
        }
        self.log().events.push(TransportEvent::Active(active));
        Ok(())
    }

    async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        let index = self.sends;
        self.sends += 1;
        self.log().attempted.push(frame.as_bytes().to_vec());

        if self.faults.send_at == Some(index) {
            return Err(TransportError::Closed);
        }
        if let Some(delay) = self.faults.send_delay {
            tokio::time::sleep(delay).await;
        }
        self.log().events.push(TransportEvent::Sent(frame.into_inner()));
        Ok(())
    }

    async fn release(&mut self) -> Result<(), TransportError> {
        let mut log = self.log();
        log.releases += 1;
        log.events.push(TransportEvent::Released);
        Ok(())
    }
}
