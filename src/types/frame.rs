//! Frame and frame sequence types

use crate::dca::format::{self, MAX_FRAME_LEN};

/// One opaque unit of pre-encoded audio.
///
/// Frames are never inspected by this crate. Sending a frame to a transport
/// moves it; nothing is copied back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    data: Vec<u8>,
}

impl Frame {
    /// Wrap an encoded payload.
    ///
    /// Returns `None` if the payload cannot be represented in a container
    /// (longer than [`MAX_FRAME_LEN`] bytes).
    pub fn new(data: Vec<u8>) -> Option<Self> {
        (data.len() <= MAX_FRAME_LEN).then_some(Self { data })
    }

    pub(crate) fn from_payload(data: Vec<u8>) -> Self {
        debug_assert!(data.len() <= MAX_FRAME_LEN);
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Ordered frames decoded from one container.
///
/// Insertion order is playback order. A sequence belongs to exactly one
/// load/play job and is consumed by playback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Total payload bytes, excluding length headers.
    pub fn payload_bytes(&self) -> usize {
        self.frames.iter().map(Frame::len).sum()
    }

    /// Re-encode the sequence with the container's length-prefix scheme.
    pub fn to_container_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload_bytes() + 2 * self.len());
        for frame in &self.frames {
            format::write_record(&mut out, frame.as_bytes());
        }
        out
    }
}

impl From<Vec<Frame>> for FrameSequence {
    fn from(frames: Vec<Frame>) -> Self {
        Self { frames }
    }
}

impl FromIterator<Frame> for FrameSequence {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self { frames: iter.into_iter().collect() }
    }
}

impl IntoIterator for FrameSequence {
    type Item = Frame;
    type IntoIter = std::vec::IntoIter<Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
