//! DCA container reader
//!
//! Reads length-prefixed records from any byte stream, synchronous
//! ([`std::io::Read`]) or asynchronous ([`tokio::io::AsyncRead`]).
//!
//! ## Usage Example
//!
//! ```rust
//! use soundboard::dca::FrameDecoder;
//!
//! let bytes = [0x02, 0x00, 0xAB, 0xCD, 0x03, 0x00, 0x01, 0x02, 0x03];
//! let frames = FrameDecoder::decode(&bytes[..])?;
//!
//! assert_eq!(frames.len(), 2);
//! # Ok::<(), soundboard::DecodeError>(())
//! ```
//!
//! Decoding is all-or-nothing: a malformed record anywhere in the stream
//! discards every frame read so far. The reader is consumed by the decode
//! call, so the underlying resource is released on every exit path.

use super::format::{LENGTH_PREFIX_SIZE, MAX_FRAME_LEN, parse_length};
use crate::DecodeError;
use crate::types::{Frame, FrameSequence};
use std::io::{ErrorKind, Read};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace};

/// Incremental record reader over a byte stream.
pub struct ContainerReader<R> {
    reader: R,
    frame_index: usize,
    offset: u64,
}

impl<R> ContainerReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, frame_index: 0, offset: 0 }
    }

    /// Number of complete frames read so far.
    pub fn frames_read(&self) -> usize {
        self.frame_index
    }

    /// Bytes consumed from the stream so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn io_error(&self, source: std::io::Error) -> DecodeError {
        DecodeError::io(
            format!("frame {} at byte offset {}", self.frame_index, self.offset),
            source,
        )
    }

    /// Validate a length prefix. `Ok(None)` marks a clean end of stream.
    fn check_prefix(
        &mut self,
        got: usize,
        prefix: [u8; LENGTH_PREFIX_SIZE],
    ) -> Result<Option<usize>, DecodeError> {
        if got == 0 {
            return Ok(None);
        }
        if got < LENGTH_PREFIX_SIZE {
            return Err(DecodeError::malformed(
                self.frame_index,
                self.offset,
                format!("length header truncated ({got} of {LENGTH_PREFIX_SIZE} bytes)"),
            ));
        }

        let len = parse_length(prefix);
        if len > MAX_FRAME_LEN {
            return Err(DecodeError::malformed(
                self.frame_index,
                self.offset,
                format!("declared length {len} exceeds maximum {MAX_FRAME_LEN}"),
            ));
        }

        self.offset += LENGTH_PREFIX_SIZE as u64;
        Ok(Some(len))
    }

    fn finish_payload(&mut self, got: usize, payload: Vec<u8>) -> Result<Frame, DecodeError> {
        let expected = payload.len();
        if got < expected {
            return Err(DecodeError::malformed(
                self.frame_index,
                self.offset,
                format!("payload truncated: expected {expected} bytes, found {got}"),
            ));
        }

        trace!("Frame {}: {} bytes at offset {}", self.frame_index, expected, self.offset);
        self.offset += expected as u64;
        self.frame_index += 1;
        Ok(Frame::from_payload(payload))
    }
}

impl<R: Read> ContainerReader<R> {
    /// Read the next frame.
    ///
    /// Returns `Ok(None)` when the stream ends exactly on a record boundary.
    pub fn read_next_frame(&mut self) -> Result<Option<Frame>, DecodeError> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let got = read_full(&mut self.reader, &mut prefix).map_err(|e| self.io_error(e))?;
        let Some(len) = self.check_prefix(got, prefix)? else {
            return Ok(None);
        };

        let mut payload = vec![0u8; len];
        let got = read_full(&mut self.reader, &mut payload).map_err(|e| self.io_error(e))?;
        self.finish_payload(got, payload).map(Some)
    }
}

impl<R: AsyncRead + Unpin> ContainerReader<R> {
    /// Async counterpart of [`ContainerReader::read_next_frame`].
    pub async fn read_next_frame_async(&mut self) -> Result<Option<Frame>, DecodeError> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let got = read_full_async(&mut self.reader, &mut prefix)
            .await
            .map_err(|e| self.io_error(e))?;
        let Some(len) = self.check_prefix(got, prefix)? else {
            return Ok(None);
        };

        let mut payload = vec![0u8; len];
        let got = read_full_async(&mut self.reader, &mut payload)
            .await
            .map_err(|e| self.io_error(e))?;
        self.finish_payload(got, payload).map(Some)
    }
}

/// Whole-container decoding.
pub struct FrameDecoder;

impl FrameDecoder {
    /// Decode an entire container from a blocking reader.
    pub fn decode<R: Read>(reader: R) -> Result<FrameSequence, DecodeError> {
        let mut reader = ContainerReader::new(reader);
        let mut frames = FrameSequence::new();
        while let Some(frame) = reader.read_next_frame()? {
            frames.push(frame);
        }
        debug!("Decoded {} frames ({} bytes)", frames.len(), reader.offset());
        Ok(frames)
    }

    /// Decode an entire container from an async reader.
    pub async fn decode_async<R: AsyncRead + Unpin>(reader: R) -> Result<FrameSequence, DecodeError> {
        let mut reader = ContainerReader::new(reader);
        let mut frames = FrameSequence::new();
        while let Some(frame) = reader.read_next_frame_async().await? {
            frames.push(frame);
        }
        debug!("Decoded {} frames ({} bytes)", frames.len(), reader.offset());
        Ok(frames)
    }
}

/// Fill `buf` as far as the stream allows. Returns the number of bytes read;
/// anything short of `buf.len()` means end of stream.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

async fn read_full_async<R: AsyncRead + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dca::format::encode_container;
    use proptest::prelude::*;
    use std::io::Cursor;

    /// Hands out one byte per read and interrupts every other call.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        interrupt: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.data.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk on fire"))
        }
    }

    fn payloads(frames: FrameSequence) -> Vec<Vec<u8>> {
        frames.into_iter().map(Frame::into_inner).collect()
    }

    #[test]
    fn decodes_documented_example() {
        let bytes = [0x02, 0x00, 0xAB, 0xCD, 0x03, 0x00, 0x01, 0x02, 0x03];
        let frames = FrameDecoder::decode(&bytes[..]).unwrap();
        assert_eq!(payloads(frames), vec![vec![0xAB, 0xCD], vec![0x01, 0x02, 0x03]]);
    }

    #[test]
    fn empty_stream_is_empty_sequence() {
        let frames = FrameDecoder::decode(std::io::empty()).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn zero_length_records_are_frames() {
        let frames = FrameDecoder::decode(&[0x00, 0x00, 0x00, 0x00][..]).unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(Frame::is_empty));
    }

    #[test]
    fn truncated_payload_is_malformed() {
        let bytes = [0x02, 0x00, 0xAB, 0xCD, 0x03, 0x00, 0x01];
        let err = FrameDecoder::decode(&bytes[..]).unwrap_err();
        match err {
            DecodeError::MalformedContainer { frame_index, offset, .. } => {
                assert_eq!(frame_index, 1);
                assert_eq!(offset, 6);
            }
            other => panic!("expected MalformedContainer, got {other:?}"),
        }
    }

    #[test]
    fn partial_length_header_is_malformed() {
        let bytes = [0x02, 0x00, 0xAB, 0xCD, 0x03];
        let err = FrameDecoder::decode(&bytes[..]).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedContainer { frame_index: 1, offset: 4, .. }));
    }

    #[test]
    fn oversized_length_is_malformed() {
        let mut bytes = vec![0x00, 0x80];
        bytes.extend(std::iter::repeat_n(0u8, 0x8000));
        let err = FrameDecoder::decode(&bytes[..]).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedContainer { frame_index: 0, .. }));
    }

    #[test]
    fn short_reads_and_interrupts_are_retried() {
        let data = encode_container(&[vec![1u8, 2, 3], vec![4u8; 300]]).unwrap();
        let frames =
            FrameDecoder::decode(Trickle { data, pos: 0, interrupt: false }).unwrap();
        assert_eq!(payloads(frames), vec![vec![1, 2, 3], vec![4; 300]]);
    }

    #[test]
    fn read_failure_is_io_error() {
        let err = FrameDecoder::decode(Failing).unwrap_err();
        assert!(matches!(err, DecodeError::Io { .. }));
    }

    #[test]
    fn incremental_reader_tracks_position() {
        let bytes = encode_container(&[vec![9u8; 5], vec![]]).unwrap();
        let mut reader = ContainerReader::new(Cursor::new(bytes));

        let first = reader.read_next_frame().unwrap().unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(reader.offset(), 7);

        let second = reader.read_next_frame().unwrap().unwrap();
        assert!(second.is_empty());
        assert_eq!(reader.frames_read(), 2);

        assert!(reader.read_next_frame().unwrap().is_none());
        assert!(reader.read_next_frame().unwrap().is_none());
    }

    #[tokio::test]
    async fn async_decode_matches_sync() {
        let bytes = encode_container(&[vec![0xAAu8; 40], vec![0x55; 2], vec![]]).unwrap();
        let sync = FrameDecoder::decode(&bytes[..]).unwrap();
        let async_frames = FrameDecoder::decode_async(Cursor::new(bytes)).await.unwrap();
        assert_eq!(sync, async_frames);
    }

    #[tokio::test]
    async fn async_truncation_is_malformed() {
        let bytes = vec![0x04, 0x00, 0x01, 0x02];
        let err = FrameDecoder::decode_async(Cursor::new(bytes)).await.unwrap_err();
        assert!(matches!(err, DecodeError::MalformedContainer { .. }));
    }

    proptest! {
        #[test]
        fn reencoding_reproduces_container(
            records in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..512), 0..24)
        ) {
            let bytes = encode_container(&records).unwrap();
            let frames = FrameDecoder::decode(&bytes[..]).unwrap();
            prop_assert_eq!(frames.len(), records.len());
            prop_assert_eq!(frames.to_container_bytes(), bytes);
        }

        #[test]
        fn truncation_outcome_depends_on_boundary(
            records in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..12),
            cut_seed in any::<prop::sample::Index>()
        ) {
            let bytes = encode_container(&records).unwrap();
            let cut = cut_seed.index(bytes.len() + 1);

            let mut boundaries = vec![0usize];
            for record in &records {
                let last = *boundaries.last().unwrap();
                boundaries.push(last + LENGTH_PREFIX_SIZE + record.len());
            }

            let result = FrameDecoder::decode(&bytes[..cut]);
            match boundaries.iter().position(|&b| b == cut) {
                Some(complete) => {
                    let frames = result.unwrap();
                    prop_assert_eq!(payloads(frames), records[..complete].to_vec());
                }
                None => {
                    let is_malformed = matches!(result, Err(DecodeError::MalformedContainer { .. }));
                    prop_assert!(is_malformed);
                }
            }
        }
    }
}
