//! Core value types shared by the decoder and the streamer.
//!
//! - [`Frame`] is one opaque pre-encoded audio payload
//! - [`FrameSequence`] is the ordered output of one container decode, owned by
//!   a single load/play job
//! - [`PlaybackTarget`] addresses the session and destination to play into
//!
//! ```rust
//! use soundboard::types::{Frame, FrameSequence};
//!
//! let frames: FrameSequence = vec![
//!     Frame::new(vec![0xAB, 0xCD]).unwrap(),
//!     Frame::new(vec![0x01, 0x02, 0x03]).unwrap(),
//! ]
//! .into();
//!
//! assert_eq!(
//!     frames.to_container_bytes(),
//!     vec![0x02, 0x00, 0xAB, 0xCD, 0x03, 0x00, 0x01, 0x02, 0x03]
//! );
//! ```

mod frame;
mod target;

pub use frame::{Frame, FrameSequence};
pub use target::PlaybackTarget;
