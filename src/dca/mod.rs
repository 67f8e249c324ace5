//! DCA container decoding
//!
//! DCA files hold pre-encoded audio frames, each prefixed with its length.
//! See [`format`] for the byte layout and [`reader`] for decoding.

pub mod format;
pub mod reader;

pub use reader::{ContainerReader, FrameDecoder};
