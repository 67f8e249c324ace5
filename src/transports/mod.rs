//! Transport implementations

pub mod channel;

pub use channel::{
    ChannelConnector, ChannelListener, ChannelSink, ChannelTransport, PENDING_SESSIONS,
};
