//! Source trait for container resolution

use crate::DecodeError;
use tokio::io::AsyncRead;

/// Byte stream positioned at the start of a container.
pub type ContainerStream = Box<dyn AsyncRead + Send + Unpin>;

/// Trait for resolving sound identifiers to containers
///
/// Sources abstract over where containers live (a directory on disk,
/// embedded bytes, a remote store). The decoder only needs a byte stream.
#[async_trait::async_trait]
pub trait SoundSource: Send + Sync + 'static {
    /// Open the container named `identifier`
    ///
    /// Returns:
    /// - `Ok(stream)` - Stream positioned at the first record
    /// - `Err(DecodeError::ResourceNotFound)` - Identifier does not resolve
    /// - `Err(DecodeError::Io)` - Resource exists but could not be opened
    async fn open(&self, identifier: &str) -> Result<ContainerStream, DecodeError>;

    /// Whether `identifier` currently resolves
    async fn contains(&self, identifier: &str) -> bool {
        self.open(identifier).await.is_ok()
    }
}
