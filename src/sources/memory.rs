//! In-memory source for embedded containers

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use crate::DecodeError;
use crate::source::{ContainerStream, SoundSource};

/// Containers held in memory, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sounds: HashMap<String, Arc<[u8]>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register container bytes under `identifier`, replacing any previous entry.
    pub fn insert(&mut self, identifier: impl Into<String>, container: impl Into<Arc<[u8]>>) {
        self.sounds.insert(identifier.into(), container.into());
    }

    pub fn with_sound(mut self, identifier: impl Into<String>, container: impl Into<Arc<[u8]>>) -> Self {
        self.insert(identifier, container);
        self
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }
}

#[async_trait::async_trait]
impl SoundSource for MemorySource {
    async fn open(&self, identifier: &str) -> Result<ContainerStream, DecodeError> {
        let bytes = self.sounds.get(identifier).ok_or_else(|| DecodeError::not_found(identifier))?;
        Ok(Box::new(Cursor::new(Arc::clone(bytes))))
    }

    async fn contains(&self, identifier: &str) -> bool {
        self.sounds.contains_key(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dca::FrameDecoder;

    #[tokio::test]
    async fn serves_registered_containers() {
        let source = MemorySource::new().with_sound("moo", vec![0x02, 0x00, 0xAB, 0xCD]);
        assert_eq!(source.len(), 1);

        let frames = FrameDecoder::decode_async(source.open("moo").await.unwrap()).await.unwrap();
        assert_eq!(frames.len(), 1);

        // Each open gets its own cursor.
        let again = FrameDecoder::decode_async(source.open("moo").await.unwrap()).await.unwrap();
        assert_eq!(frames, again);
    }

    #[tokio::test]
    async fn unknown_identifier_is_not_found() {
        let source = MemorySource::new();
        let err = source.open("cows").await.err().unwrap();
        assert!(matches!(err, DecodeError::ResourceNotFound { ref identifier, .. } if identifier == "cows"));
    }
}
