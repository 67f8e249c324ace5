//! Filesystem source for DCA containers

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::DecodeError;
use crate::source::{ContainerStream, SoundSource};

/// Default container file extension.
pub const DEFAULT_EXTENSION: &str = "dca";

/// Resolves `<identifier>` to `<root>/<identifier>.<extension>`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extension: String,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self::with_extension(root, DEFAULT_EXTENSION)
    }

    pub fn with_extension<P: AsRef<Path>>(root: P, extension: impl Into<String>) -> Self {
        Self { root: root.as_ref().to_path_buf(), extension: extension.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for `identifier`, or `None` if the identifier would escape the root.
    pub fn path_for(&self, identifier: &str) -> Option<PathBuf> {
        let mut components = Path::new(identifier).components();
        let single_normal = matches!(components.next(), Some(Component::Normal(_)))
            && components.next().is_none();
        if identifier.is_empty() || !single_normal || identifier.contains(['/', '\\']) {
            return None;
        }

        let file_name = if self.extension.is_empty() {
            identifier.to_string()
        } else {
            format!("{identifier}.{}", self.extension)
        };
        Some(self.root.join(file_name))
    }
}

#[async_trait::async_trait]
impl SoundSource for DirectorySource {
    async fn open(&self, identifier: &str) -> Result<ContainerStream, DecodeError> {
        let path = self.path_for(identifier).ok_or_else(|| DecodeError::not_found(identifier))?;

        debug!("Opening container {}", path.display());
        match tokio::fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(tokio::io::BufReader::new(file))),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DecodeError::ResourceNotFound {
                identifier: identifier.to_string(),
                source: Some(e),
            }),
            Err(e) => Err(DecodeError::io(format!("opening {}", path.display()), e)),
        }
    }
}
