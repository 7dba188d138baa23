use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::StoreError;

/// Where the serialized document lives.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Returns `None` when nothing has been written yet.
    async fn read(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replaces the stored bytes.
    async fn write(&self, bytes: &[u8]) -> Result<(), StoreError>;
}

/// A single JSON file on disk.
pub struct FileBackend {
    path: PathBuf,
    atomic: bool,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>, atomic: bool) -> Self {
        Self {
            path: path.into(),
            atomic,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl Backend for FileBackend {
    async fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if self.atomic {
            // Readers never observe a half-written file.
            let tmp = self.temp_path();
            tokio::fs::write(&tmp, bytes).await?;
            tokio::fs::rename(&tmp, &self.path).await?;
        } else {
            tokio::fs::write(&self.path, bytes).await?;
        }
        Ok(())
    }
}

/// In-process storage, used by tests.
#[derive(Default)]
pub struct MemoryBackend {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes.into())),
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.bytes.lock().await.clone())
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), StoreError> {
        *self.bytes.lock().await = Some(bytes.to_vec());
        Ok(())
    }
}
