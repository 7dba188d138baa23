//! The JSON document store.
//!
//! Every request re-reads the backing document; nothing is cached between
//! requests. Mutations go through [`Store::update`], which holds a single
//! writer lock across the whole load-mutate-save cycle so that two requests
//! in the same process cannot lose each other's writes.

pub mod backend;
pub mod document;
pub mod seed;

use std::sync::Arc;

use tokio::sync::Mutex;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use document::{Document, Meta, SiteConfig};
pub use seed::Preset;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed store document: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct Store {
    backend: Arc<dyn Backend>,
    preset: Preset,
    writer: Mutex<()>,
}

impl Store {
    pub fn new(backend: Arc<dyn Backend>, preset: Preset) -> Self {
        Self {
            backend,
            preset,
            writer: Mutex::new(()),
        }
    }

    /// Reads the document, writing the preset's seed content first if the
    /// backend is empty.
    pub async fn load(&self) -> Result<Document, StoreError> {
        if let Some(bytes) = self.backend.read().await? {
            return Ok(serde_json::from_slice(&bytes)?);
        }
        let _guard = self.writer.lock().await;
        self.load_locked().await
    }

    /// Like [`Store::load`], but the caller must already hold `writer`.
    /// Re-reads so a seed never lands on top of a write made while waiting.
    async fn load_locked(&self) -> Result<Document, StoreError> {
        match self.backend.read().await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => {
                let doc = seed::document(self.preset);
                self.save(&doc).await?;
                tracing::info!("Created initial store document ({:?} preset)", self.preset);
                Ok(doc)
            }
        }
    }

    /// Whether the backend holds a document yet. Does not seed.
    pub async fn exists(&self) -> Result<bool, StoreError> {
        Ok(self.backend.read().await?.is_some())
    }

    pub async fn save(&self, doc: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        self.backend.write(&bytes).await
    }

    /// Makes sure a document exists before the first request arrives.
    pub async fn ensure_seeded(&self) -> Result<(), StoreError> {
        let _guard = self.writer.lock().await;
        self.load_locked().await.map(|_| ())
    }

    pub async fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Document) -> T + Send,
    {
        let doc = self.load().await?;
        Ok(f(&doc))
    }

    /// Runs `f` against a fresh copy of the document and persists the result.
    /// Nothing is written when `f` fails.
    pub async fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Document) -> Result<T, E> + Send,
        T: Send,
        E: From<StoreError> + Send,
    {
        let _guard = self.writer.lock().await;
        let mut doc = self.load_locked().await?;
        let out = f(&mut doc)?;
        self.save(&doc).await?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn memory_store() -> (Arc<MemoryBackend>, Store) {
        let backend = Arc::new(MemoryBackend::new());
        let store = Store::new(backend.clone(), Preset::Blog);
        (backend, store)
    }

    #[tokio::test]
    async fn load_seeds_empty_backend() {
        let (backend, store) = memory_store();
        let doc = store.load().await.unwrap();
        assert!(doc.posts.contains_key("welcome"));
        assert!(backend.read().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn exists_does_not_seed() {
        let (backend, store) = memory_store();
        assert!(!store.exists().await.unwrap());
        assert!(backend.read().await.unwrap().is_none());
        store.ensure_seeded().await.unwrap();
        assert!(store.exists().await.unwrap());
    }

    #[tokio::test]
    async fn load_reports_malformed_json() {
        let backend = Arc::new(MemoryBackend::with_contents("{ not json"));
        let store = Store::new(backend, Preset::Blog);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }

    #[tokio::test]
    async fn update_persists_changes() {
        let (_backend, store) = memory_store();
        store
            .update(|doc| {
                doc.config.require_approval = true;
                Ok::<_, StoreError>(())
            })
            .await
            .unwrap();
        let doc = store.load().await.unwrap();
        assert!(doc.config.require_approval);
    }

    #[tokio::test]
    async fn failed_update_writes_nothing() {
        let (_backend, store) = memory_store();
        let result: Result<(), AppError> = store
            .update(|doc| {
                doc.posts.clear();
                Err(AppError::Forbidden)
            })
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
        let doc = store.load().await.unwrap();
        assert_eq!(doc.posts.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_updates_do_not_lose_writes() {
        let (_backend, store) = memory_store();
        let store = Arc::new(store);
        store.ensure_seeded().await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update(|doc| {
                        if let Some(post) = doc.posts.get_mut("welcome") {
                            post.likes += 1;
                        }
                        Ok::<_, StoreError>(())
                    })
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let likes = store.read(|doc| doc.posts["welcome"].likes).await.unwrap();
        assert_eq!(likes, 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn seeding_reads_do_not_clobber_concurrent_updates() {
        for _ in 0..10 {
            let (_backend, store) = memory_store();
            let store = Arc::new(store);

            let mut handles = Vec::new();
            for i in 0..16 {
                let store = store.clone();
                handles.push(tokio::spawn(async move {
                    if i % 2 == 0 {
                        store
                            .update(|doc| {
                                if let Some(post) = doc.posts.get_mut("welcome") {
                                    post.likes += 1;
                                }
                                Ok::<_, StoreError>(())
                            })
                            .await
                            .unwrap();
                    } else {
                        store.read(|doc| doc.posts.len()).await.unwrap();
                    }
                }));
            }
            for h in handles {
                h.await.unwrap();
            }

            let likes = store.read(|doc| doc.posts["welcome"].likes).await.unwrap();
            assert_eq!(likes, 8);
        }
    }

    #[tokio::test]
    async fn file_store_survives_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data.json");
        let store = Store::new(Arc::new(FileBackend::new(&path, true)), Preset::Research);
        store.ensure_seeded().await.unwrap();

        let reopened = Store::new(Arc::new(FileBackend::new(&path, true)), Preset::Blog);
        let doc = reopened.load().await.unwrap();
        assert!(doc.projects.contains_key("welcome-project"));
        assert!(doc.posts.is_empty());
    }
}
