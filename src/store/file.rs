//! JSON-file-backed protected-page store
//!
//! Records are held in memory and written back to a single JSON document on
//! every mutation. The file is created on first write; a missing file on open
//! means an empty store.

use crate::error::{StoreError, StoreResult};
use crate::store::{PageRule, PageStore, ProtectedPage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::info;

/// On-disk document layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    next_pid: u64,
    pages: Vec<ProtectedPage>,
}

#[derive(Debug)]
struct Inner {
    pages: BTreeMap<u64, ProtectedPage>,
    next_pid: u64,
}

/// Page store persisted to a JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: RwLock<Inner>,
}

impl JsonFileStore {
    /// Open a store, loading existing records if the file is present.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let doc = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<StoreDocument>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreDocument::default(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let pages: BTreeMap<u64, ProtectedPage> =
            doc.pages.into_iter().map(|p| (p.pid, p)).collect();
        let next_pid = doc
            .next_pid
            .max(pages.keys().max().map(|pid| pid + 1).unwrap_or(1));

        info!(path = %path.display(), pages = pages.len(), "Opened protected page store");

        Ok(Self {
            path,
            inner: RwLock::new(Inner { pages, next_pid }),
        })
    }

    async fn persist(&self, inner: &Inner) -> StoreResult<()> {
        let doc = StoreDocument {
            next_pid: inner.next_pid,
            pages: inner.pages.values().cloned().collect(),
        };
        let bytes = serde_json::to_vec_pretty(&doc)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl PageStore for JsonFileStore {
    async fn list_rules(&self) -> StoreResult<Vec<PageRule>> {
        let inner = self.inner.read().await;
        Ok(inner.pages.values().map(ProtectedPage::rule).collect())
    }

    async fn get(&self, pid: u64) -> StoreResult<Option<ProtectedPage>> {
        let inner = self.inner.read().await;
        Ok(inner.pages.get(&pid).cloned())
    }

    async fn find_by_path(&self, path: &str) -> StoreResult<Option<u64>> {
        let inner = self.inner.read().await;
        Ok(inner
            .pages
            .values()
            .find(|p| p.path == path)
            .map(|p| p.pid))
    }

    // Mutations are staged on a copy and committed to memory only once the
    // file write succeeds, so a failed persist cannot leave memory and disk
    // disagreeing.

    async fn insert(&self, path: String, password_hash: String) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        if inner.pages.values().any(|p| p.path == path) {
            return Err(StoreError::DuplicatePath { path });
        }

        let pid = inner.next_pid;
        let mut staged = Inner {
            pages: inner.pages.clone(),
            next_pid: pid + 1,
        };
        staged.pages.insert(
            pid,
            ProtectedPage {
                pid,
                path,
                password_hash,
            },
        );

        self.persist(&staged).await?;
        *inner = staged;
        Ok(pid)
    }

    async fn update(
        &self,
        pid: u64,
        path: Option<String>,
        password_hash: Option<String>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(new_path) = &path
            && inner
                .pages
                .values()
                .any(|p| p.pid != pid && p.path == *new_path)
        {
            return Err(StoreError::DuplicatePath {
                path: new_path.clone(),
            });
        }

        let mut staged = Inner {
            pages: inner.pages.clone(),
            next_pid: inner.next_pid,
        };
        {
            let page = staged
                .pages
                .get_mut(&pid)
                .ok_or(StoreError::NotFound { pid })?;
            if let Some(new_path) = path {
                page.path = new_path;
            }
            if let Some(hash) = password_hash {
                page.password_hash = hash;
            }
        }

        self.persist(&staged).await?;
        *inner = staged;
        Ok(())
    }

    async fn remove(&self, pid: u64) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let mut staged = Inner {
            pages: inner.pages.clone(),
            next_pid: inner.next_pid,
        };
        staged
            .pages
            .remove(&pid)
            .ok_or(StoreError::NotFound { pid })?;

        self.persist(&staged).await?;
        *inner = staged;
        Ok(())
    }
}
