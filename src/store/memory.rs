//! In-memory protected-page store
//!
//! Default backend when no storage path is configured. A `BTreeMap` keyed by
//! pid keeps iteration in creation order, which is the documented matching
//! precedence.

use crate::error::{StoreError, StoreResult};
use crate::store::{PageRule, PageStore, ProtectedPage};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory page store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: RwLock<BTreeMap<u64, ProtectedPage>>,
    next_pid: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            pages: RwLock::new(BTreeMap::new()),
            next_pid: AtomicU64::new(1),
        }
    }

    /// Seed the store with existing records (restores `next_pid` as well).
    pub fn with_pages(pages: impl IntoIterator<Item = ProtectedPage>) -> Self {
        let map: BTreeMap<u64, ProtectedPage> =
            pages.into_iter().map(|p| (p.pid, p)).collect();
        let next = map.keys().max().map(|pid| pid + 1).unwrap_or(1);
        Self {
            pages: RwLock::new(map),
            next_pid: AtomicU64::new(next),
        }
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, BTreeMap<u64, ProtectedPage>>> {
        self.pages
            .read()
            .map_err(|_| StoreError::Unavailable("page store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, BTreeMap<u64, ProtectedPage>>> {
        self.pages
            .write()
            .map_err(|_| StoreError::Unavailable("page store lock poisoned".into()))
    }
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn list_rules(&self) -> StoreResult<Vec<PageRule>> {
        Ok(self.read()?.values().map(ProtectedPage::rule).collect())
    }

    async fn get(&self, pid: u64) -> StoreResult<Option<ProtectedPage>> {
        Ok(self.read()?.get(&pid).cloned())
    }

    async fn find_by_path(&self, path: &str) -> StoreResult<Option<u64>> {
        Ok(self
            .read()?
            .values()
            .find(|p| p.path == path)
            .map(|p| p.pid))
    }

    async fn insert(&self, path: String, password_hash: String) -> StoreResult<u64> {
        let mut pages = self.write()?;
        if pages.values().any(|p| p.path == path) {
            return Err(StoreError::DuplicatePath { path });
        }
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        pages.insert(
            pid,
            ProtectedPage {
                pid,
                path,
                password_hash,
            },
        );
        Ok(pid)
    }

    async fn update(
        &self,
        pid: u64,
        path: Option<String>,
        password_hash: Option<String>,
    ) -> StoreResult<()> {
        let mut pages = self.write()?;
        if let Some(new_path) = &path
            && pages.values().any(|p| p.pid != pid && p.path == *new_path)
        {
            return Err(StoreError::DuplicatePath {
                path: new_path.clone(),
            });
        }
        let page = pages.get_mut(&pid).ok_or(StoreError::NotFound { pid })?;
        if let Some(new_path) = path {
            page.path = new_path;
        }
        if let Some(hash) = password_hash {
            page.password_hash = hash;
        }
        Ok(())
    }

    async fn remove(&self, pid: u64) -> StoreResult<()> {
        let mut pages = self.write()?;
        pages
            .remove(&pid)
            .map(|_| ())
            .ok_or(StoreError::NotFound { pid })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_sequential_pids() {
        let store = MemoryStore::new();
        let a = store.insert("/a".into(), "h1".into()).await.unwrap();
        let b = store.insert("/b".into(), "h2".into()).await.unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[tokio::test]
    async fn test_list_rules_in_pid_order_without_hashes() {
        let store = MemoryStore::new();
        store.insert("/b".into(), "h2".into()).await.unwrap();
        store.insert("/a".into(), "h1".into()).await.unwrap();

        let rules = store.list_rules().await.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].path, "/b");
        assert_eq!(rules[1].path, "/a");
        assert!(rules[0].pid < rules[1].pid);
    }

    #[tokio::test]
    async fn test_duplicate_path_rejected() {
        let store = MemoryStore::new();
        store.insert("/a".into(), "h1".into()).await.unwrap();
        let err = store.insert("/a".into(), "h2".into()).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicatePath { .. }));
    }

    #[tokio::test]
    async fn test_update_path_and_hash() {
        let store = MemoryStore::new();
        let pid = store.insert("/a".into(), "h1".into()).await.unwrap();

        store
            .update(pid, Some("/b".into()), Some("h2".into()))
            .await
            .unwrap();

        let page = store.get(pid).await.unwrap().unwrap();
        assert_eq!(page.path, "/b");
        assert_eq!(page.password_hash, "h2");
    }

    #[tokio::test]
    async fn test_update_to_existing_path_rejected() {
        let store = MemoryStore::new();
        store.insert("/a".into(), "h1".into()).await.unwrap();
        let pid = store.insert("/b".into(), "h2".into()).await.unwrap();

        let err = store
            .update(pid, Some("/a".into()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicatePath { .. }));
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.remove(42).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { pid: 42 }));
    }

    #[tokio::test]
    async fn test_with_pages_restores_next_pid() {
        let store = MemoryStore::with_pages([ProtectedPage {
            pid: 9,
            path: "/a".into(),
            password_hash: "h".into(),
        }]);
        let pid = store.insert("/b".into(), "h2".into()).await.unwrap();
        assert_eq!(pid, 10);
    }
}
