//! Protected-page record storage
//!
//! A protected page pairs a path pattern with a password hash. The gate only
//! ever reads the `(pid, path)` projection; password hashes are loaded by the
//! login handler alone. Two backends are provided: an in-memory store and a
//! JSON-file-backed store for persistence across restarts.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::StoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A stored protected-page record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedPage {
    /// Unique, stable identifier.
    pub pid: u64,
    /// Normalized path pattern, lowercased, may contain `*` wildcards.
    pub path: String,
    /// Opaque password digest. Never exposed through the admin API.
    pub password_hash: String,
}

/// The matching projection of a protected page.
///
/// Matching is cheap and happens on every response; loading hashes is not
/// required for it and must not happen here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRule {
    pub pid: u64,
    pub path: String,
}

impl ProtectedPage {
    /// The `(pid, path)` projection used by the matcher.
    pub fn rule(&self) -> PageRule {
        PageRule {
            pid: self.pid,
            path: self.path.clone(),
        }
    }
}

/// Storage backend for protected-page records.
///
/// `list_rules` returns records ordered by ascending pid, which fixes the
/// matcher's first-match precedence: the oldest matching record wins.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// All active rules, ascending by pid. Only the matching fields.
    async fn list_rules(&self) -> StoreResult<Vec<PageRule>>;

    /// Load a full record, including the password hash.
    async fn get(&self, pid: u64) -> StoreResult<Option<ProtectedPage>>;

    /// Find the pid registered for an exact path, if any.
    async fn find_by_path(&self, path: &str) -> StoreResult<Option<u64>>;

    /// Create a record and return its new pid.
    async fn insert(&self, path: String, password_hash: String) -> StoreResult<u64>;

    /// Update path and/or password hash of an existing record.
    async fn update(
        &self,
        pid: u64,
        path: Option<String>,
        password_hash: Option<String>,
    ) -> StoreResult<()>;

    /// Delete a record.
    async fn remove(&self, pid: u64) -> StoreResult<()>;
}
