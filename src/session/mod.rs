//! Session unlock tracking
//!
//! A visitor session carries a set of pids it has successfully authenticated
//! against. The gate only reads this set; the login submission handler is the
//! single writer. Sessions are identified by an opaque cookie value, see
//! [`cookie`].

pub mod cookie;
mod memory;

pub use memory::MemoryUnlocks;

/// Per-session unlock state, keyed by session id.
///
/// An id enters the unlock set only through a successful password
/// submission. The gate treats this store as read-only.
pub trait SessionUnlocks: Send + Sync {
    /// Has this session authenticated against this protected page?
    fn is_unlocked(&self, session_id: &str, pid: u64) -> bool;

    /// Record a successful authentication for this session.
    fn unlock(&self, session_id: &str, pid: u64);

    /// Drop all unlocks held by a session.
    fn lock_all(&self, session_id: &str);
}
