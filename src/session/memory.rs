//! In-memory session unlock store

use crate::session::SessionUnlocks;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

/// Unlock store held in process memory.
///
/// Each unlock carries its creation time; with a TTL configured, expired
/// unlocks are dropped lazily on read. A TTL of `None` keeps unlocks for the
/// lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryUnlocks {
    ttl: Option<Duration>,
    sessions: RwLock<HashMap<String, HashMap<u64, Instant>>>,
}

impl MemoryUnlocks {
    /// Create a store without expiry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose unlocks expire after `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn expired(&self, unlocked_at: Instant) -> bool {
        match self.ttl {
            Some(ttl) => unlocked_at.elapsed() > ttl,
            None => false,
        }
    }
}

impl SessionUnlocks for MemoryUnlocks {
    fn is_unlocked(&self, session_id: &str, pid: u64) -> bool {
        let fresh = {
            let sessions = match self.sessions.read() {
                Ok(guard) => guard,
                Err(_) => return false,
            };
            sessions
                .get(session_id)
                .and_then(|unlocks| unlocks.get(&pid))
                .map(|at| !self.expired(*at))
        };

        match fresh {
            Some(true) => true,
            Some(false) => {
                // Lazy expiry: drop the stale entry so it cannot linger.
                if let Ok(mut sessions) = self.sessions.write()
                    && let Some(unlocks) = sessions.get_mut(session_id)
                {
                    unlocks.remove(&pid);
                    if unlocks.is_empty() {
                        sessions.remove(session_id);
                    }
                }
                false
            }
            None => false,
        }
    }

    fn unlock(&self, session_id: &str, pid: u64) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions
                .entry(session_id.to_string())
                .or_default()
                .insert(pid, Instant::now());
            debug!(pid, "Session unlocked protected page");
        }
    }

    fn lock_all(&self, session_id: &str) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.remove(session_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_session_has_no_unlocks() {
        let unlocks = MemoryUnlocks::new();
        assert!(!unlocks.is_unlocked("s1", 1));
    }

    #[test]
    fn test_unlock_is_per_session_and_per_pid() {
        let unlocks = MemoryUnlocks::new();
        unlocks.unlock("s1", 1);

        assert!(unlocks.is_unlocked("s1", 1));
        assert!(!unlocks.is_unlocked("s1", 2));
        assert!(!unlocks.is_unlocked("s2", 1));
    }

    #[test]
    fn test_lock_all_clears_session() {
        let unlocks = MemoryUnlocks::new();
        unlocks.unlock("s1", 1);
        unlocks.unlock("s1", 2);
        unlocks.unlock("s2", 1);

        unlocks.lock_all("s1");

        assert!(!unlocks.is_unlocked("s1", 1));
        assert!(!unlocks.is_unlocked("s1", 2));
        assert!(unlocks.is_unlocked("s2", 1));
    }

    #[test]
    fn test_ttl_expires_unlocks() {
        let unlocks = MemoryUnlocks::with_ttl(Duration::from_millis(0));
        unlocks.unlock("s1", 1);
        std::thread::sleep(Duration::from_millis(5));
        assert!(!unlocks.is_unlocked("s1", 1));
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let unlocks = MemoryUnlocks::new();
        unlocks.unlock("s1", 1);
        assert!(unlocks.is_unlocked("s1", 1));
    }
}
