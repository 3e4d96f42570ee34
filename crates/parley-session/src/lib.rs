//! Per-user session persistence.
//!
//! A session is an ordered list of role-tagged records, capped at a fixed
//! number of entries on every write. Absence of a session is not an error;
//! a user's first message simply loads an empty history.

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;

use parley_core::error::Result;
use parley_core::types::{ChatTurn, UserId};

pub use memory::MemorySessionStore;
pub use redis_store::RedisSessionStore;

/// Keyed store mapping a user to their conversation history.
///
/// Implementations perform single-key reads and overwrites; no cross-call
/// locking is provided. Concurrent writes for the same user may race and the
/// later write wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Return the stored history for `user`, or an empty sequence if none
    /// exists.
    async fn load(&self, user: UserId) -> Result<Vec<ChatTurn>>;

    /// Persist the last `max_turns` entries of `session`, overwriting any
    /// prior value.
    async fn save(&self, user: UserId, session: &[ChatTurn]) -> Result<()>;

    /// Delete all stored state for `user`. Clearing an absent session is a
    /// no-op success.
    async fn clear(&self, user: UserId) -> Result<()>;
}

/// The tail of `session` that survives a capped write.
///
/// Truncation always drops the oldest entries.
pub fn trim_to_cap(session: &[ChatTurn], cap: usize) -> &[ChatTurn] {
    &session[session.len().saturating_sub(cap)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(n: usize) -> Vec<ChatTurn> {
        (0..n).map(|i| ChatTurn::user(format!("m{}", i))).collect()
    }

    #[test]
    fn test_trim_under_cap_keeps_all() {
        let session = turns(3);
        assert_eq!(trim_to_cap(&session, 10), session.as_slice());
    }

    #[test]
    fn test_trim_at_cap_keeps_all() {
        let session = turns(10);
        assert_eq!(trim_to_cap(&session, 10).len(), 10);
    }

    #[test]
    fn test_trim_over_cap_drops_oldest() {
        let session = turns(12);
        let kept = trim_to_cap(&session, 10);
        assert_eq!(kept.len(), 10);
        assert_eq!(kept[0].content, "m2");
        assert_eq!(kept[9].content, "m11");
    }

    #[test]
    fn test_trim_zero_cap_is_empty() {
        let session = turns(4);
        assert!(trim_to_cap(&session, 0).is_empty());
    }

    #[test]
    fn test_trim_empty_session() {
        assert!(trim_to_cap(&[], 10).is_empty());
    }
}
