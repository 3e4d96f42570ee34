//! In-memory session store.
//!
//! Backs tests and single-process deployments that don't need persistence.
//! Applies the same capped-write policy as the Redis store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use parley_core::error::Result;
use parley_core::types::{ChatTurn, UserId};

use crate::{trim_to_cap, SessionStore};

/// Session store backed by a process-local map.
pub struct MemorySessionStore {
    inner: Mutex<HashMap<UserId, Vec<ChatTurn>>>,
    max_turns: usize,
}

impl MemorySessionStore {
    /// Create a store that retains at most `max_turns` records per user.
    pub fn new(max_turns: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            max_turns,
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, user: UserId) -> Result<Vec<ChatTurn>> {
        let map = self.inner.lock().unwrap();
        Ok(map.get(&user).cloned().unwrap_or_default())
    }

    async fn save(&self, user: UserId, session: &[ChatTurn]) -> Result<()> {
        let mut map = self.inner.lock().unwrap();
        map.insert(user, trim_to_cap(session, self.max_turns).to_vec());
        Ok(())
    }

    async fn clear(&self, user: UserId) -> Result<()> {
        let mut map = self.inner.lock().unwrap();
        map.remove(&user);
        Ok(())
    }
}
