//! Redis-backed session store.
//!
//! Each user maps to a single key `session:<user_id>` holding the history as
//! a JSON array of `{role, content}` records. Keys carry no TTL; a session
//! lives until explicitly cleared.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use parley_core::error::{ParleyError, Result};
use parley_core::types::{ChatTurn, UserId};

use crate::{trim_to_cap, SessionStore};

/// Session store backed by a Redis instance.
///
/// Holds a [`ConnectionManager`], which multiplexes over one connection and
/// reconnects on failure; cloning it per call is cheap.
pub struct RedisSessionStore {
    conn: ConnectionManager,
    max_turns: usize,
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore")
            .field("max_turns", &self.max_turns)
            .finish_non_exhaustive()
    }
}

impl RedisSessionStore {
    /// Connect to Redis at `url` and retain at most `max_turns` records per
    /// user.
    pub async fn connect(url: &str, max_turns: usize) -> Result<Self> {
        let client =
            redis::Client::open(url).map_err(|e| ParleyError::Session(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| ParleyError::Session(e.to_string()))?;
        tracing::info!(url = %url, "Connected to Redis session store");
        Ok(Self { conn, max_turns })
    }

    /// Build a store from an existing connection manager.
    pub fn with_connection(conn: ConnectionManager, max_turns: usize) -> Self {
        Self { conn, max_turns }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, user: UserId) -> Result<Vec<ChatTurn>> {
        let mut conn = self.conn.clone();
        let data: Option<String> = conn
            .get(user.session_key())
            .await
            .map_err(|e| ParleyError::Session(e.to_string()))?;

        match data {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, user: UserId, session: &[ChatTurn]) -> Result<()> {
        let json = serde_json::to_string(trim_to_cap(session, self.max_turns))?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set(user.session_key(), json)
            .await
            .map_err(|e| ParleyError::Session(e.to_string()))?;
        Ok(())
    }

    async fn clear(&self, user: UserId) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(user.session_key())
            .await
            .map_err(|e| ParleyError::Session(e.to_string()))?;
        Ok(())
    }
}
