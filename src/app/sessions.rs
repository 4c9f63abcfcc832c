//! Transport-side registry of live WebSocket sessions

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::util::time::unix_millis;

/// Connection metadata for one session
#[derive(Debug, Clone, Copy)]
pub struct SessionInfo {
    pub connected_at: u64,
}

/// Registry of connected sessions, maintained by the WebSocket handlers.
///
/// This tracks connections, not world membership: a session appears here
/// from accept to close, while its entity exists only between the room's
/// Join and Leave. The health endpoint reports both counts.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, SessionInfo>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn connect(&self, session_id: Uuid) {
        self.sessions.insert(
            session_id,
            SessionInfo {
                connected_at: unix_millis(),
            },
        );
    }

    pub fn disconnect(&self, session_id: Uuid) {
        if let Some((_, info)) = self.sessions.remove(&session_id) {
            debug!(
                session_id = %session_id,
                connected_ms = unix_millis().saturating_sub(info.connected_at),
                "Session closed"
            );
        }
    }

    pub fn connected(&self) -> usize {
        self.sessions.len()
    }
}
