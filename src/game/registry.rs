//! Entity registry - maps session identifiers to authoritative player state

use std::collections::HashMap;

use uuid::Uuid;

use super::{MoveIntent, WorldRules};

/// Authoritative movement state for one connected session
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub session_id: Uuid,

    // Position and facing
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Rotation about the vertical axis, in degrees. Unbounded; wraps
    /// implicitly through trigonometric use.
    pub yaw: f32,

    // Vertical kinematics
    pub vel_y: f32,
    pub grounded: bool,

    // Staged input
    pub intent: MoveIntent,
    /// Latched jump request; persists across ticks until consumed by a tick
    /// where the player is grounded.
    pub jump_requested: bool,

    pub joined_at: u64,
}

impl PlayerState {
    /// Create a player at the world spawn point
    pub fn spawn(session_id: Uuid, rules: &WorldRules, joined_at: u64) -> Self {
        Self {
            session_id,
            x: rules.spawn_x,
            y: rules.spawn_y,
            z: rules.spawn_z,
            yaw: 0.0,
            vel_y: 0.0,
            grounded: false,
            intent: MoveIntent::default(),
            jump_requested: false,
            joined_at,
        }
    }
}

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Duplicate join is a contract violation by the transport, which is
    /// expected to guarantee unique session lifetimes.
    #[error("session {0} already joined")]
    AlreadyJoined(Uuid),
}

/// Registry of all live players, owned by the room task.
///
/// Membership changes (join/leave) and per-field mutation both go through
/// the room task, so iteration during a tick never observes a torn entity.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<Uuid, PlayerState>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self {
            players: HashMap::new(),
        }
    }

    /// Insert a new player at the spawn point.
    ///
    /// Fails fast if the session is already present.
    pub fn join(
        &mut self,
        session_id: Uuid,
        rules: &WorldRules,
        joined_at: u64,
    ) -> Result<&PlayerState, RegistryError> {
        if self.players.contains_key(&session_id) {
            return Err(RegistryError::AlreadyJoined(session_id));
        }
        let player = PlayerState::spawn(session_id, rules, joined_at);
        Ok(self.players.entry(session_id).or_insert(player))
    }

    /// Remove a player. A leave may race a late message, so removing an
    /// absent session is a no-op, not an error.
    pub fn leave(&mut self, session_id: Uuid) -> Option<PlayerState> {
        self.players.remove(&session_id)
    }

    pub fn get(&self, session_id: &Uuid) -> Option<&PlayerState> {
        self.players.get(session_id)
    }

    pub fn get_mut(&mut self, session_id: &Uuid) -> Option<&mut PlayerState> {
        self.players.get_mut(session_id)
    }

    /// Visit every live player exactly once (tick iteration)
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlayerState> {
        self.players.values_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
