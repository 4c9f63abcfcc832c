//! Game simulation modules

pub mod movement;
pub mod registry;
pub mod room;
pub mod snapshot;
pub mod vertical;

pub use registry::{PlayerRegistry, PlayerState, RegistryError};
pub use room::{RoomHandle, WorldRoom};

use uuid::Uuid;

use crate::ws::protocol::ClientMsg;

/// World constants governing the simulation.
///
/// Held by the room state and passed explicitly to every operation that
/// needs them; nothing in the core reads ambient statics.
#[derive(Debug, Clone, Copy)]
pub struct WorldRules {
    /// World extent along x and z; positions are clamped to [0, world_size - 1]
    pub world_size: f32,
    /// Height of the global floor plane
    pub floor_y: f32,
    /// Horizontal movement speed in units per second
    pub speed: f32,
    /// Yaw turn rate in degrees per second
    pub yaw_rate: f32,
    /// Downward acceleration in units per second squared
    pub gravity: f32,
    /// Upward velocity applied when a jump is consumed
    pub jump_impulse: f32,
    /// Spawn position for newly joined players
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub spawn_z: f32,
}

impl Default for WorldRules {
    fn default() -> Self {
        Self {
            world_size: 128.0,
            floor_y: 16.0,
            speed: 5.0,
            yaw_rate: 180.0,
            gravity: 20.0,
            jump_impulse: 6.0,
            spawn_x: 64.0,
            spawn_y: 20.0,
            spawn_z: 64.0,
        }
    }
}

/// Staged horizontal intent for a single player.
///
/// Overwritten wholesale by each input message; consumed every tick by the
/// movement solver without being cleared (a held key keeps moving the player).
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveIntent {
    /// Strafe axis, nominally in [-1, 1]
    pub move_x: f32,
    /// Forward/backward axis, nominally in [-1, 1]
    pub move_z: f32,
    /// Yaw rate intent, nominally in [-1, 1]
    pub look_x: f32,
}

/// Client message received from a WebSocket session
#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub session_id: Uuid,
    pub msg: ClientMsg,
    pub received_at: u64,
}

/// Commands delivered to the room task.
///
/// Join and Leave originate from the transport's connection lifecycle;
/// Client wraps parsed messages from a live session.
#[derive(Debug, Clone)]
pub enum RoomCommand {
    Join { session_id: Uuid },
    Leave { session_id: Uuid },
    Client(PlayerInput),
}
