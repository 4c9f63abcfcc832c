//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot wire-format version, bumped on incompatible layout changes
pub const SNAPSHOT_VERSION: u32 = 1;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Movement intent for the session
    Input {
        /// Strafe axis (-1.0 = left, 1.0 = right)
        move_x: f32,
        /// Forward axis (-1.0 = backward, 1.0 = forward)
        move_z: f32,
        /// Yaw rate intent (-1.0 = full left turn, 1.0 = full right turn)
        look_x: f32,
        /// Request a jump; latched server-side until the player is grounded
        jump: bool,
    },

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },

    /// Leave the world
    Leave,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Welcome message after connection; carries the assigned session id
    Welcome {
        session_id: Uuid,
        server_time: u64,
    },

    /// A player joined the world
    PlayerJoined {
        session_id: Uuid,
    },

    /// A player left the world
    PlayerLeft {
        session_id: Uuid,
        reason: String,
    },

    /// World state snapshot (sent at regular intervals)
    Snapshot {
        /// Wire-format version
        version: u32,
        /// Server tick number
        tick: u64,
        /// All player states
        players: Vec<PlayerSnapshot>,
    },

    /// Error message
    Error {
        code: String,
        message: String,
    },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}

/// Player state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub session_id: Uuid,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Facing in degrees
    pub yaw: f32,
    /// Vertical velocity (informational; clients may extrapolate falls)
    pub vel_y: f32,
    pub grounded: bool,
}
