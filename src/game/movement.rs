//! Horizontal movement - yaw-relative displacement and world bounds

use super::registry::PlayerState;
use super::WorldRules;

/// Movement system: converts staged input into world-space displacement
pub struct MovementSystem;

impl MovementSystem {
    /// Advance one player's yaw and horizontal position by one tick.
    ///
    /// Yaw integrates before translation, so a turn and a move issued in the
    /// same tick travel along the new heading.
    pub fn step(player: &mut PlayerState, rules: &WorldRules, dt: f32) {
        player.yaw += player.intent.look_x * rules.yaw_rate * dt;

        let (nx, nz) = Self::normalize_input(player.intent.move_x, player.intent.move_z);
        if nx == 0.0 && nz == 0.0 {
            return;
        }

        let yaw_rad = player.yaw.to_radians();
        let (forward_x, forward_z) = (yaw_rad.sin(), yaw_rad.cos());
        let (right_x, right_z) = (yaw_rad.cos(), -yaw_rad.sin());

        // move_z maps to forward/backward, move_x to strafe
        let world_x = forward_x * nz + right_x * nx;
        let world_z = forward_z * nz + right_z * nx;

        player.x += world_x * rules.speed * dt;
        player.z += world_z * rules.speed * dt;
    }

    /// Normalize the horizontal input vector so diagonal input cannot exceed
    /// unit-speed input. Zero input stays zero.
    pub fn normalize_input(move_x: f32, move_z: f32) -> (f32, f32) {
        let magnitude = (move_x * move_x + move_z * move_z).sqrt();
        if magnitude > 0.0 {
            (move_x / magnitude, move_z / magnitude)
        } else {
            (0.0, 0.0)
        }
    }

    /// Clamp horizontal position into the world extent.
    ///
    /// Runs after the solver and before vertical resolution, so horizontal
    /// clamping never affects vertical state.
    pub fn clamp_to_world(player: &mut PlayerState, rules: &WorldRules) {
        player.x = player.x.clamp(0.0, rules.world_size - 1.0);
        player.z = player.z.clamp(0.0, rules.world_size - 1.0);
    }
}
