//! Vertical kinematics - gravity, jump impulse, ground contact

use super::registry::PlayerState;
use super::WorldRules;

/// Vertical system: two-state machine per player (grounded / airborne)
pub struct VerticalSystem;

impl VerticalSystem {
    /// Resolve one player's vertical axis for one tick.
    ///
    /// Jump consumption takes priority over gravity: the impulse tick
    /// integrates position without the gravity subtraction, so the ground
    /// test below sees the lift-off instead of immediately re-grounding.
    pub fn step(player: &mut PlayerState, rules: &WorldRules, dt: f32) {
        if player.jump_requested && player.grounded {
            player.vel_y = rules.jump_impulse;
            player.grounded = false;
            player.jump_requested = false;
            player.y += player.vel_y * dt;
        } else if !player.grounded {
            player.vel_y -= rules.gravity * dt;
            player.y += player.vel_y * dt;
        }

        if player.y <= rules.floor_y {
            player.y = rules.floor_y;
            player.vel_y = 0.0;
            player.grounded = true;
        } else {
            player.grounded = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const DT: f32 = 1.0 / 30.0;
    const EPS: f32 = 1e-4;

    fn player() -> PlayerState {
        PlayerState::spawn(Uuid::new_v4(), &WorldRules::default(), 0)
    }

    fn settle(p: &mut PlayerState, rules: &WorldRules) {
        for _ in 0..200 {
            VerticalSystem::step(p, rules, DT);
            if p.grounded {
                return;
            }
        }
        panic!("player never reached the floor");
    }

    #[test]
    fn spawned_player_falls_to_floor() {
        let rules = WorldRules::default();
        let mut p = player();

        VerticalSystem::step(&mut p, &rules, DT);
        assert!(p.vel_y < 0.0);
        assert!(p.y < 20.0);

        settle(&mut p, &rules);
        assert_eq!(p.y, rules.floor_y);
        assert_eq!(p.vel_y, 0.0);
        assert!(p.grounded);
    }

    #[test]
    fn grounded_idle_accumulates_nothing() {
        let rules = WorldRules::default();
        let mut p = player();
        settle(&mut p, &rules);

        for _ in 0..50 {
            VerticalSystem::step(&mut p, &rules, DT);
        }
        assert_eq!(p.y, rules.floor_y);
        assert_eq!(p.vel_y, 0.0);
        assert!(p.grounded);
    }

    #[test]
    fn jump_impulse_tick_skips_gravity() {
        let rules = WorldRules::default();
        let mut p = player();
        settle(&mut p, &rules);

        p.jump_requested = true;
        VerticalSystem::step(&mut p, &rules, DT);

        assert!(!p.jump_requested);
        assert!(!p.grounded);
        assert!((p.vel_y - rules.jump_impulse).abs() < EPS);
        assert!((p.y - (rules.floor_y + rules.jump_impulse * DT)).abs() < EPS);
    }

    #[test]
    fn jump_arc_returns_to_floor() {
        let rules = WorldRules::default();
        let mut p = player();
        settle(&mut p, &rules);

        p.jump_requested = true;
        VerticalSystem::step(&mut p, &rules, DT);

        let mut max_y = p.y;
        for _ in 0..200 {
            VerticalSystem::step(&mut p, &rules, DT);
            max_y = max_y.max(p.y);
            if p.grounded {
                break;
            }
        }

        // Ballistic apex near floor_y + v0^2 / 2g = 16 + 36/40 = 16.9
        assert!(max_y > rules.floor_y + 0.5);
        assert!(max_y < rules.floor_y + 1.2);
        assert!(p.grounded);
        assert_eq!(p.y, rules.floor_y);
        assert_eq!(p.vel_y, 0.0);
    }

    #[test]
    fn airborne_jump_request_stays_latched_until_landing() {
        let rules = WorldRules::default();
        let mut p = player();

        // Still falling from spawn; latch a jump mid-air.
        VerticalSystem::step(&mut p, &rules, DT);
        assert!(!p.grounded);
        p.jump_requested = true;

        let vel_before = p.vel_y;
        VerticalSystem::step(&mut p, &rules, DT);
        // No impulse while airborne: only gravity acted.
        assert!((p.vel_y - (vel_before - rules.gravity * DT)).abs() < EPS);
        assert!(p.jump_requested);

        // Land, then the very next tick consumes the latch.
        settle(&mut p, &rules);
        assert!(p.jump_requested);
        VerticalSystem::step(&mut p, &rules, DT);
        assert!(!p.jump_requested);
        assert!((p.vel_y - rules.jump_impulse).abs() < EPS);
        assert!(!p.grounded);
    }

    #[test]
    fn floor_invariant_holds_every_tick() {
        let rules = WorldRules::default();
        let mut p = player();
        p.jump_requested = true;

        for _ in 0..300 {
            VerticalSystem::step(&mut p, &rules, DT);
            assert!(p.y >= rules.floor_y);
            assert_eq!(p.grounded, p.y == rules.floor_y);
        }
    }
}
