//! Snapshot export - the post-tick state readable by the broadcast side

use crate::ws::protocol::{PlayerSnapshot, ServerMsg, SNAPSHOT_VERSION};

use super::registry::PlayerRegistry;

/// Builds snapshots for network transmission.
///
/// The simulation ticks at SIMULATION_TPS while snapshots go out at
/// SNAPSHOT_TPS; this tracks the decimation counter.
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Build a snapshot message from the post-tick registry state
    pub fn build(&self, tick: u64, registry: &PlayerRegistry) -> ServerMsg {
        let players: Vec<PlayerSnapshot> = registry
            .iter()
            .map(|p| PlayerSnapshot {
                session_id: p.session_id,
                x: p.x,
                y: p.y,
                z: p.z,
                yaw: p.yaw,
                vel_y: p.vel_y,
                grounded: p.grounded,
            })
            .collect();

        ServerMsg::Snapshot {
            version: SNAPSHOT_VERSION,
            tick,
            players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::WorldRules;
    use uuid::Uuid;

    #[test]
    fn snapshot_carries_version_and_all_players() {
        let rules = WorldRules::default();
        let mut registry = PlayerRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        registry.join(a, &rules, 0).unwrap();
        registry.join(b, &rules, 0).unwrap();

        let builder = SnapshotBuilder::new(1);
        let msg = builder.build(7, &registry);

        match msg {
            ServerMsg::Snapshot {
                version,
                tick,
                players,
            } => {
                assert_eq!(version, SNAPSHOT_VERSION);
                assert_eq!(tick, 7);
                assert_eq!(players.len(), 2);
                assert!(players.iter().any(|p| p.session_id == a));
                assert!(players.iter().any(|p| p.session_id == b));
            }
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[test]
    fn interval_decimates_sends() {
        let mut builder = SnapshotBuilder::new(3);
        let sent: Vec<bool> = (0..6).map(|_| builder.should_send()).collect();
        assert_eq!(sent, vec![false, false, true, false, false, true]);
    }
}
