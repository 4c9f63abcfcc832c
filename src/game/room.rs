//! World room - authoritative simulation state and tick loop

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::util::time::{unix_millis, SIMULATION_TPS, SNAPSHOT_TPS, TICK_DURATION_MICROS};
use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::movement::MovementSystem;
use super::registry::PlayerRegistry;
use super::snapshot::SnapshotBuilder;
use super::vertical::VerticalSystem;
use super::{MoveIntent, PlayerInput, RoomCommand, WorldRules};

/// Handle to the running room
#[derive(Clone)]
pub struct RoomHandle {
    pub command_tx: mpsc::Sender<RoomCommand>,
    pub snapshot_tx: broadcast::Sender<ServerMsg>,
    pub player_count: Arc<AtomicUsize>,
}

impl RoomHandle {
    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }
}

/// Simulation state owned by the room task
pub struct RoomState {
    pub rules: WorldRules,
    pub tick: u64,
    pub registry: PlayerRegistry,
}

impl RoomState {
    pub fn new(rules: WorldRules) -> Self {
        Self {
            rules,
            tick: 0,
            registry: PlayerRegistry::new(),
        }
    }

    /// Stage an input intent for a session.
    ///
    /// Overwrites the staged axes unconditionally and ORs the jump flag into
    /// the latch; never touches position. A message for a session that
    /// already left is silently dropped.
    pub fn apply_input(&mut self, session_id: Uuid, intent: MoveIntent, jump: bool) {
        let Some(player) = self.registry.get_mut(&session_id) else {
            debug!(session_id = %session_id, "input for unknown session, dropping");
            return;
        };

        player.intent = intent;
        if jump {
            player.jump_requested = true;
        }
    }

    /// Advance the world by one tick.
    ///
    /// For every live player: movement solver, then boundary clamp, then
    /// vertical resolution, in that fixed order.
    pub fn step(&mut self, dt: f32) {
        self.tick += 1;

        let rules = self.rules;
        for player in self.registry.iter_mut() {
            MovementSystem::step(player, &rules, dt);
            MovementSystem::clamp_to_world(player, &rules);
            VerticalSystem::step(player, &rules, dt);
        }
    }
}

/// The authoritative world room
pub struct WorldRoom {
    state: RoomState,
    command_rx: mpsc::Receiver<RoomCommand>,
    snapshot_tx: broadcast::Sender<ServerMsg>,
    snapshot_builder: SnapshotBuilder,
    player_count: Arc<AtomicUsize>,
}

impl WorldRoom {
    /// Create the room and its handle
    pub fn new(rules: WorldRules) -> (Self, RoomHandle) {
        let (command_tx, command_rx) = mpsc::channel(256);
        let (snapshot_tx, _) = broadcast::channel(64);
        let player_count = Arc::new(AtomicUsize::new(0));

        let handle = RoomHandle {
            command_tx,
            snapshot_tx: snapshot_tx.clone(),
            player_count: player_count.clone(),
        };

        let snapshot_interval = SIMULATION_TPS / SNAPSHOT_TPS;
        let room = Self {
            state: RoomState::new(rules),
            command_rx,
            snapshot_tx,
            snapshot_builder: SnapshotBuilder::new(snapshot_interval),
            player_count,
        };

        (room, handle)
    }

    /// Run the authoritative tick loop.
    ///
    /// The room lives for the process lifetime: it keeps ticking with zero
    /// players so a joining client always lands in a live simulation.
    pub async fn run(mut self) {
        info!(tps = SIMULATION_TPS, "World room started");

        let tick_duration = Duration::from_micros(TICK_DURATION_MICROS);
        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last_tick = Instant::now();

        loop {
            tick_interval.tick().await;

            // Joins, leaves and inputs land between ticks; the tick below is
            // the sole mutator of position and velocity.
            self.process_commands();

            let now = Instant::now();
            let dt = now.duration_since(last_tick).as_millis() as f32 / 1000.0;
            last_tick = now;

            self.state.step(dt);

            if self.snapshot_builder.should_send() {
                let snapshot = self
                    .snapshot_builder
                    .build(self.state.tick, &self.state.registry);
                let _ = self.snapshot_tx.send(snapshot);
            }
        }
    }

    /// Drain all pending commands from the transport
    fn process_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            match command {
                RoomCommand::Join { session_id } => self.handle_join(session_id),
                RoomCommand::Leave { session_id } => self.handle_leave(session_id),
                RoomCommand::Client(input) => self.handle_client(input),
            }
        }
    }

    fn handle_join(&mut self, session_id: Uuid) {
        match self
            .state
            .registry
            .join(session_id, &self.state.rules, unix_millis())
        {
            Ok(_) => {
                self.player_count
                    .store(self.state.registry.len(), Ordering::Relaxed);

                let _ = self.snapshot_tx.send(ServerMsg::PlayerJoined { session_id });

                info!(
                    session_id = %session_id,
                    player_count = self.state.registry.len(),
                    "Player joined world"
                );
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Rejected join");
                let _ = self.snapshot_tx.send(ServerMsg::Error {
                    code: "duplicate_join".to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    fn handle_leave(&mut self, session_id: Uuid) {
        if let Some(player) = self.state.registry.leave(session_id) {
            self.player_count
                .store(self.state.registry.len(), Ordering::Relaxed);

            let _ = self.snapshot_tx.send(ServerMsg::PlayerLeft {
                session_id,
                reason: "disconnected".to_string(),
            });

            info!(
                session_id = %session_id,
                player_count = self.state.registry.len(),
                in_world_ms = unix_millis().saturating_sub(player.joined_at),
                "Player left world"
            );
        }
    }

    fn handle_client(&mut self, input: PlayerInput) {
        match input.msg {
            ClientMsg::Input {
                move_x,
                move_z,
                look_x,
                jump,
            } => {
                self.state.apply_input(
                    input.session_id,
                    MoveIntent {
                        move_x,
                        move_z,
                        look_x,
                    },
                    jump,
                );
            }
            ClientMsg::Ping { t } => {
                let _ = self.snapshot_tx.send(ServerMsg::Pong { t });
            }
            ClientMsg::Leave => {
                self.handle_leave(input.session_id);
            }
        }
    }
}


#[cfg(test)]
mod task_tests {
    //! End-to-end tests driving a live room task over its channels,
    //! under tokio's paused clock so ticks advance deterministically.

    use super::*;
    use crate::ws::protocol::PlayerSnapshot;
    use tokio::time::timeout;

    async fn recv_matching<F>(rx: &mut broadcast::Receiver<ServerMsg>, pred: F) -> ServerMsg
    where
        F: Fn(&ServerMsg) -> bool,
    {
        loop {
            let msg = timeout(Duration::from_secs(10), rx.recv())
                .await
                .expect("timed out waiting for room broadcast")
                .expect("room broadcast channel closed");
            if pred(&msg) {
                return msg;
            }
        }
    }

    async fn next_snapshot_of(
        rx: &mut broadcast::Receiver<ServerMsg>,
        session_id: Uuid,
    ) -> PlayerSnapshot {
        loop {
            let msg = recv_matching(rx, |m| matches!(m, ServerMsg::Snapshot { .. })).await;
            if let ServerMsg::Snapshot { players, .. } = msg {
                if let Some(p) = players.into_iter().find(|p| p.session_id == session_id) {
                    return p;
                }
            }
        }
    }

    fn client_input(session_id: Uuid, msg: ClientMsg) -> RoomCommand {
        RoomCommand::Client(PlayerInput {
            session_id,
            msg,
            received_at: 0,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn join_move_and_leave_over_channels() {
        let (room, handle) = WorldRoom::new(WorldRules::default());
        tokio::spawn(room.run());

        let mut rx = handle.snapshot_tx.subscribe();
        let id = Uuid::new_v4();

        handle
            .command_tx
            .send(RoomCommand::Join { session_id: id })
            .await
            .unwrap();
        recv_matching(&mut rx, |m| {
            matches!(m, ServerMsg::PlayerJoined { session_id } if *session_id == id)
        })
        .await;
        assert_eq!(handle.player_count(), 1);

        handle
            .command_tx
            .send(client_input(
                id,
                ClientMsg::Input {
                    move_x: 0.0,
                    move_z: 1.0,
                    look_x: 0.0,
                    jump: false,
                },
            ))
            .await
            .unwrap();

        let first = next_snapshot_of(&mut rx, id).await;
        let mut last = first.clone();
        for _ in 0..90 {
            last = next_snapshot_of(&mut rx, id).await;
        }

        // Forward input at yaw 0 walks along +z; spawn height falls to the floor.
        assert!(last.z > first.z);
        assert!((last.x - 64.0).abs() < 1e-2);
        assert_eq!(last.y, 16.0);
        assert!(last.grounded);

        handle
            .command_tx
            .send(RoomCommand::Leave { session_id: id })
            .await
            .unwrap();
        recv_matching(&mut rx, |m| {
            matches!(m, ServerMsg::PlayerLeft { session_id, .. } if *session_id == id)
        })
        .await;

        let msg = recv_matching(&mut rx, |m| matches!(m, ServerMsg::Snapshot { .. })).await;
        if let ServerMsg::Snapshot { players, .. } = msg {
            assert!(players.iter().all(|p| p.session_id != id));
        }
        assert_eq!(handle.player_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_join_is_surfaced_as_error() {
        let (room, handle) = WorldRoom::new(WorldRules::default());
        tokio::spawn(room.run());

        let mut rx = handle.snapshot_tx.subscribe();
        let id = Uuid::new_v4();

        for _ in 0..2 {
            handle
                .command_tx
                .send(RoomCommand::Join { session_id: id })
                .await
                .unwrap();
        }

        let msg = recv_matching(&mut rx, |m| matches!(m, ServerMsg::Error { .. })).await;
        if let ServerMsg::Error { code, .. } = msg {
            assert_eq!(code, "duplicate_join");
        }
        assert_eq!(handle.player_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ping_round_trips_through_the_room() {
        let (room, handle) = WorldRoom::new(WorldRules::default());
        tokio::spawn(room.run());

        let mut rx = handle.snapshot_tx.subscribe();
        let id = Uuid::new_v4();

        handle
            .command_tx
            .send(client_input(id, ClientMsg::Ping { t: 42 }))
            .await
            .unwrap();

        let msg = recv_matching(&mut rx, |m| matches!(m, ServerMsg::Pong { .. })).await;
        if let ServerMsg::Pong { t } = msg {
            assert_eq!(t, 42);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn room_keeps_ticking_with_zero_players() {
        let (room, handle) = WorldRoom::new(WorldRules::default());
        tokio::spawn(room.run());

        let mut rx = handle.snapshot_tx.subscribe();
        let msg = recv_matching(&mut rx, |m| matches!(m, ServerMsg::Snapshot { .. })).await;
        if let ServerMsg::Snapshot { version, players, .. } = msg {
            assert_eq!(version, crate::ws::protocol::SNAPSHOT_VERSION);
            assert!(players.is_empty());
        }
    }
}
