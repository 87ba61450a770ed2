//! Local stand-in for the game server, for visually testing the client.

use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use glam::Vec2;
use serde::Deserialize;

use df_core::vector::rand_int;
use df_core::{BulletState, ClientError, KinematicState, PlayerState, Snapshot};

use crate::source::{Listeners, UpdateListener, UpdateSource};

pub const MOCK_PLAYER_ID: &str = "example player id";
const SKIRMISH_RADIUS: f32 = 300.0;
const SKIRMISH_ANGULAR_STEP: f32 = 0.5;
/// Shutdown is polled at this granularity while waiting out an interval.
const SLEEP_SLICE: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MockScript {
    /// One player bouncing between (0,0) and (300,300) every interval.
    #[default]
    SineMotion,
    /// Three fixed states, the last with a bullet, then silence.
    ScriptedSequence,
    /// One player circling the origin while bullets spawn at random.
    Skirmish,
}

fn player(position: Vec2, velocity: Vec2, acceleration: Vec2, orientation: f32) -> PlayerState {
    PlayerState {
        id: MOCK_PLAYER_ID.to_string(),
        state: KinematicState {
            position,
            velocity,
            acceleration,
            orientation,
            cooldown: 0.0,
        },
    }
}

impl MockScript {
    /// Snapshot for the `tick`-th interval (zero-based), or `None` once the
    /// script has nothing more to say.
    pub fn snapshot(self, tick: u64) -> Option<Snapshot> {
        match self {
            Self::SineMotion => {
                let player = if tick % 2 == 0 {
                    player(Vec2::ZERO, Vec2::new(300.0, 300.0), Vec2::ZERO, 0.0)
                } else {
                    player(
                        Vec2::new(300.0, 300.0),
                        Vec2::new(-300.0, -300.0),
                        Vec2::ZERO,
                        0.0,
                    )
                };
                Some(Snapshot {
                    players: vec![player],
                    bullets: vec![],
                })
            }
            Self::ScriptedSequence => {
                let snapshot = match tick {
                    0 => Snapshot {
                        players: vec![player(
                            Vec2::ZERO,
                            Vec2::new(200.0, 200.0),
                            Vec2::new(0.0, -50.0),
                            0.0,
                        )],
                        bullets: vec![],
                    },
                    1 => Snapshot {
                        players: vec![player(
                            Vec2::new(100.0, 100.0),
                            Vec2::new(5.0, 5.0),
                            Vec2::ZERO,
                            PI,
                        )],
                        bullets: vec![],
                    },
                    2 => Snapshot {
                        players: vec![player(Vec2::new(100.0, 50.0), Vec2::ZERO, Vec2::ZERO, 2.0 * PI)],
                        bullets: vec![BulletState {
                            id: "example bullet id".to_string(),
                            position: Vec2::new(50.0, 50.0),
                            velocity: Vec2::new(30.0, 5.0),
                        }],
                    },
                    _ => return None,
                };
                Some(snapshot)
            }
            Self::Skirmish => {
                let angle = tick as f32 * SKIRMISH_ANGULAR_STEP;
                let (sin, cos) = angle.sin_cos();
                let position = Vec2::new(cos, sin) * SKIRMISH_RADIUS;
                // Tangent velocity that covers one angular step per second.
                let velocity = Vec2::new(-sin, cos) * SKIRMISH_RADIUS * SKIRMISH_ANGULAR_STEP;
                let bullets = (0..rand_int(1, 3))
                    .map(|_| BulletState {
                        id: uuid::Uuid::new_v4().to_string(),
                        position: position
                            + Vec2::new(rand_int(-200, 200) as f32, rand_int(-200, 200) as f32),
                        velocity: Vec2::new(rand_int(-150, 150) as f32, rand_int(-150, 150) as f32),
                    })
                    .collect();
                Some(Snapshot {
                    players: vec![player(position, velocity, Vec2::ZERO, angle + PI / 2.0)],
                    bullets,
                })
            }
        }
    }
}

/// Broadcasts `script` once per `interval` from a background thread. The first
/// snapshot goes out one interval after start.
pub struct MockServer {
    script: MockScript,
    interval: Duration,
    listeners: Listeners,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl MockServer {
    pub fn new(script: MockScript, interval: Duration) -> Self {
        Self {
            script,
            interval,
            listeners: Listeners::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn script(&self) -> MockScript {
        self.script
    }

    /// Sends `snapshot` to every listener right away.
    pub fn broadcast_update(&self, snapshot: &Snapshot) {
        self.listeners.broadcast(snapshot);
    }
}

impl UpdateSource for MockServer {
    fn add_update_listener(&mut self, listener: UpdateListener) {
        self.listeners.push(listener);
    }

    fn start_providing_updates(&mut self) -> Result<(), ClientError> {
        if self.worker.is_some() {
            log::warn!("Mock server already running");
            return Ok(());
        }
        log::info!(
            "Mock server starting: {:?} every {}ms",
            self.script,
            self.interval.as_millis()
        );

        let script = self.script;
        let interval = self.interval;
        let listeners = self.listeners.clone();
        let shutdown = Arc::clone(&self.shutdown);
        let worker = std::thread::Builder::new()
            .name("mock-server".to_string())
            .spawn(move || {
                let mut tick = 0u64;
                loop {
                    if !sleep_unless_shutdown(interval, &shutdown) {
                        return;
                    }
                    match script.snapshot(tick) {
                        Some(snapshot) => {
                            log::debug!("Mock tick {tick}");
                            listeners.broadcast(&snapshot);
                        }
                        None => {
                            log::info!("Mock script {:?} finished", script);
                            return;
                        }
                    }
                    tick += 1;
                }
            })
            .map_err(|e| ClientError::Transport(format!("failed to spawn mock server: {e}")))?;
        self.worker = Some(worker);
        Ok(())
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Sleeps for `total`, returning false early if shutdown was requested.
fn sleep_unless_shutdown(total: Duration, shutdown: &AtomicBool) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if shutdown.load(Ordering::Relaxed) {
            return false;
        }
        let slice = remaining.min(SLEEP_SLICE);
        std::thread::sleep(slice);
        remaining -= slice;
    }
    !shutdown.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    #[test]
    fn sine_motion_alternates_between_two_states() {
        let first = MockScript::SineMotion.snapshot(0).unwrap();
        let second = MockScript::SineMotion.snapshot(1).unwrap();
        let third = MockScript::SineMotion.snapshot(2).unwrap();
        assert_eq!(first.players[0].state.position, Vec2::ZERO);
        assert_eq!(second.players[0].state.position, Vec2::new(300.0, 300.0));
        assert_eq!(second.players[0].state.velocity, Vec2::new(-300.0, -300.0));
        assert_eq!(first, third);
    }

    #[test]
    fn scripted_sequence_goes_silent_after_three_states() {
        let script = MockScript::ScriptedSequence;
        let last = script.snapshot(2).unwrap();
        assert_eq!(last.bullets.len(), 1);
        assert_eq!(last.bullets[0].velocity, Vec2::new(30.0, 5.0));
        assert!((last.players[0].state.orientation - 2.0 * PI).abs() < 1e-6);
        assert!(script.snapshot(3).is_none());
        assert!(script.snapshot(100).is_none());
    }

    #[test]
    fn skirmish_snapshots_are_valid_with_unique_bullet_ids() {
        for tick in 0..20 {
            let snapshot = MockScript::Skirmish.snapshot(tick).unwrap();
            assert!(snapshot.validate().is_ok());
            assert!((1..=3).contains(&snapshot.bullets.len()));
            let distance = snapshot.players[0].state.position.length();
            assert!((distance - SKIRMISH_RADIUS).abs() < 1e-2);
        }
    }

    #[test]
    fn server_broadcasts_on_its_interval_and_stops_on_drop() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let mut server = MockServer::new(MockScript::SineMotion, Duration::from_millis(10));
        let sink = received.clone();
        server.add_update_listener(Arc::new(move |snapshot| sink.lock().unwrap().push(snapshot)));
        server.start_providing_updates().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while received.lock().unwrap().len() < 2 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        drop(server);

        let received = received.lock().unwrap();
        assert!(received.len() >= 2);
        assert_eq!(received[0].players[0].state.position, Vec2::ZERO);
        assert_eq!(received[1].players[0].state.position, Vec2::new(300.0, 300.0));
    }
}
