//! The game loop: pull the latest snapshot, reconcile entities, integrate,
//! move the camera, draw.
//!
//! The host calls `frame` on every display refresh. Most calls return without
//! doing anything; once the frame budget has elapsed a full step runs and the
//! canvas is redrawn. The canvas is retained between steps so the host can
//! present it on every refresh.

use std::collections::HashMap;
use std::time::Instant;

use glam::Vec2;

use df_core::input::{InputState, Key};
use df_core::time::FramePacer;
use df_core::vector::ORIGIN;
use df_core::{ClientError, Snapshot};
use df_devtools::DebugMenu;
use df_net::UpdateChannel;
use df_render::{
    Camera, CameraMode, CameraSettings, Color, DisplayList, DrawSurface, GridBackground,
    SceneObject,
};

use crate::assets::GameAssets;
use crate::config::{ClientConfig, EvictionConfig, SnapshotBlend};
use crate::entity::{Agent, Bullet, Entity, EntityKind};

type EntityKey = (EntityKind, String);

struct Tracked {
    id: String,
    entity: Entity,
    /// Simulated seconds since this id last appeared in a snapshot.
    unseen_secs: f32,
}

pub struct GameWorld {
    channel: UpdateChannel,
    is_requesting_updates: bool,
    requested_at: Option<Instant>,
    last_snapshot_at: Option<Instant>,
    stale_warned: bool,
    stale_after_secs: f32,

    pacer: FramePacer,
    input: InputState,

    /// Draw order is insertion order.
    scene: Vec<Tracked>,
    index: HashMap<EntityKey, usize>,
    follow_target: Option<String>,

    camera: Camera,
    background: GridBackground,
    canvas: DisplayList,
    debug_menu: DebugMenu<GameWorld>,
    shake_hint_added: bool,

    debug_mode: bool,
    blend: SnapshotBlend,
    eviction: EvictionConfig,
    assets: GameAssets,
}

impl GameWorld {
    pub fn new(
        config: &ClientConfig,
        channel: UpdateChannel,
        assets: GameAssets,
        resolution: Vec2,
    ) -> Result<Self, ClientError> {
        let background_color = config.background().map_err(ClientError::Config)?;
        let camera_settings = CameraSettings {
            debug_controls: config.camera.debug_controls && config.debug_mode,
            ..config.camera.clone()
        };
        let background = GridBackground::new(camera_settings.grid_cell, background_color);
        let camera = Camera::new(camera_settings, resolution, ORIGIN);

        let mut pacer = FramePacer::new(config.fps);
        pacer.max_step = config.max_frame_secs.map(f64::from);

        let mut debug_menu = DebugMenu::new();
        debug_menu.push_line(|w: &GameWorld| format!("Camera Mode: {}", w.camera.mode().label()));
        debug_menu.push_line(|_: &GameWorld| "Spacebar to toggle camera mode".to_string());
        debug_menu.push_line(|_: &GameWorld| {
            "Scroll to zoom, arrow keys to pan camera in debug mode".to_string()
        });
        debug_menu.push_line(|w: &GameWorld| format!("FPS: {:.1}", w.pacer.smoothed_fps));
        debug_menu.push_line(|w: &GameWorld| {
            let stats = w.channel.stats();
            format!(
                "Snapshots: {} accepted, {} superseded, {} rejected",
                stats.accepted, stats.superseded, stats.rejected
            )
        });

        log::info!(
            "Game world ready: {} fps, camera {}",
            config.fps,
            camera.mode().label()
        );

        Ok(Self {
            channel,
            is_requesting_updates: false,
            requested_at: None,
            last_snapshot_at: None,
            stale_warned: false,
            stale_after_secs: config.stale_source_warning_secs,
            pacer,
            input: InputState::new(),
            scene: Vec::new(),
            index: HashMap::new(),
            follow_target: None,
            camera,
            background,
            canvas: DisplayList::new(resolution),
            debug_menu,
            shake_hint_added: false,
            debug_mode: config.debug_mode,
            blend: config.snapshot_blend,
            eviction: config.eviction.clone(),
            assets,
        })
    }

    /// Called on every display refresh. Returns true if a step ran and the
    /// canvas changed.
    pub fn frame(&mut self, now: Instant) -> bool {
        if !self.is_requesting_updates {
            self.is_requesting_updates = true;
            self.requested_at = Some(now);
            if let Err(e) = self.channel.begin_requesting_updates() {
                log::error!("Update source failed to start: {e}");
            }
        }

        match self.pacer.begin_frame(now) {
            Some(elapsed) => {
                self.step(elapsed as f32, now);
                true
            }
            None => false,
        }
    }

    /// One simulated frame of `dt` seconds.
    pub fn step(&mut self, dt: f32, now: Instant) {
        let mut canvas = std::mem::take(&mut self.canvas);
        canvas.clear();

        if self.channel.has_update() {
            let snapshot = self.channel.get_update();
            self.apply_snapshot(&snapshot);
            self.last_snapshot_at = Some(now);
            self.stale_warned = false;
        }

        for tracked in &mut self.scene {
            tracked.entity.update(dt);
            tracked.unseen_secs += dt;
        }
        self.evict_stale_entities();
        self.check_stalled_source(now);

        let target = self.follow_target_position();
        self.camera.update(dt, target, &self.input);
        self.camera.render_all(
            &mut canvas,
            &self.background,
            self.scene.iter().map(|t| &t.entity),
        );
        if self.debug_mode {
            self.debug_menu.display(self, &mut canvas);
        }

        self.canvas = canvas;
    }

    fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        log::debug!(
            "Applying snapshot: {} players, {} bullets",
            snapshot.players.len(),
            snapshot.bullets.len()
        );

        for player in &snapshot.players {
            let key = (EntityKind::Player, player.id.clone());
            let slot = match self.index.get(&key) {
                Some(&slot) => slot,
                None => {
                    let agent = Agent::new(player.state, self.assets.player_sprite, self.blend);
                    let slot = self.insert(key, Entity::Agent(agent));
                    self.on_new_player(&player.id);
                    slot
                }
            };
            let tracked = &mut self.scene[slot];
            tracked.unseen_secs = 0.0;
            if let Entity::Agent(agent) = &mut tracked.entity {
                agent.apply_snapshot(&player.state);
            }
        }

        for bullet in &snapshot.bullets {
            let key = (EntityKind::Bullet, bullet.id.clone());
            let slot = match self.index.get(&key) {
                Some(&slot) => slot,
                None => self.insert(key, Entity::Bullet(Bullet::new(bullet))),
            };
            let tracked = &mut self.scene[slot];
            tracked.unseen_secs = 0.0;
            if let Entity::Bullet(b) = &mut tracked.entity {
                b.apply_snapshot(bullet);
            }
        }
    }

    fn insert(&mut self, key: EntityKey, entity: Entity) -> usize {
        let slot = self.scene.len();
        self.scene.push(Tracked {
            id: key.1.clone(),
            entity,
            unseen_secs: 0.0,
        });
        self.index.insert(key, slot);
        slot
    }

    fn on_new_player(&mut self, id: &str) {
        log::info!("New player '{}'", id);
        self.follow_target = Some(id.to_string());

        if !self.debug_mode {
            return;
        }
        let id = id.to_string();
        self.debug_menu.push_line(move |w: &GameWorld| match w.player_position(&id) {
            Some(p) => format!(
                "Player ID: \"{}\", Position: ({}, {})",
                id,
                round_half_up(p.x),
                round_half_up(p.y)
            ),
            None => format!("Player ID: \"{}\", Position: (gone)", id),
        });
        if !self.shake_hint_added {
            self.shake_hint_added = true;
            self.debug_menu
                .push_line(|_: &GameWorld| "Press \"s\" to simulate camera shake.".to_string());
        }
    }

    fn evict_stale_entities(&mut self) {
        let bullet_ttl = self.eviction.bullet_ttl_secs;
        let player_ttl = self.eviction.player_ttl_secs;
        let expired = |t: &Tracked| {
            let ttl = match t.entity.kind() {
                EntityKind::Player => player_ttl,
                EntityKind::Bullet => bullet_ttl,
            };
            matches!(ttl, Some(ttl) if t.unseen_secs > ttl)
        };
        if !self.scene.iter().any(expired) {
            return;
        }

        self.scene.retain(|t| {
            let keep = !expired(t);
            if !keep {
                log::debug!("Evicting {:?} '{}'", t.entity.kind(), t.id);
            }
            keep
        });
        self.index = self
            .scene
            .iter()
            .enumerate()
            .map(|(slot, t)| ((t.entity.kind(), t.id.clone()), slot))
            .collect();

        if let Some(id) = &self.follow_target {
            if !self.index.contains_key(&(EntityKind::Player, id.clone())) {
                log::info!("Followed player '{}' evicted, following origin", id);
                self.follow_target = None;
            }
        }
    }

    fn check_stalled_source(&mut self, now: Instant) {
        if self.stale_warned || self.stale_after_secs <= 0.0 {
            return;
        }
        let Some(since) = self.last_snapshot_at.or(self.requested_at) else {
            return;
        };
        let quiet = now.saturating_duration_since(since).as_secs_f32();
        if quiet > self.stale_after_secs {
            log::warn!(
                "No snapshot for {:.1}s, keeping last known state",
                quiet
            );
            self.stale_warned = true;
        }
    }

    fn follow_target_position(&self) -> Vec2 {
        self.follow_target
            .as_deref()
            .and_then(|id| self.player_position(id))
            .unwrap_or(ORIGIN)
    }

    pub fn player_position(&self, id: &str) -> Option<Vec2> {
        self.entity(EntityKind::Player, id).map(|e| e.position())
    }

    pub fn entity(&self, kind: EntityKind, id: &str) -> Option<&Entity> {
        self.index
            .get(&(kind, id.to_string()))
            .map(|&slot| &self.scene[slot].entity)
    }

    pub fn entity_count(&self) -> usize {
        self.scene.len()
    }

    pub fn follow_target(&self) -> Option<&str> {
        self.follow_target.as_deref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn canvas(&self) -> &DisplayList {
        &self.canvas
    }

    pub fn channel(&self) -> &UpdateChannel {
        &self.channel
    }

    pub fn background_color(&self) -> Color {
        self.background.fill
    }

    pub fn is_stale(&self) -> bool {
        self.stale_warned
    }

    pub fn debug_lines(&self) -> Vec<String> {
        self.debug_menu.evaluate(self)
    }

    pub fn key_down(&mut self, key: Key) {
        if !self.input.key_down(key) {
            return;
        }
        self.channel.forward_keys(&self.input.held_keys_wire());

        if !self.debug_mode {
            return;
        }
        match key {
            Key::Space => {
                self.camera.toggle_mode();
            }
            Key::S => self.camera.start_shake(),
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.input.key_up(key) {
            self.channel.forward_keys(&self.input.held_keys_wire());
        }
    }

    /// Drops every held key, e.g. when the window loses focus.
    pub fn release_all_keys(&mut self) {
        if self.input.held_keys().is_empty() {
            return;
        }
        self.input.clear();
        self.channel.forward_keys("");
    }

    /// `delta_y` follows the DOM wheel convention: positive scrolls down.
    pub fn wheel(&mut self, delta_y: f32) {
        self.camera.apply_wheel(delta_y);
    }

    pub fn resize(&mut self, resolution: Vec2) {
        self.camera.set_resolution(resolution);
        self.canvas.resize(resolution);
    }

    pub fn camera_mode(&self) -> CameraMode {
        self.camera.mode()
    }
}

/// Rounds halves toward positive infinity.
fn round_half_up(v: f32) -> i64 {
    (v + 0.5).floor() as i64
}
