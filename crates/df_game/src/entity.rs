//! Networked entities: agents (planes) and bullets.
//!
//! Both integrate with explicit Euler between snapshots and take a snapshot's
//! state unconditionally when one arrives. With `SnapshotBlend::Lerp` an agent
//! additionally remembers where it was drawn before the snapshot and eases the
//! drawn position from there over a fixed duration of simulated time.

use glam::Vec2;

use df_core::vector::{add_vectors, multiply_vectors, subtract_vectors};
use df_core::{BulletState, KinematicState};
use df_render::{Color, DrawSurface, ImageId, SceneObject};

use crate::config::SnapshotBlend;

pub const AGENT_SIZE: Vec2 = Vec2::new(100.0, 150.0);
pub const BULLET_RADIUS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Bullet,
}

#[derive(Debug, Clone)]
pub struct Agent {
    state: KinematicState,
    size: Vec2,
    sprite: ImageId,
    blend: SnapshotBlend,
    /// Drawn minus simulated position right after the last snapshot.
    blend_offset: Vec2,
    blend_remaining: f32,
}

impl Agent {
    pub fn new(state: KinematicState, sprite: ImageId, blend: SnapshotBlend) -> Self {
        Self {
            state,
            size: AGENT_SIZE,
            sprite,
            blend,
            blend_offset: Vec2::ZERO,
            blend_remaining: 0.0,
        }
    }

    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    pub fn orientation(&self) -> f32 {
        self.state.orientation
    }

    /// Overwrites the whole kinematic state.
    pub fn apply_snapshot(&mut self, state: &KinematicState) {
        if let SnapshotBlend::Lerp { duration_secs } = self.blend {
            self.blend_offset = subtract_vectors(self.drawn_position(), state.position);
            self.blend_remaining = duration_secs;
        }
        self.state = *state;
    }

    /// Where the agent is drawn: the simulated position plus whatever is left
    /// of the blend offset.
    pub fn drawn_position(&self) -> Vec2 {
        match self.blend {
            SnapshotBlend::Lerp { duration_secs } if self.blend_remaining > 0.0 => {
                let weight = self.blend_remaining / duration_secs;
                add_vectors(self.state.position, self.blend_offset * weight)
            }
            _ => self.state.position,
        }
    }
}

impl SceneObject for Agent {
    fn position(&self) -> Vec2 {
        self.drawn_position()
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn draw(&self, surface: &mut dyn DrawSurface, screen_pos: Vec2, screen_size: Vec2) {
        let top_left = screen_pos - screen_size * 0.5;
        surface.draw_image(self.sprite, top_left, screen_size, self.state.orientation);
    }

    fn update(&mut self, dt: f32) {
        let step = Vec2::splat(dt);
        // Position moves with the pre-step velocity.
        self.state.position = add_vectors(self.state.position, multiply_vectors(self.state.velocity, step));
        self.state.velocity = add_vectors(self.state.velocity, multiply_vectors(self.state.acceleration, step));
        self.blend_remaining = (self.blend_remaining - dt).max(0.0);
    }
}

#[derive(Debug, Clone)]
pub struct Bullet {
    position: Vec2,
    velocity: Vec2,
    radius: f32,
}

impl Bullet {
    pub fn new(state: &BulletState) -> Self {
        Self {
            position: state.position,
            velocity: state.velocity,
            radius: BULLET_RADIUS,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn apply_snapshot(&mut self, state: &BulletState) {
        self.position = state.position;
        self.velocity = state.velocity;
    }
}

impl SceneObject for Bullet {
    fn position(&self) -> Vec2 {
        self.position
    }

    /// The radius on both axes.
    fn size(&self) -> Vec2 {
        Vec2::splat(self.radius)
    }

    fn draw(&self, surface: &mut dyn DrawSurface, screen_pos: Vec2, screen_size: Vec2) {
        surface.fill_circle(screen_pos, screen_size.x, Color::BLACK);
    }

    fn update(&mut self, dt: f32) {
        self.position = add_vectors(self.position, multiply_vectors(self.velocity, Vec2::splat(dt)));
    }
}

#[derive(Debug, Clone)]
pub enum Entity {
    Agent(Agent),
    Bullet(Bullet),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Agent(_) => EntityKind::Player,
            Self::Bullet(_) => EntityKind::Bullet,
        }
    }
}

impl SceneObject for Entity {
    fn position(&self) -> Vec2 {
        match self {
            Self::Agent(a) => a.position(),
            Self::Bullet(b) => b.position(),
        }
    }

    fn size(&self) -> Vec2 {
        match self {
            Self::Agent(a) => a.size(),
            Self::Bullet(b) => b.size(),
        }
    }

    fn draw(&self, surface: &mut dyn DrawSurface, screen_pos: Vec2, screen_size: Vec2) {
        match self {
            Self::Agent(a) => a.draw(surface, screen_pos, screen_size),
            Self::Bullet(b) => b.draw(surface, screen_pos, screen_size),
        }
    }

    fn update(&mut self, dt: f32) {
        match self {
            Self::Agent(a) => a.update(dt),
            Self::Bullet(b) => b.update(dt),
        }
    }
}
