//! Authoritative world state as delivered by an update source.
//!
//! Wire format is JSON with `{x, y}` objects for vectors:
//!
//! ```json
//! { "players": [ { "id": "p1", "position": {"x": 0, "y": 0},
//!                  "velocity": {"x": 300, "y": 300}, "acceleration": {"x": 0, "y": 0},
//!                  "orientation": 0, "cooldown": 0 } ],
//!   "bullets": [ { "id": "b1", "position": {"x": 50, "y": 50}, "velocity": {"x": 30, "y": 5} } ] }
//! ```
//!
//! Snapshots are validated on ingress (`validate`) so nothing downstream has to
//! guard against empty ids or non-finite numbers.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::vector::is_finite_vector;

/// Physical state of one entity at an instant. `orientation` is in radians and
/// is never normalized; values beyond 2π are legal.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KinematicState {
    #[serde(with = "vec2_xy")]
    pub position: Vec2,
    #[serde(with = "vec2_xy")]
    pub velocity: Vec2,
    #[serde(with = "vec2_xy")]
    pub acceleration: Vec2,
    #[serde(default)]
    pub orientation: f32,
    #[serde(default)]
    pub cooldown: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: String,
    #[serde(flatten)]
    pub state: KinematicState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletState {
    pub id: String,
    #[serde(with = "vec2_xy")]
    pub position: Vec2,
    #[serde(with = "vec2_xy")]
    pub velocity: Vec2,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub players: Vec<PlayerState>,
    #[serde(default)]
    pub bullets: Vec<BulletState>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.bullets.is_empty()
    }

    /// Rejects empty or duplicated ids (per category) and non-finite numbers.
    pub fn validate(&self) -> Result<(), ClientError> {
        let mut player_ids = HashSet::new();
        for player in &self.players {
            check_id("player", &player.id, &mut player_ids)?;
            let s = &player.state;
            let finite = is_finite_vector(s.position)
                && is_finite_vector(s.velocity)
                && is_finite_vector(s.acceleration)
                && s.orientation.is_finite()
                && s.cooldown.is_finite();
            if !finite {
                return Err(ClientError::MalformedSnapshot(format!(
                    "player '{}' has a non-finite field",
                    player.id
                )));
            }
        }

        let mut bullet_ids = HashSet::new();
        for bullet in &self.bullets {
            check_id("bullet", &bullet.id, &mut bullet_ids)?;
            if !is_finite_vector(bullet.position) || !is_finite_vector(bullet.velocity) {
                return Err(ClientError::MalformedSnapshot(format!(
                    "bullet '{}' has a non-finite field",
                    bullet.id
                )));
            }
        }
        Ok(())
    }
}

fn check_id<'a>(kind: &str, id: &'a str, seen: &mut HashSet<&'a str>) -> Result<(), ClientError> {
    if id.is_empty() {
        return Err(ClientError::MalformedSnapshot(format!("{kind} with empty id")));
    }
    if !seen.insert(id) {
        return Err(ClientError::MalformedSnapshot(format!(
            "duplicate {kind} id '{id}'"
        )));
    }
    Ok(())
}

/// Parses and validates a JSON snapshot.
pub fn parse_snapshot(raw: &str) -> Result<Snapshot, ClientError> {
    let snapshot: Snapshot = serde_json::from_str(raw)
        .map_err(|e| ClientError::MalformedSnapshot(format!("invalid JSON: {e}")))?;
    snapshot.validate()?;
    Ok(snapshot)
}

mod vec2_xy {
    use glam::Vec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Xy {
        x: f32,
        y: f32,
    }

    pub fn serialize<S: Serializer>(v: &Vec2, serializer: S) -> Result<S::Ok, S::Error> {
        Xy { x: v.x, y: v.y }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec2, D::Error> {
        let xy = Xy::deserialize(deserializer)?;
        Ok(Vec2::new(xy.x, xy.y))
    }
}
