use glam::Vec2;

use crate::surface::DrawSurface;

/// Capability set the camera needs from anything it renders.
pub trait SceneObject {
    /// World-space center.
    fn position(&self) -> Vec2;
    /// World-space extent.
    fn size(&self) -> Vec2;
    /// Draws centered on `screen_pos` with an already-scaled `screen_size`.
    fn draw(&self, surface: &mut dyn DrawSurface, screen_pos: Vec2, screen_size: Vec2);
    /// Advances local simulation by `dt` seconds.
    fn update(&mut self, dt: f32);
}
