use glam::Vec2;

use df_core::vector::mod_vectors;

use crate::camera::ViewBounds;
use crate::surface::{Color, DrawSurface};

/// Flat fill plus world-aligned grid lines. Used as the backdrop while there is
/// no sky art; it makes camera motion and zoom easy to read.
#[derive(Debug, Clone)]
pub struct GridBackground {
    /// Grid spacing in world units.
    pub cell_size: f32,
    pub fill: Color,
    pub line: Color,
}

impl GridBackground {
    pub fn new(cell_size: f32, fill: Color) -> Self {
        Self {
            cell_size,
            fill,
            line: Color::GRID,
        }
    }

    /// Draws the portion of the grid inside `bounds` across the whole surface.
    /// `scale` is the camera's world-to-screen scale.
    pub fn draw(&self, surface: &mut dyn DrawSurface, bounds: &ViewBounds, scale: f32) {
        let screen = surface.size();
        surface.fill_rect(Vec2::ZERO, screen, self.fill);

        let cell = Vec2::splat(self.cell_size * scale);
        if cell.x <= f32::EPSILON || cell.y <= f32::EPSILON {
            return;
        }

        // Screen position of the first grid line at or left/above of the
        // visible area's top-left corner.
        let grid_origin = -mod_vectors(bounds.top_left * scale, cell);

        let mut x = grid_origin.x;
        while x <= screen.x {
            surface.stroke_line(Vec2::new(x, 0.0), Vec2::new(x, screen.y), self.line);
            x += cell.x;
        }
        let mut y = grid_origin.y;
        while y <= screen.y {
            surface.stroke_line(Vec2::new(0.0, y), Vec2::new(screen.x, y), self.line);
            y += cell.y;
        }
    }
}

impl Default for GridBackground {
    fn default() -> Self {
        Self::new(100.0, Color::WHITE)
    }
}
