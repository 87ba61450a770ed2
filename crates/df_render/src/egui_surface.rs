//! `DrawSurface` backed by an `egui::Painter`.
//!
//! egui is immediate mode, so an `EguiSurface` only lives for one egui pass;
//! the host replays the game's `DisplayList` into it every refresh.

use std::collections::HashMap;

use egui::epaint::{Mesh, Shape};
use egui::emath::Rot2;
use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, TextureHandle, TextureId};
use glam::Vec2;

use crate::surface::{Color, DrawSurface, ImageId};

const LINE_WIDTH: f32 = 1.0;

fn color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

fn pos2(v: Vec2) -> Pos2 {
    Pos2::new(v.x, v.y)
}

/// Owns the egui textures the game can draw, keyed by `ImageId`.
#[derive(Default)]
pub struct TextureRegistry {
    textures: HashMap<ImageId, TextureHandle>,
    next_id: u32,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads `image` and hands back the id the game should draw with.
    pub fn register(&mut self, ctx: &egui::Context, name: &str, image: egui::ColorImage) -> ImageId {
        let handle = ctx.load_texture(name, image, egui::TextureOptions::LINEAR);
        let id = ImageId(self.next_id);
        self.next_id += 1;
        log::debug!("Registered texture '{}' as {:?}", name, id);
        self.textures.insert(id, handle);
        id
    }

    pub fn texture_id(&self, image: ImageId) -> Option<TextureId> {
        self.textures.get(&image).map(|h| h.id())
    }

}

/// A textured quad covering `rect`, turned by `rotation` radians about its center.
fn image_mesh(texture_id: TextureId, rect: Rect, rotation: f32) -> Mesh {
    let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
    let mut mesh = Mesh::with_texture(texture_id);
    mesh.add_rect_with_uv(rect, uv, Color32::WHITE);
    if rotation != 0.0 {
        mesh.rotate(Rot2::from_angle(rotation), rect.center());
    }
    mesh
}

pub struct EguiSurface<'a> {
    painter: &'a egui::Painter,
    textures: &'a TextureRegistry,
    size: Vec2,
}

impl<'a> EguiSurface<'a> {
    /// `size` is the drawable area in egui points.
    pub fn new(painter: &'a egui::Painter, textures: &'a TextureRegistry, size: Vec2) -> Self {
        Self {
            painter,
            textures,
            size,
        }
    }
}

impl DrawSurface for EguiSurface<'_> {
    fn size(&self) -> Vec2 {
        self.size
    }

    // Nothing persists between egui passes.
    fn clear(&mut self) {}

    fn fill_rect(&mut self, top_left: Vec2, size: Vec2, color: Color) {
        let rect = Rect::from_min_size(pos2(top_left), egui::vec2(size.x, size.y));
        self.painter.rect_filled(rect, 0.0, color32(color));
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.painter
            .line_segment([pos2(from), pos2(to)], Stroke::new(LINE_WIDTH, color32(color)));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.painter.circle_filled(pos2(center), radius, color32(color));
    }

    fn draw_image(&mut self, image: ImageId, top_left: Vec2, size: Vec2, rotation: f32) {
        let Some(texture_id) = self.textures.texture_id(image) else {
            log::debug!("Skipping unknown image {:?}", image);
            return;
        };
        let rect = Rect::from_min_size(pos2(top_left), egui::vec2(size.x, size.y));
        self.painter.add(Shape::mesh(image_mesh(texture_id, rect, rotation)));
    }

    fn fill_text(&mut self, text: &str, origin: Vec2, font_px: f32, color: Color) {
        self.painter.text(
            pos2(origin),
            Align2::LEFT_BOTTOM,
            text,
            FontId::proportional(font_px),
            color32(color),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Pos2, b: Pos2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn unrotated_image_covers_its_rect() {
        let rect = Rect::from_min_size(Pos2::new(10.0, 20.0), egui::vec2(100.0, 150.0));
        let mesh = image_mesh(TextureId::Managed(1), rect, 0.0);
        assert_eq!(mesh.texture_id, TextureId::Managed(1));
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.calc_bounds(), rect);
    }

    #[test]
    fn half_turn_rotates_about_the_center() {
        let rect = Rect::from_min_size(Pos2::new(0.0, 0.0), egui::vec2(100.0, 150.0));
        let mesh = image_mesh(TextureId::Managed(1), rect, std::f32::consts::PI);
        // Same footprint, but the top-left texel now sits at the bottom-right.
        let bounds = mesh.calc_bounds();
        assert!(close(bounds.min, rect.min) && close(bounds.max, rect.max));
        let top_left_texel = mesh
            .vertices
            .iter()
            .find(|v| v.uv == Pos2::ZERO)
            .expect("quad has a top-left uv");
        assert!(close(top_left_texel.pos, rect.max));
    }

    #[test]
    fn quarter_turn_swaps_extents() {
        let rect = Rect::from_center_size(Pos2::new(50.0, 50.0), egui::vec2(100.0, 20.0));
        let mesh = image_mesh(TextureId::Managed(1), rect, std::f32::consts::FRAC_PI_2);
        let bounds = mesh.calc_bounds();
        assert!((bounds.width() - 20.0).abs() < 1e-3);
        assert!((bounds.height() - 100.0).abs() < 1e-3);
        assert!(close(bounds.center(), rect.center()));
    }

    #[test]
    fn registered_images_get_distinct_ids() {
        let ctx = egui::Context::default();
        let mut textures = TextureRegistry::new();
        let a = textures.register(&ctx, "a", egui::ColorImage::new([2, 2], Color32::RED));
        let b = textures.register(&ctx, "b", egui::ColorImage::new([2, 2], Color32::BLUE));
        assert_ne!(a, b);
        assert!(textures.texture_id(a).is_some());
        assert_ne!(textures.texture_id(a), textures.texture_id(b));
        assert_eq!(textures.texture_id(ImageId(99)), None);
    }
}
