//! The drawing seam between the game and whatever rasterizes it.
//!
//! `DrawSurface` is an immediate-mode 2D API in screen pixels (origin top-left,
//! y down). The game never reads back from a surface.
//!
//! `DisplayList` is the retained implementation: it records commands and is
//! cleared by `clear()`. The game draws into one only on simulated frames; the
//! host replays it on every display refresh, the way a browser canvas keeps
//! its pixels between draws.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRID: Color = Color::rgb(160, 160, 160);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Accepts a handful of CSS color names or `#rrggbb`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            if hex.len() != 6 {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            return Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        match text.to_ascii_lowercase().as_str() {
            "white" => Some(Self::WHITE),
            "black" => Some(Self::BLACK),
            "gray" | "grey" => Some(Self::rgb(128, 128, 128)),
            "lightgray" | "lightgrey" => Some(Self::rgb(211, 211, 211)),
            "skyblue" => Some(Self::rgb(135, 206, 235)),
            "red" => Some(Self::rgb(255, 0, 0)),
            _ => None,
        }
    }
}

/// Opaque handle to an image already resolved by the asset loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

pub trait DrawSurface {
    /// Drawable area in pixels.
    fn size(&self) -> Vec2;
    fn clear(&mut self);
    fn fill_rect(&mut self, top_left: Vec2, size: Vec2, color: Color);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    /// Draws `image` into the rect at `top_left`/`size`, rotated by `rotation`
    /// radians about the rect's center.
    fn draw_image(&mut self, image: ImageId, top_left: Vec2, size: Vec2, rotation: f32);
    /// `origin` is the left end of the text baseline.
    fn fill_text(&mut self, text: &str, origin: Vec2, font_px: f32, color: Color);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        top_left: Vec2,
        size: Vec2,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Image {
        image: ImageId,
        top_left: Vec2,
        size: Vec2,
        rotation: f32,
    },
    Text {
        text: String,
        origin: Vec2,
        font_px: f32,
        color: Color,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    size: Vec2,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn replay(&self, target: &mut dyn DrawSurface) {
        for command in &self.commands {
            match command {
                DrawCommand::FillRect {
                    top_left,
                    size,
                    color,
                } => target.fill_rect(*top_left, *size, *color),
                DrawCommand::Line { from, to, color } => target.stroke_line(*from, *to, *color),
                DrawCommand::Circle {
                    center,
                    radius,
                    color,
                } => target.fill_circle(*center, *radius, *color),
                DrawCommand::Image {
                    image,
                    top_left,
                    size,
                    rotation,
                } => target.draw_image(*image, *top_left, *size, *rotation),
                DrawCommand::Text {
                    text,
                    origin,
                    font_px,
                    color,
                } => target.fill_text(text, *origin, *font_px, *color),
            }
        }
    }
}

impl DrawSurface for DisplayList {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self) {
        self.commands.clear();
    }

    fn fill_rect(&mut self, top_left: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            top_left,
            size,
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.commands.push(DrawCommand::Line { from, to, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn draw_image(&mut self, image: ImageId, top_left: Vec2, size: Vec2, rotation: f32) {
        self.commands.push(DrawCommand::Image {
            image,
            top_left,
            size,
            rotation,
        });
    }

    fn fill_text(&mut self, text: &str, origin: Vec2, font_px: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            font_px,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_names_and_hex() {
        assert_eq!(Color::parse("white"), Some(Color::WHITE));
        assert_eq!(Color::parse(" Black "), Some(Color::BLACK));
        assert_eq!(Color::parse("#87ceeb"), Some(Color::rgb(135, 206, 235)));
        assert_eq!(Color::parse("#fff"), None);
        assert_eq!(Color::parse("chartreuse-ish"), None);
    }

    #[test]
    fn clear_empties_display_list() {
        let mut list = DisplayList::new(Vec2::new(800.0, 600.0));
        list.fill_circle(Vec2::ZERO, 10.0, Color::BLACK);
        list.fill_text("hi", Vec2::new(30.0, 30.0), 15.0, Color::BLACK);
        assert_eq!(list.commands().len(), 2);
        list.clear();
        assert!(list.commands().is_empty());
        assert_eq!(list.size(), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn replay_reproduces_commands_in_order() {
        let mut source = DisplayList::new(Vec2::new(100.0, 100.0));
        source.fill_rect(Vec2::ZERO, Vec2::splat(100.0), Color::WHITE);
        source.stroke_line(Vec2::ZERO, Vec2::new(0.0, 100.0), Color::GRID);
        source.draw_image(ImageId(3), Vec2::new(5.0, 5.0), Vec2::new(10.0, 15.0), 1.5);

        let mut target = DisplayList::new(Vec2::new(100.0, 100.0));
        source.replay(&mut target);
        assert_eq!(source.commands(), target.commands());
    }
}
