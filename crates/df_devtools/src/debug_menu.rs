//! On-screen debug text built from lazily evaluated lines.
//!
//! Each line is a closure over some context `C` (usually the game world) and is
//! re-evaluated every time the menu is drawn, so values stay live without the
//! owner pushing updates.

use glam::Vec2;

use df_render::surface::{Color, DrawSurface};

pub const MENU_ORIGIN: Vec2 = Vec2::new(30.0, 30.0);
pub const LINE_SPACING: f32 = 30.0;
pub const FONT_PX: f32 = 15.0;

pub type DebugLine<C> = Box<dyn Fn(&C) -> String>;

pub struct DebugMenu<C: ?Sized> {
    lines: Vec<DebugLine<C>>,
    pub color: Color,
}

impl<C: ?Sized> DebugMenu<C> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            color: Color::BLACK,
        }
    }

    pub fn push_line(&mut self, line: impl Fn(&C) -> String + 'static) {
        self.lines.push(Box::new(line));
    }

    /// Evaluates every line in insertion order.
    pub fn evaluate(&self, ctx: &C) -> Vec<String> {
        self.lines.iter().map(|line| line(ctx)).collect()
    }

    /// Draws the lines top-down from `MENU_ORIGIN`, one every `LINE_SPACING` px.
    pub fn display(&self, ctx: &C, surface: &mut dyn DrawSurface) {
        for (i, text) in self.evaluate(ctx).iter().enumerate() {
            let origin = MENU_ORIGIN + Vec2::new(0.0, LINE_SPACING * i as f32);
            surface.fill_text(text, origin, FONT_PX, self.color);
        }
    }
}

impl<C: ?Sized> Default for DebugMenu<C> {
    fn default() -> Self {
        Self::new()
    }
}
