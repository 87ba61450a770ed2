//! Keyboard state shared by the free-roam camera and the live update source.
//!
//! - **Held set:** `is_held(key)` is true for as long as the key is physically
//!   down. The free-roam camera polls this every simulated frame.
//!
//! - **Press order:** `held_keys()` lists held keys in the order they went down.
//!   The live source forwards this list upstream on every transition, so the
//!   server sees the same ordering a browser key-event log would produce.
//!
//! `key_down`/`key_up` report whether the call changed anything, which lets the
//! caller treat OS key-repeat as a no-op.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Escape,
    W,
    A,
    S,
    D,
}

impl Key {
    /// DOM `KeyboardEvent.key` spelling.
    pub fn dom_name(self) -> &'static str {
        match self {
            Self::Left => "ArrowLeft",
            Self::Right => "ArrowRight",
            Self::Up => "ArrowUp",
            Self::Down => "ArrowDown",
            Self::Space => " ",
            Self::Escape => "Escape",
            Self::W => "w",
            Self::A => "a",
            Self::S => "s",
            Self::D => "d",
        }
    }
}

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    press_order: Vec<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the key was not already held.
    pub fn key_down(&mut self, key: Key) -> bool {
        if self.held.insert(key) {
            self.press_order.push(key);
            true
        } else {
            false
        }
    }

    /// Returns true if the key was held.
    pub fn key_up(&mut self, key: Key) -> bool {
        if self.held.remove(&key) {
            self.press_order.retain(|k| *k != key);
            true
        } else {
            false
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn held_keys(&self) -> &[Key] {
        &self.press_order
    }

    /// Held keys as lower-cased DOM names joined with `,` (the live wire format).
    pub fn held_keys_wire(&self) -> String {
        self.press_order
            .iter()
            .map(|k| k.dom_name().to_lowercase())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Releases everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
        self.press_order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_sets_held() {
        let mut input = InputState::new();
        assert!(input.key_down(Key::Up));
        assert!(input.is_held(Key::Up));
    }

    #[test]
    fn key_down_repeat_is_reported_as_no_change() {
        let mut input = InputState::new();
        assert!(input.key_down(Key::Left));
        assert!(!input.key_down(Key::Left));
        assert_eq!(input.held_keys(), &[Key::Left]);
    }

    #[test]
    fn key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        assert!(!input.key_up(Key::A));
        assert!(!input.is_held(Key::A));
    }

    #[test]
    fn held_keys_follow_press_order() {
        let mut input = InputState::new();
        input.key_down(Key::Right);
        input.key_down(Key::Up);
        input.key_down(Key::Space);
        input.key_up(Key::Up);
        assert_eq!(input.held_keys(), &[Key::Right, Key::Space]);
    }

    #[test]
    fn wire_format_is_lowercase_comma_joined() {
        let mut input = InputState::new();
        assert_eq!(input.held_keys_wire(), "");
        input.key_down(Key::Up);
        input.key_down(Key::W);
        input.key_down(Key::Space);
        assert_eq!(input.held_keys_wire(), "arrowup,w, ");
    }

    #[test]
    fn multiple_keys_independent() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        input.key_down(Key::D);
        input.key_up(Key::A);
        assert!(!input.is_held(Key::A));
        assert!(input.is_held(Key::D));
    }

    #[test]
    fn clear_releases_everything() {
        let mut input = InputState::new();
        input.key_down(Key::Down);
        input.key_down(Key::S);
        input.clear();
        assert!(!input.is_held(Key::Down));
        assert!(input.held_keys().is_empty());
    }
}
