//! World-to-screen camera with clamped-lag following, shake, free-roam and zoom.
//!
//! Two positions are tracked:
//!  - `path_position`: where the camera is "supposed" to be. In follow mode it
//!    chases the target with a dead-zone, a per-tick lerp, and a hard lag limit.
//!    In free-roam mode arrow keys pan it directly.
//!  - `augmented_position`: `path_position` plus any transient shake offset.
//!    Everything the camera projects or culls is relative to this one.
//!
//! Follow smoothing is a fixed fraction per tick, not scaled by frame time, so
//! the visual catch-up speed depends on the frame rate.

use glam::Vec2;
use serde::Deserialize;

use df_core::input::{InputState, Key};

use crate::background::GridBackground;
use crate::scene::SceneObject;
use crate::surface::DrawSurface;

/// Differences at or below this (per axis) leave the camera where it is.
pub const DEAD_ZONE: f32 = 1.0;
pub const SHAKE_DURATION_SECS: f32 = 0.5;
const SHAKE_FREQUENCY: f32 = 50.0;
const WHEEL_ZOOM_FACTOR: f32 = -0.01;

/// How the per-axis lag limit compares the target difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LagClamp {
    /// `diff <= follow_distance` on the signed difference. A target running off
    /// in the negative direction is only lerped toward, never clamped.
    #[default]
    Signed,
    /// `|diff| <= follow_distance`; the lag limit holds in both directions.
    Symmetric,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub follow_distance: f32,
    pub lerp_factor: f32,
    pub lag_clamp: LagClamp,
    /// Free-roam pan per simulated frame, in world units.
    pub pan_speed: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub initial_scale: f32,
    /// Grid spacing of the background, in world units.
    pub grid_cell: f32,
    /// Enables mode toggling and wheel zoom.
    pub debug_controls: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            follow_distance: 50.0,
            lerp_factor: 0.1,
            lag_clamp: LagClamp::Signed,
            pan_speed: 50.0,
            min_scale: 0.125,
            max_scale: 3.0,
            initial_scale: 1.0,
            grid_cell: 100.0,
            debug_controls: true,
        }
    }
}

impl CameraSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_scale > 0.0
            && self.min_scale <= self.initial_scale
            && self.initial_scale <= self.max_scale)
        {
            return Err(format!(
                "camera scales must satisfy 0 < min ({}) <= initial ({}) <= max ({})",
                self.min_scale, self.initial_scale, self.max_scale
            ));
        }
        if self.follow_distance < 0.0 {
            return Err("camera follow_distance must be >= 0".to_string());
        }
        if !(self.lerp_factor > 0.0 && self.lerp_factor <= 1.0) {
            return Err("camera lerp_factor must be in (0, 1]".to_string());
        }
        if self.grid_cell <= 0.0 {
            return Err("camera grid_cell must be > 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Chase the target supplied to `update`.
    Follow,
    /// Ignore the target; pan with the arrow keys.
    FreeRoam,
}

impl CameraMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Follow => "Player Camera",
            Self::FreeRoam => "Debug Camera",
        }
    }
}

/// Visible world rectangle. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub top_left: Vec2,
    pub bottom_right: Vec2,
}

impl ViewBounds {
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.top_left.x
            && p.y >= self.top_left.y
            && p.x <= self.bottom_right.x
            && p.y <= self.bottom_right.y
    }
}

pub struct Camera {
    settings: CameraSettings,
    mode: CameraMode,
    path_position: Vec2,
    augmented_position: Vec2,
    scale: f32,
    resolution: Vec2,
    shake_elapsed: f32,
    is_shaking: bool,
}

impl Camera {
    /// Starts centered on `start`. With debug controls enabled the camera
    /// starts in free-roam, otherwise in follow mode.
    pub fn new(settings: CameraSettings, resolution: Vec2, start: Vec2) -> Self {
        let mode = if settings.debug_controls {
            CameraMode::FreeRoam
        } else {
            CameraMode::Follow
        };
        let scale = settings.initial_scale;
        Self {
            settings,
            mode,
            path_position: start,
            augmented_position: start,
            scale,
            resolution,
            shake_elapsed: 0.0,
            is_shaking: false,
        }
    }

    pub fn with_mode(mut self, mode: CameraMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn path_position(&self) -> Vec2 {
        self.path_position
    }

    pub fn augmented_position(&self) -> Vec2 {
        self.augmented_position
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_shaking(&self) -> bool {
        self.is_shaking
    }

    pub fn set_resolution(&mut self, resolution: Vec2) {
        self.resolution = resolution;
    }

    /// Half the screen resolution, in pixels.
    pub fn half_extents(&self) -> Vec2 {
        self.resolution * 0.5
    }

    /// Flips between follow and free-roam. No-op without debug controls.
    pub fn toggle_mode(&mut self) -> CameraMode {
        if self.settings.debug_controls {
            self.mode = match self.mode {
                CameraMode::Follow => CameraMode::FreeRoam,
                CameraMode::FreeRoam => CameraMode::Follow,
            };
            log::info!("Camera mode: {}", self.mode.label());
        }
        self.mode
    }

    /// One simulated frame. `target` is only consulted in follow mode, `input`
    /// only in free-roam.
    pub fn update(&mut self, dt: f32, target: Vec2, input: &InputState) {
        match self.mode {
            CameraMode::Follow => self.follow(target),
            CameraMode::FreeRoam => self.pan(input),
        }

        if self.is_shaking {
            self.shake(dt);
        } else {
            self.augmented_position = self.path_position;
        }
    }

    fn follow(&mut self, target: Vec2) {
        let diff = target - self.path_position;
        if diff.x.abs() > DEAD_ZONE || diff.y.abs() > DEAD_ZONE {
            self.path_position = Vec2::new(
                self.follow_axis(self.path_position.x, target.x, diff.x),
                self.follow_axis(self.path_position.y, target.y, diff.y),
            );
        }
    }

    fn follow_axis(&self, current: f32, target: f32, diff: f32) -> f32 {
        let limit = self.settings.follow_distance;
        let within = match self.settings.lag_clamp {
            LagClamp::Signed => diff <= limit,
            LagClamp::Symmetric => diff.abs() <= limit,
        };
        if within {
            current + diff * self.settings.lerp_factor
        } else {
            target - diff.signum() * limit
        }
    }

    fn pan(&mut self, input: &InputState) {
        let speed = self.settings.pan_speed;
        let mut delta = Vec2::ZERO;
        if input.is_held(Key::Up) {
            delta.y -= speed;
        } else if input.is_held(Key::Down) {
            delta.y += speed;
        }
        if input.is_held(Key::Right) {
            delta.x += speed;
        } else if input.is_held(Key::Left) {
            delta.x -= speed;
        }
        // Panning moves the path itself, not just the view, so a shake started
        // while roaming wobbles around the panned spot.
        self.path_position += delta;
    }

    /// Starts a shake, or re-applies the current offset if one is running.
    pub fn start_shake(&mut self) {
        self.shake(0.0);
    }

    /// Advances the shake by `dt`. The vertical offset is `sin(50t)/t`, taken as
    /// zero at `t = 0`. Past the duration the shake ends and the view snaps
    /// back onto the path.
    pub fn shake(&mut self, dt: f32) {
        self.is_shaking = true;
        if self.shake_elapsed <= SHAKE_DURATION_SECS {
            let t = self.shake_elapsed;
            let offset = if t == 0.0 {
                0.0
            } else {
                (SHAKE_FREQUENCY * t).sin() / t
            };
            self.augmented_position = self.path_position + Vec2::new(0.0, offset);
            self.shake_elapsed += dt;
        } else {
            self.shake_elapsed = 0.0;
            self.is_shaking = false;
            self.augmented_position = self.path_position;
        }
    }

    /// Applies a wheel event (`delta_y` in DOM convention: positive scrolls
    /// down, which zooms out). No-op without debug controls.
    pub fn apply_wheel(&mut self, delta_y: f32) {
        if !self.settings.debug_controls {
            return;
        }
        self.scale = (self.scale + delta_y * WHEEL_ZOOM_FACTOR)
            .clamp(self.settings.min_scale, self.settings.max_scale);
    }

    pub fn visible_bounds(&self) -> ViewBounds {
        let half = self.half_extents() / self.scale;
        ViewBounds {
            top_left: self.augmented_position - half,
            bottom_right: self.augmented_position + half,
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.half_extents() + self.scale * (world - self.augmented_position)
    }

    /// Draws the background, then every object whose position is inside the
    /// visible bounds. Returns how many objects were drawn.
    pub fn render_all<'a, T, I>(
        &self,
        surface: &mut dyn DrawSurface,
        background: &GridBackground,
        objects: I,
    ) -> usize
    where
        T: SceneObject + ?Sized + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let bounds = self.visible_bounds();
        background.draw(surface, &bounds, self.scale);

        let mut drawn = 0;
        for object in objects {
            let position = object.position();
            if !bounds.contains(position) {
                continue;
            }
            let screen_pos = self.world_to_screen(position);
            let screen_size = object.size() * self.scale;
            object.draw(surface, screen_pos, screen_size);
            drawn += 1;
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Color, DisplayList, DrawCommand};

    const RESOLUTION: Vec2 = Vec2::new(800.0, 600.0);

    struct Dot {
        position: Vec2,
    }

    impl SceneObject for Dot {
        fn position(&self) -> Vec2 {
            self.position
        }

        fn size(&self) -> Vec2 {
            Vec2::new(10.0, 10.0)
        }

        fn draw(&self, surface: &mut dyn DrawSurface, screen_pos: Vec2, screen_size: Vec2) {
            surface.fill_circle(screen_pos, screen_size.x, Color::BLACK);
        }

        fn update(&mut self, _dt: f32) {}
    }

    fn follow_camera(settings: CameraSettings) -> Camera {
        Camera::new(settings, RESOLUTION, Vec2::ZERO).with_mode(CameraMode::Follow)
    }

    fn circles(list: &DisplayList) -> Vec<(Vec2, f32)> {
        list.commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Circle { center, radius, .. } => Some((*center, *radius)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn follow_converges_and_never_lags_past_follow_distance() {
        let mut camera = follow_camera(CameraSettings::default());
        let input = InputState::new();
        let target = Vec2::new(1000.0, 0.0);

        camera.update(1.0 / 30.0, target, &input);
        assert!((camera.path_position().x - 950.0).abs() < 1e-3);

        for _ in 0..200 {
            camera.update(1.0 / 30.0, target, &input);
            let lag = target.x - camera.path_position().x;
            assert!(lag <= 50.0 + 1e-3, "lag {lag} exceeded follow distance");
            assert!(lag >= 0.0, "camera overshot target");
        }
        assert!(target.x - camera.path_position().x <= DEAD_ZONE + 1e-3);
    }

    #[test]
    fn inside_follow_distance_moves_ten_percent_per_tick() {
        let mut camera = follow_camera(CameraSettings::default());
        camera.update(0.016, Vec2::new(40.0, 20.0), &InputState::new());
        assert!((camera.path_position().x - 4.0).abs() < 1e-4);
        assert!((camera.path_position().y - 2.0).abs() < 1e-4);
        assert_eq!(camera.augmented_position(), camera.path_position());
    }

    #[test]
    fn dead_zone_leaves_camera_in_place() {
        let mut camera = follow_camera(CameraSettings::default());
        camera.update(0.016, Vec2::new(0.9, -1.0), &InputState::new());
        assert_eq!(camera.path_position(), Vec2::ZERO);
    }

    #[test]
    fn signed_clamp_only_lerps_toward_negative_runaway() {
        let mut camera = follow_camera(CameraSettings::default());
        camera.update(0.016, Vec2::new(-1000.0, 0.0), &InputState::new());
        // Signed comparison: -1000 <= 50, so this is a 10% lerp, not a clamp.
        assert!((camera.path_position().x - -100.0).abs() < 1e-3);
    }

    #[test]
    fn symmetric_clamp_limits_lag_in_both_directions() {
        let mut camera = follow_camera(CameraSettings {
            lag_clamp: LagClamp::Symmetric,
            ..CameraSettings::default()
        });
        camera.update(0.016, Vec2::new(-1000.0, 0.0), &InputState::new());
        assert!((camera.path_position().x - -950.0).abs() < 1e-3);
    }

    #[test]
    fn axes_are_clamped_independently() {
        let mut camera = follow_camera(CameraSettings::default());
        camera.update(0.016, Vec2::new(500.0, 20.0), &InputState::new());
        assert!((camera.path_position().x - 450.0).abs() < 1e-3);
        assert!((camera.path_position().y - 2.0).abs() < 1e-3);
    }

    #[test]
    fn shake_ends_after_duration_and_snaps_back() {
        let mut camera = follow_camera(CameraSettings::default());
        camera.start_shake();
        assert!(camera.is_shaking());
        // t = 0 is special-cased to a zero offset.
        assert_eq!(camera.augmented_position(), camera.path_position());

        camera.shake(0.2);
        camera.shake(0.2);
        assert!(camera.is_shaking());
        assert!(camera.augmented_position() != camera.path_position());

        camera.shake(0.2);
        camera.shake(0.2);
        assert!(!camera.is_shaking());
        assert_eq!(camera.augmented_position(), camera.path_position());
    }

    #[test]
    fn shake_offset_composes_with_follow_position() {
        let mut camera = follow_camera(CameraSettings::default());
        let input = InputState::new();
        camera.start_shake();
        camera.update(0.1, Vec2::new(30.0, 0.0), &input);
        camera.update(0.1, Vec2::new(30.0, 0.0), &input);
        let offset = camera.augmented_position() - camera.path_position();
        assert_eq!(offset.x, 0.0);
        let expected = (SHAKE_FREQUENCY * 0.1).sin() / 0.1;
        assert!((offset.y - expected).abs() < 1e-3);
    }

    #[test]
    fn shake_runs_out_through_update() {
        let mut camera = follow_camera(CameraSettings::default());
        let input = InputState::new();
        camera.start_shake();
        for _ in 0..40 {
            camera.update(1.0 / 30.0, Vec2::ZERO, &input);
        }
        assert!(!camera.is_shaking());
        assert_eq!(camera.augmented_position(), camera.path_position());
    }

    #[test]
    fn free_roam_pans_with_arrow_keys_and_ignores_target() {
        let mut camera = Camera::new(CameraSettings::default(), RESOLUTION, Vec2::ZERO);
        assert_eq!(camera.mode(), CameraMode::FreeRoam);

        let mut input = InputState::new();
        input.key_down(Key::Up);
        input.key_down(Key::Down);
        input.key_down(Key::Left);
        camera.update(0.016, Vec2::new(1000.0, 1000.0), &input);
        // Up wins over Down; Left applies since Right is not held.
        assert_eq!(camera.augmented_position(), Vec2::new(-50.0, -50.0));

        input.key_up(Key::Up);
        input.key_up(Key::Left);
        camera.update(0.016, Vec2::ZERO, &input);
        assert_eq!(camera.augmented_position(), Vec2::new(-50.0, 0.0));
    }

    #[test]
    fn panning_moves_the_path_so_shake_composes_with_it() {
        // Free-roam drives `path_position` rather than only the augmented view.
        let mut camera = Camera::new(CameraSettings::default(), RESOLUTION, Vec2::ZERO);
        let mut input = InputState::new();
        input.key_down(Key::Right);
        camera.update(0.016, Vec2::ZERO, &input);
        assert_eq!(camera.path_position(), Vec2::new(50.0, 0.0));
        assert_eq!(camera.augmented_position(), camera.path_position());

        input.key_up(Key::Right);
        camera.start_shake();
        camera.shake(0.1);
        assert_eq!(camera.augmented_position().x, 50.0);
    }

    #[test]
    fn toggling_back_to_follow_resumes_from_panned_view() {
        let mut camera = Camera::new(CameraSettings::default(), RESOLUTION, Vec2::ZERO);
        let mut input = InputState::new();
        input.key_down(Key::Right);
        camera.update(0.016, Vec2::ZERO, &input);
        input.key_up(Key::Right);

        assert_eq!(camera.toggle_mode(), CameraMode::Follow);
        camera.update(0.016, Vec2::new(50.0, 0.0), &input);
        assert_eq!(camera.path_position(), Vec2::new(50.0, 0.0));
    }

    #[test]
    fn toggle_requires_debug_controls() {
        let mut camera = Camera::new(
            CameraSettings {
                debug_controls: false,
                ..CameraSettings::default()
            },
            RESOLUTION,
            Vec2::ZERO,
        );
        assert_eq!(camera.mode(), CameraMode::Follow);
        assert_eq!(camera.toggle_mode(), CameraMode::Follow);
        camera.apply_wheel(-100.0);
        assert_eq!(camera.scale(), 1.0);
    }

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut camera = Camera::new(CameraSettings::default(), RESOLUTION, Vec2::ZERO);
        camera.apply_wheel(10.0);
        assert!((camera.scale() - 0.9).abs() < 1e-5);

        for _ in 0..100 {
            camera.apply_wheel(100.0);
        }
        assert_eq!(camera.scale(), 0.125);

        for _ in 0..100 {
            camera.apply_wheel(-100.0);
        }
        assert_eq!(camera.scale(), 3.0);
    }

    #[test]
    fn bounds_shrink_as_scale_grows() {
        let mut camera = Camera::new(CameraSettings::default(), RESOLUTION, Vec2::ZERO);
        let bounds = camera.visible_bounds();
        assert_eq!(bounds.top_left, Vec2::new(-400.0, -300.0));
        assert_eq!(bounds.bottom_right, Vec2::new(400.0, 300.0));

        camera.apply_wheel(-100.0); // scale 2
        let bounds = camera.visible_bounds();
        assert_eq!(bounds.top_left, Vec2::new(-200.0, -150.0));
    }

    #[test]
    fn world_to_screen_centers_on_augmented_position() {
        let mut camera = Camera::new(CameraSettings::default(), RESOLUTION, Vec2::new(100.0, 100.0));
        assert_eq!(camera.world_to_screen(Vec2::new(100.0, 100.0)), Vec2::new(400.0, 300.0));
        assert_eq!(camera.world_to_screen(Vec2::new(110.0, 90.0)), Vec2::new(410.0, 290.0));
        camera.apply_wheel(-100.0);
        assert_eq!(camera.world_to_screen(Vec2::new(110.0, 90.0)), Vec2::new(420.0, 280.0));
    }

    #[test]
    fn culling_bounds_are_inclusive() {
        let camera = follow_camera(CameraSettings::default());
        let objects = [
            Dot {
                position: Vec2::new(400.0, 0.0),
            },
            Dot {
                position: Vec2::new(401.0, 0.0),
            },
            Dot {
                position: Vec2::new(-400.0, -300.0),
            },
            Dot {
                position: Vec2::new(0.0, 301.0),
            },
        ];
        let mut list = DisplayList::new(RESOLUTION);
        let drawn = camera.render_all(&mut list, &GridBackground::default(), objects.iter());
        assert_eq!(drawn, 2);
        let drawn_at: Vec<Vec2> = circles(&list).into_iter().map(|(c, _)| c).collect();
        assert_eq!(drawn_at, vec![Vec2::new(800.0, 300.0), Vec2::new(0.0, 0.0)]);
    }

    #[test]
    fn render_draws_background_first_and_scales_sizes() {
        let mut camera = Camera::new(CameraSettings::default(), RESOLUTION, Vec2::ZERO);
        camera.apply_wheel(-50.0); // scale 1.5
        let objects: Vec<Box<dyn SceneObject>> = vec![Box::new(Dot {
            position: Vec2::ZERO,
        })];
        let mut list = DisplayList::new(RESOLUTION);
        camera.render_all(&mut list, &GridBackground::default(), objects.iter().map(|b| b.as_ref()));

        assert!(matches!(list.commands()[0], DrawCommand::FillRect { .. }));
        let (center, radius) = circles(&list)[0];
        assert_eq!(center, Vec2::new(400.0, 300.0));
        assert!((radius - 15.0).abs() < 1e-4);
    }

    #[test]
    fn settings_validation_rejects_inverted_scales() {
        let bad = CameraSettings {
            min_scale: 2.0,
            max_scale: 1.0,
            ..CameraSettings::default()
        };
        assert!(bad.validate().is_err());
        assert!(CameraSettings::default().validate().is_ok());
    }
}
