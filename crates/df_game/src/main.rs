//! Dogfight client -- window host and application entry point.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. Every
//! display refresh lands in `RedrawRequested`, which
//!
//!   1. calls `GameWorld::frame()` -- paces to the configured FPS and, on a due
//!      frame, consumes the latest snapshot, integrates entities, moves the
//!      camera and redraws the retained canvas
//!   2. replays the retained canvas through egui and presents it with wgpu
//!
//! Snapshots arrive on the update source's own thread and meet the loop only
//! in the world's `UpdateChannel`.

mod assets;
mod config;
mod entity;
mod world;

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use config::{ClientConfig, UpdateSourceKind};
use df_core::input::Key;
use df_net::{LiveServer, MockServer, UpdateChannel, UpdateSource};
use df_render::{DrawSurface, GpuContext, PainterHost};
use world::GameWorld;

/// DOM-equivalent pixels per wheel notch.
const WHEEL_LINE_PX: f32 = 100.0;

struct ClientState {
    window: Arc<Window>,
    gpu: GpuContext,
    host: PainterHost,
    world: GameWorld,
}

impl ClientState {
    fn new(window: Arc<Window>, config: &ClientConfig) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let mut host = PainterHost::new(&gpu.device, gpu.surface_format, &window);

        let ctx = host.context().clone();
        let assets = assets::load_game_assets(&ctx, &mut host.textures, &config.assets.player_sprite)
            .map_err(|e| e.to_string())?;

        let source: Box<dyn UpdateSource> = match config.update_source {
            UpdateSourceKind::Mock => Box::new(MockServer::new(
                config.mock_script,
                Duration::from_millis(config.mock_interval_ms),
            )),
            UpdateSourceKind::Live => Box::new(LiveServer::new(config.server_socket_url.clone())),
        };
        log::info!("Update source: {:?}", config.update_source);

        let world = GameWorld::new(
            config,
            UpdateChannel::new(source),
            assets,
            logical_size(&window),
        )
        .map_err(|e| e.to_string())?;

        Ok(Self {
            window,
            gpu,
            host,
            world,
        })
    }
}

struct App {
    config: ClientConfig,
    state: Option<ClientState>,
    failed: bool,
}

impl App {
    fn new(config: ClientConfig) -> Self {
        Self {
            config,
            state: None,
            failed: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: &dyn std::fmt::Display) {
        log::error!("Startup failed: {error}");
        self.failed = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = match df_platform::create_window(event_loop, &self.config.window) {
            Ok(window) => window,
            Err(e) => return self.fail(event_loop, &e),
        };
        match ClientState::new(window, &self.config) {
            Ok(state) => self.state = Some(state),
            Err(e) => self.fail(event_loop, &e),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        state.host.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    state.world.resize(logical_size(&state.window));
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::Focused(false) => state.world.release_all_keys(),

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed if key == Key::Escape => {
                                log::info!("Escape pressed, exiting.");
                                event_loop.exit();
                            }
                            ElementState::Pressed => state.world.key_down(key),
                            ElementState::Released => state.world.key_up(key),
                        }
                    }
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports scrolling up as positive; the camera expects
                // DOM wheel deltas where scrolling down is positive.
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * WHEEL_LINE_PX,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32,
                };
                state.world.wheel(delta_y);
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                state.world.frame(Instant::now());

                let background = state.world.background_color();
                let canvas = state.world.canvas();
                state
                    .host
                    .render_frame(&state.gpu, &state.window, background, |surface: &mut dyn DrawSurface| {
                        canvas.replay(surface)
                    });
            }

            _ => {}
        }
    }
}

fn logical_size(window: &Window) -> Vec2 {
    let size = window.inner_size().to_logical::<f32>(window.scale_factor());
    Vec2::new(size.width, size.height)
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Space => Some(Key::Space),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Dogfight client starting...");

    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).expect("Event loop error");
    if app.failed {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_and_action_keys_are_mapped() {
        assert_eq!(map_key(KeyCode::ArrowUp), Some(Key::Up));
        assert_eq!(map_key(KeyCode::Space), Some(Key::Space));
        assert_eq!(map_key(KeyCode::KeyS), Some(Key::S));
        assert_eq!(map_key(KeyCode::F1), None);
    }
}
