//! Presents 2D drawing through egui on top of a cleared wgpu frame.
//!
//! `egui_wgpu::Renderer::render()` needs a `RenderPass<'static>` while
//! `begin_render_pass` borrows the encoder, so a frame is split into phases:
//!
//!   1. `prepare()` -- run the egui pass with the caller's drawing, tessellate
//!   2. `upload()`  -- upload textures and update GPU buffers (borrows encoder mutably)
//!   3. `paint()`   -- render into a new render pass with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! `render_frame` runs all four against a `GpuContext`.

use glam::Vec2;
use winit::window::Window;

use crate::egui_surface::{EguiSurface, TextureRegistry};
use crate::gpu_context::GpuContext;
use crate::surface::{Color, DrawSurface};

pub struct PainterHost {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub textures: TextureRegistry,
}

impl PainterHost {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, window: &Window) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            textures: TextureRegistry::new(),
        }
    }

    pub fn context(&self) -> &egui::Context {
        &self.egui_ctx
    }

    /// Feeds a window event to egui. Returns true if egui wants it for itself.
    pub fn handle_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed
    }

    /// Runs one egui pass; `draw` paints onto the background layer.
    pub fn prepare(
        &mut self,
        window: &Window,
        draw: impl FnOnce(&mut dyn DrawSurface),
    ) -> (Vec<egui::ClippedPrimitive>, egui::TexturesDelta) {
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let textures = &self.textures;
        let mut draw = Some(draw);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            // egui may run the closure more than once per frame; draw on the first.
            let Some(draw) = draw.take() else {
                return;
            };
            let painter = ctx.layer_painter(egui::LayerId::background());
            let screen = ctx.screen_rect().size();
            let mut surface = EguiSurface::new(&painter, textures, Vec2::new(screen.x, screen.y));
            draw(&mut surface);
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures that egui no longer needs. Call after rendering.
    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }

    /// Clears the frame to `clear`, then presents whatever `draw` paints.
    /// Returns false if no surface texture was available this refresh.
    pub fn render_frame(
        &mut self,
        gpu: &GpuContext,
        window: &Window,
        clear: Color,
        draw: impl FnOnce(&mut dyn DrawSurface),
    ) -> bool {
        let Some((output, view)) = gpu.begin_frame() else {
            return false;
        };

        let (primitives, textures_delta) = self.prepare(window, draw);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.size.0, gpu.size.1],
            pixels_per_point: window.scale_factor() as f32,
        };

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.upload(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &primitives,
            &textures_delta,
            &screen_descriptor,
        );

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Canvas Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu_color(clear)),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.paint(&mut pass, &primitives, &screen_descriptor);
        }

        self.cleanup(&textures_delta);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        true
    }
}

fn wgpu_color(color: Color) -> wgpu::Color {
    wgpu::Color {
        r: color.r as f64 / 255.0,
        g: color.g as f64 / 255.0,
        b: color.b as f64 / 255.0,
        a: color.a as f64 / 255.0,
    }
}
