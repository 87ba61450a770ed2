pub mod background;
pub mod camera;
pub mod egui_surface;
pub mod gpu_context;
pub mod painter_host;
pub mod scene;
pub mod surface;

pub use background::GridBackground;
pub use camera::{Camera, CameraMode, CameraSettings, LagClamp, ViewBounds};
pub use egui_surface::{EguiSurface, TextureRegistry};
pub use gpu_context::GpuContext;
pub use painter_host::PainterHost;
pub use scene::SceneObject;
pub use surface::{Color, DisplayList, DrawCommand, DrawSurface, ImageId};
