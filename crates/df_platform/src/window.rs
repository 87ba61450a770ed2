use std::sync::Arc;

use serde::Deserialize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

const MIN_SIZE: u32 = 320;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub title: String,
    /// Logical pixels.
    pub width: u32,
    pub height: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Dogfight".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

impl PlatformConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.width < MIN_SIZE || self.height < MIN_SIZE {
            return Err(format!(
                "window must be at least {MIN_SIZE}x{MIN_SIZE}, got {}x{}",
                self.width, self.height
            ));
        }
        Ok(())
    }
}

pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, String> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
        .with_min_inner_size(winit::dpi::LogicalSize::new(MIN_SIZE, MIN_SIZE));

    let window = event_loop
        .create_window(attrs)
        .map_err(|e| format!("Failed to create window: {e}"))?;
    log::info!("Window created: {}x{}", config.width, config.height);
    Ok(Arc::new(window))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_valid() {
        assert!(PlatformConfig::default().validate().is_ok());
    }

    #[test]
    fn tiny_window_is_rejected() {
        let config = PlatformConfig {
            width: 100,
            ..PlatformConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
