use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use df_core::ClientError;
use df_net::MockScript;
use df_platform::PlatformConfig;
use df_render::{CameraSettings, Color};

pub const DEFAULT_CONFIG_PATH: &str = "assets/config/client.json";
pub const CONFIG_PATH_ENV: &str = "DOGFIGHT_CONFIG";
pub const SERVER_URL_ENV: &str = "DOGFIGHT_SERVER_URL";

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSourceKind {
    #[default]
    Mock,
    Live,
}

/// How an entity reacts when a snapshot moves it.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SnapshotBlend {
    /// Jump straight to the reported state.
    #[default]
    Snap,
    /// Jump the simulated state, but ease the drawn position over `duration_secs`.
    Lerp { duration_secs: f32 },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EvictionConfig {
    /// Seconds a bullet may go unreported before it is dropped.
    pub bullet_ttl_secs: Option<f32>,
    /// Same for players; `None` keeps them forever.
    pub player_ttl_secs: Option<f32>,
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            bullet_ttl_secs: Some(3.0),
            player_ttl_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AssetsConfig {
    pub player_sprite: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            player_sprite: "assets/hq/snoopy_hq.png".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    pub fps: u32,
    pub background_color: String,
    pub debug_mode: bool,
    pub server_socket_url: String,
    pub update_source: UpdateSourceKind,
    pub mock_script: MockScript,
    pub mock_interval_ms: u64,
    pub snapshot_blend: SnapshotBlend,
    pub eviction: EvictionConfig,
    pub stale_source_warning_secs: f32,
    /// Caps the time one step simulates. `None` simulates all elapsed time.
    pub max_frame_secs: Option<f32>,
    pub camera: CameraSettings,
    pub window: PlatformConfig,
    pub assets: AssetsConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            background_color: "white".to_string(),
            debug_mode: true,
            server_socket_url: "ws://127.0.0.1:58901/".to_string(),
            update_source: UpdateSourceKind::Mock,
            mock_script: MockScript::SineMotion,
            mock_interval_ms: 1000,
            snapshot_blend: SnapshotBlend::Snap,
            eviction: EvictionConfig::default(),
            stale_source_warning_secs: 5.0,
            max_frame_secs: None,
            camera: CameraSettings::default(),
            window: PlatformConfig::default(),
            assets: AssetsConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn background(&self) -> Result<Color, String> {
        Color::parse(&self.background_color)
            .ok_or_else(|| format!("unknown background_color '{}'", self.background_color))
    }

    pub fn apply_env_overrides(&mut self, server_url: Option<String>) {
        if let Some(url) = server_url.filter(|u| !u.trim().is_empty()) {
            log::info!("Server URL overridden from {}: {}", SERVER_URL_ENV, url);
            self.server_socket_url = url;
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<ClientConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let config: ClientConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ClientConfig) -> Result<(), String> {
    if config.fps == 0 {
        return Err("Config validation failed: fps must be > 0".to_string());
    }
    if config.mock_interval_ms == 0 {
        return Err("Config validation failed: mock_interval_ms must be > 0".to_string());
    }
    if matches!(config.max_frame_secs, Some(t) if t <= 0.0) {
        return Err("Config validation failed: max_frame_secs must be > 0".to_string());
    }
    if let SnapshotBlend::Lerp { duration_secs } = config.snapshot_blend {
        if duration_secs <= 0.0 {
            return Err(format!(
                "Config validation failed: lerp duration_secs must be > 0, got {duration_secs}"
            ));
        }
    }
    for (name, ttl) in [
        ("bullet_ttl_secs", config.eviction.bullet_ttl_secs),
        ("player_ttl_secs", config.eviction.player_ttl_secs),
    ] {
        if matches!(ttl, Some(t) if t <= 0.0) {
            return Err(format!("Config validation failed: {name} must be > 0"));
        }
    }
    config.background().map_err(|e| format!("Config validation failed: {e}"))?;
    config
        .camera
        .validate()
        .map_err(|e| format!("Config validation failed: {e}"))?;
    config
        .window
        .validate()
        .map_err(|e| format!("Config validation failed: {e}"))?;
    Ok(())
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Reads the process-wide configuration once at startup. A missing file means
/// defaults; a broken one is fatal.
pub fn load_config() -> Result<ClientConfig, ClientError> {
    let path = config_path();
    let mut config = if path.exists() {
        let config = load_config_from_path(&path).map_err(ClientError::Config)?;
        log::info!("Loaded config from {}", path.display());
        config
    } else {
        log::warn!("No config at {}, using defaults", path.display());
        ClientConfig::default()
    };
    config.apply_env_overrides(std::env::var(SERVER_URL_ENV).ok());
    Ok(config)
}
