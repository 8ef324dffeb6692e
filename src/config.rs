//! Application configuration.
//!
//! Loaded from `config.toml` in the platform config directory. Every field
//! has a default so a missing or partial file is never an error.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

const CONFIG_DIR: &str = "ghdash";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Catppuccin flavor name: "mocha", "macchiato", "frappe" or "latte".
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Frames per second for rendering.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    /// Ticks per second for animations (spinner, cursor blink).
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            frame_rate: default_frame_rate(),
            tick_rate: default_tick_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Issues requested per result page.
    #[serde(default = "default_page_size")]
    pub page_size: u8,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

fn default_theme() -> String {
    "mocha".to_string()
}

const fn default_frame_rate() -> f64 {
    30.0
}

const fn default_tick_rate() -> f64 {
    4.0
}

const fn default_page_size() -> u8 {
    50
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR).join(CONFIG_FILE))
}

pub fn load() -> color_eyre::Result<AppConfig> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            debug!("No config directory found, using defaults");
            return Ok(AppConfig::default());
        }
    };

    if !path.exists() {
        debug!("Config file not found at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&path)?;
    let config: AppConfig = toml::from_str(&content)?;
    debug!("Loaded config from {:?}", path);
    Ok(config)
}
