use crate::types::LngLat;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub service: ServiceConfig,
    #[serde(default)]
    pub map: MapConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Base URL of the scoring service, e.g. "http://localhost:8000".
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    #[serde(default = "default_center")]
    pub center: LngLat,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default = "default_style")]
    pub style: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            center: default_center(),
            zoom: default_zoom(),
            style: default_style(),
        }
    }
}

fn default_center() -> LngLat {
    // Helsinki
    LngLat::new(24.941, 60.169)
}

fn default_zoom() -> f64 {
    10.0
}

fn default_style() -> String {
    "standard".to_string()
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
