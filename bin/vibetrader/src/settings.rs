use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use engine::{EngineConfig, SourceConfig};
use strategy::StrategyConfig;

/// Contents of the TOML run file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default, rename = "strategy")]
    pub strategies: Vec<StrategyConfig>,
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at '{}'", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config at '{}'", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.engine.validate()?;
        Ok(settings)
    }
}
