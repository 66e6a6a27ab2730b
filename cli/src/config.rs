use anyhow::Context;
use mines3d_core::Difficulty;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Contents of the optional `mines3d.toml`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub scores_path: PathBuf,
    pub settings_path: PathBuf,
    pub difficulty: Difficulty,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scores_path: PathBuf::from("data/scores.json"),
            settings_path: PathBuf::from("settings.json"),
            difficulty: Difficulty::default(),
        }
    }
}

impl Config {
    /// Reads the file if it exists, falling back to defaults otherwise.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    fn parse(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
