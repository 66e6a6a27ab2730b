use mines3d_protocol::{Settings, SettingsSaved};
use std::path::{Path, PathBuf};

use crate::*;

/// Renderer orientation settings kept as a JSON file.
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `GET /api/settings`, defaults when nothing was saved yet.
    pub fn load(&self) -> Result<Settings> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    /// `POST /api/settings`
    pub fn save(&self, settings: &Settings) -> Result<SettingsSaved> {
        write_json(&self.path, settings)?;
        Ok(SettingsSaved::default())
    }
}
