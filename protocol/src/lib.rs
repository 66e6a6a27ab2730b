//! JSON bodies exchanged with the score and settings endpoints.

use serde::{Deserialize, Serialize};

pub const SCORES_PATH: &str = "/api/scores";
pub const SETTINGS_PATH: &str = "/api/settings";

pub const FETCH_SCORES_FAILED: &str = "Failed to fetch scores";
pub const SAVE_SCORE_FAILED: &str = "Failed to save score";
pub const LOAD_SETTINGS_FAILED: &str = "Failed to load settings";
pub const SAVE_SETTINGS_FAILED: &str = "Failed to save settings";
pub const SETTINGS_SAVED: &str = "Settings saved";

/// One leaderboard row as sent over the wire and kept in the score file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    /// Up to three upper-case initials.
    pub name: String,
    /// Whole seconds.
    pub time: u32,
    pub board_size: String,
    /// ISO-8601 timestamp. Assigned by the store when a submission leaves it out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<u64>,
}

/// Query string of `GET /api/scores`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreQuery {
    pub board_size: String,
}

/// Layout of the persisted score file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreFile {
    #[serde(default)]
    pub scores: Vec<ScoreRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Rotation vector in radians, `[x, y, z]`.
pub type Rotation = [f64; 3];

/// Board orientation tuning used by the renderer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub board_rotation: Rotation,
    #[serde(default)]
    pub cell_rotation: Rotation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsSaved {
    pub message: String,
}

impl Default for SettingsSaved {
    fn default() -> Self {
        Self {
            message: SETTINGS_SAVED.to_string(),
        }
    }
}
