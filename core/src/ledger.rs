use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::*;

/// Ranked entries kept per board size.
pub const LEDGER_CAPACITY: usize = 10;

/// Longest accepted set of initials, in characters.
pub const INITIALS_LEN: usize = 3;

/// Player initials: trimmed, upper-cased and cut to three characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Initials(String);

impl Initials {
    pub fn new(raw: &str) -> Result<Self> {
        let initials: String = raw
            .trim()
            .chars()
            .flat_map(char::to_uppercase)
            .take(INITIALS_LEN)
            .collect();
        if initials.is_empty() {
            Err(GameError::InvalidInitials)
        } else {
            Ok(Self(initials))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Initials {
    type Error = GameError;

    fn try_from(raw: String) -> Result<Self> {
        Self::new(&raw)
    }
}

impl From<Initials> for String {
    fn from(initials: Initials) -> Self {
        initials.0
    }
}

impl fmt::Display for Initials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Leaderboard partition, `"{width}x{height}"` with optional level and mine-count suffixes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardSizeKey(String);

impl BoardSizeKey {
    pub fn new((width, height): Coord2, levels: u8) -> Self {
        if levels > 1 {
            Self(alloc::format!("{width}x{height}x{levels}"))
        } else {
            Self(alloc::format!("{width}x{height}"))
        }
    }

    /// Key for a game configuration. Presets use the plain size key; every other
    /// configuration carries its mine count, so boards of one size but different density never
    /// share a leaderboard.
    pub fn for_config(config: &GameConfig) -> Self {
        let key = Self::new(config.size, config.levels);
        let is_preset = Difficulty::ALL
            .into_iter()
            .map(Difficulty::config)
            .any(|preset| preset.size == config.size && preset.mines == config.mines);
        if is_preset {
            key
        } else {
            Self(alloc::format!("{}-{}m", key.0, config.mines))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl GameConfig {
    pub fn board_size_key(&self) -> BoardSizeKey {
        BoardSizeKey::for_config(self)
    }
}

impl FromStr for BoardSizeKey {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().to_string()))
    }
}

impl From<&str> for BoardSizeKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl fmt::Display for BoardSizeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub initials: Initials,
    pub elapsed_secs: u32,
    pub board_size: BoardSizeKey,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
    /// Client-generated id used to drop resubmissions of the same result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<u64>,
}

/// Whether `elapsed_secs` would enter the ranked list `top`.
pub fn qualifies(top: &[ScoreEntry], elapsed_secs: u32) -> bool {
    top.get(LEDGER_CAPACITY - 1)
        .is_none_or(|last| elapsed_secs < last.elapsed_secs)
}

/// Sorts ascending by time, keeping insertion order among ties, and drops everything past
/// the capacity.
fn rank(entries: &mut Vec<ScoreEntry>) {
    entries.sort_by_key(|entry| entry.elapsed_secs);
    entries.truncate(LEDGER_CAPACITY);
}

/// Top times per board size. Ranking only, persistence is up to the caller.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    boards: HashMap<BoardSizeKey, Vec<ScoreEntry>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads entries in stored order and ranks every board.
    pub fn from_entries(entries: impl IntoIterator<Item = ScoreEntry>) -> Self {
        let mut boards: HashMap<BoardSizeKey, Vec<ScoreEntry>> = HashMap::new();
        for entry in entries {
            boards
                .entry(entry.board_size.clone())
                .or_default()
                .push(entry);
        }
        for entries in boards.values_mut() {
            rank(entries);
        }
        Self { boards }
    }

    pub fn top_n(&self, board_size: &BoardSizeKey, n: usize) -> &[ScoreEntry] {
        let entries = self
            .boards
            .get(board_size)
            .map(Vec::as_slice)
            .unwrap_or_default();
        &entries[..n.min(entries.len())]
    }

    pub fn top(&self, board_size: &BoardSizeKey) -> &[ScoreEntry] {
        self.top_n(board_size, LEDGER_CAPACITY)
    }

    pub fn qualifies(&self, board_size: &BoardSizeKey, elapsed_secs: u32) -> bool {
        qualifies(self.top(board_size), elapsed_secs)
    }

    /// Ranks `entry` into its board and returns the updated list.
    pub fn submit(&mut self, entry: ScoreEntry) -> &[ScoreEntry] {
        let entries = self.boards.entry(entry.board_size.clone()).or_default();

        let duplicate = entry.submission_id.is_some()
            && entries
                .iter()
                .any(|existing| existing.submission_id == entry.submission_id);
        if duplicate {
            log::debug!(
                "Ignoring resubmitted score {:?} for {}",
                entry.submission_id,
                entry.board_size
            );
        } else {
            log::debug!(
                "Submitting {} in {}s for {}",
                entry.initials,
                entry.elapsed_secs,
                entry.board_size
            );
            entries.push(entry);
            rank(entries);
        }

        entries
    }

    pub fn board_sizes(&self) -> impl Iterator<Item = &BoardSizeKey> {
        self.boards.keys()
    }

    /// Every kept entry, grouped by board, each group in rank order.
    pub fn entries(&self) -> impl Iterator<Item = &ScoreEntry> {
        self.boards.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.boards.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
