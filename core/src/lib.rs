#![no_std]

extern crate alloc;

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use generator::*;
pub use ledger::*;
pub use reveal::*;
pub use scoring::*;
pub use session::*;
pub use types::*;

mod board;
mod error;
mod generator;
mod ledger;
mod reveal;
mod scoring;
mod session;
mod types;

/// Preset board configurations offered by the difficulty selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub const fn config(self) -> GameConfig {
        match self {
            Self::Easy => GameConfig::new_unchecked((8, 8), 10),
            Self::Medium => GameConfig::new_unchecked((16, 16), 40),
            Self::Hard => GameConfig::new_unchecked((24, 24), 99),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Easy
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(GameError::UnknownDifficulty)
    }
}

impl From<Difficulty> for GameConfig {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.config()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
    /// Number of stacked board layers, only used to partition the leaderboard.
    pub levels: u8,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self {
            size,
            mines,
            levels: 1,
        }
    }

    /// Validated configuration: the board must be non-empty and leave room for the safe zone
    /// around a first click anywhere on it.
    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::EmptyBoard);
        }

        let config = Self::new_unchecked(size, mines);
        let available = config.total_cells() - config.max_safe_zone();
        if mines > available {
            return Err(GameError::InsufficientSpace {
                requested: mines,
                available,
            });
        }
        Ok(config)
    }

    pub const fn with_levels(mut self, levels: u8) -> Self {
        self.levels = if levels == 0 { 1 } else { levels };
        self
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cell_count(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }

    /// Largest safe zone a first click can produce on this board.
    const fn max_safe_zone(&self) -> CellCount {
        let x = if self.size.0 < 3 { self.size.0 } else { 3 };
        let y = if self.size.1 < 3 { self.size.1 } else { 3 };
        mult(x, y)
    }

    /// The preset this configuration matches exactly, if any.
    pub fn difficulty(&self) -> Option<Difficulty> {
        Difficulty::ALL
            .into_iter()
            .find(|difficulty| difficulty.config() == *self)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Difficulty::default().config()
    }
}

/// Result of a right click.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    /// Off the board, on a revealed cell, or the game is over.
    NoChange,
    /// The flag on the cell was placed or removed.
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Result of a left click.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    /// Cells were opened and the game goes on.
    Revealed,
    HitMine,
    /// The last safe cell was opened.
    Won,
}

impl RevealOutcome {
    /// Whether this click moved the game into a terminal state.
    pub const fn ends_game(self) -> bool {
        matches!(self, Self::HitMine | Self::Won)
    }
}
