//! External level-definition data model
//!
//! Each game ships one JSON document of the form `{"levels": [...]}`,
//! fetched once at startup and immutable afterwards. Field names stay
//! camelCase to match the shipped data files.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};
use crate::ledger::GameId;

/// Win goal for a placement-puzzle level
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BlocksGoal {
    #[serde(default)]
    pub score: u64,
    #[serde(default)]
    pub lines: u32,
}

/// One placement-puzzle level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlocksLevel {
    pub goal: BlocksGoal,
    /// Piece budget before the level stalls
    pub max_pieces: u32,
    /// Time limit in seconds; the shell default applies when absent
    #[serde(default)]
    pub time_limit: Option<u64>,
    #[serde(default)]
    pub goal_text: Option<String>,
}

/// Axis-aligned block on the sliding-block grid.
///
/// The block slides horizontally when it is wider than tall, vertically
/// otherwise. `id == "X"` marks the escape target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRect {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl BlockRect {
    /// Id of the escape target block
    pub const TARGET_ID: &'static str = "X";

    pub fn is_target(&self) -> bool {
        self.id == Self::TARGET_ID
    }

    /// Travel axis: horizontal iff wider than tall
    pub fn horizontal(&self) -> bool {
        self.w > self.h
    }

    /// Whether a grid cell falls inside this block
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    /// Whether this block, moved to `(x, y)`, would overlap `other`
    pub fn overlaps_at(&self, x: i32, y: i32, other: &BlockRect) -> bool {
        x < other.x + other.w
            && x + self.w > other.x
            && y < other.y + other.h
            && y + self.h > other.y
    }
}

/// One sliding-block level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscapeLevel {
    pub blocks: Vec<BlockRect>,
    #[serde(default)]
    pub goal_text: Option<String>,
}

/// One reaction-timing level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TapLevel {
    pub rows: usize,
    pub cols: usize,
    pub target_hits: u32,
    #[serde(default)]
    pub goal_text: Option<String>,
}

impl TapLevel {
    pub fn pad_count(&self) -> usize {
        self.rows * self.cols
    }
}

/// One sequence-memory level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceLevel {
    pub rows: usize,
    pub cols: usize,
    pub sequence_length: usize,
    /// How long each replay flash stays visible (milliseconds)
    pub speed_ms: u64,
    #[serde(default)]
    pub goal_text: Option<String>,
}

impl SequenceLevel {
    pub fn pad_count(&self) -> usize {
        self.rows * self.cols
    }
}

/// A level definition dispatched to an engine
#[derive(Debug, Clone)]
pub enum LevelDef {
    Blocks(BlocksLevel),
    Escape(EscapeLevel),
    Tap(TapLevel),
    Sequence(SequenceLevel),
}

impl LevelDef {
    /// Goal text shown in the shell header
    pub fn goal_text(&self) -> Option<&str> {
        match self {
            LevelDef::Blocks(l) => l.goal_text.as_deref(),
            LevelDef::Escape(l) => l.goal_text.as_deref(),
            LevelDef::Tap(l) => l.goal_text.as_deref(),
            LevelDef::Sequence(l) => l.goal_text.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GameDoc<T> {
    levels: Vec<T>,
}

/// All level definitions for the four games, parsed once at startup
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    blocks: Vec<BlocksLevel>,
    escape: Vec<EscapeLevel>,
    tap: Vec<TapLevel>,
    sequence: Vec<SequenceLevel>,
}

impl LevelCatalog {
    /// Parse the four per-game documents (each `{"levels": [...]}`)
    pub fn from_json_docs(
        blocks: &str,
        escape: &str,
        tap: &str,
        sequence: &str,
    ) -> Result<Self> {
        let blocks: GameDoc<BlocksLevel> = serde_json::from_str(blocks)?;
        let escape: GameDoc<EscapeLevel> = serde_json::from_str(escape)?;
        let tap: GameDoc<TapLevel> = serde_json::from_str(tap)?;
        let sequence: GameDoc<SequenceLevel> = serde_json::from_str(sequence)?;
        let catalog = Self {
            blocks: blocks.levels,
            escape: escape.levels,
            tap: tap.levels,
            sequence: sequence.levels,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Level documents are external input; values the engines cannot play
    /// are rejected here rather than at runtime.
    fn validate(&self) -> Result<()> {
        let invalid = |game, index, reason| VaultError::InvalidLevel { game, index, reason };
        for (index, level) in self.tap.iter().enumerate() {
            // The active pad must always have somewhere else to go
            if level.pad_count() < 2 {
                return Err(invalid(GameId::TapRush, index, "needs at least two pads"));
            }
        }
        for (index, level) in self.sequence.iter().enumerate() {
            if level.pad_count() == 0 {
                return Err(invalid(GameId::Sequence, index, "needs at least one pad"));
            }
            if level.sequence_length == 0 {
                return Err(invalid(GameId::Sequence, index, "empty sequence"));
            }
        }
        Ok(())
    }

    /// Level definition for one game/index pair
    pub fn level(&self, game: GameId, index: usize) -> Result<LevelDef> {
        let missing = || VaultError::MissingLevel { game, index };
        Ok(match game {
            GameId::Blocks => {
                LevelDef::Blocks(self.blocks.get(index).ok_or_else(missing)?.clone())
            }
            GameId::Escape => {
                LevelDef::Escape(self.escape.get(index).ok_or_else(missing)?.clone())
            }
            GameId::TapRush => LevelDef::Tap(self.tap.get(index).ok_or_else(missing)?.clone()),
            GameId::Sequence => {
                LevelDef::Sequence(self.sequence.get(index).ok_or_else(missing)?.clone())
            }
        })
    }

    pub fn level_count(&self, game: GameId) -> usize {
        match game {
            GameId::Blocks => self.blocks.len(),
            GameId::Escape => self.escape.len(),
            GameId::TapRush => self.tap.len(),
            GameId::Sequence => self.sequence.len(),
        }
    }

    /// Total levels across all four games
    pub fn total_levels(&self) -> usize {
        GameId::ALL
            .iter()
            .map(|game| self.level_count(*game))
            .sum()
    }
}
