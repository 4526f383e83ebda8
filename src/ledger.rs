//! Progress and unlock ledger
//!
//! Persisted to LocalStorage as a single JSON snapshot under one namespaced
//! key. Tracks per-level completion, best stats, and unlocked reward clips.
//! Loading fails open: missing or corrupt data yields the default ledger.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::platform::KvStore;

/// The four mini-games, keyed in persisted data by their short ids
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum GameId {
    /// Neon Blocks - placement puzzle
    #[serde(rename = "A")]
    Blocks,
    /// Escape Grid - sliding-block puzzle
    #[serde(rename = "B")]
    Escape,
    /// Neon Tap Rush - reaction timing
    #[serde(rename = "C")]
    TapRush,
    /// Neon Sequence - sequence memory
    #[serde(rename = "D")]
    Sequence,
}

impl GameId {
    /// All games, in shell display order
    pub const ALL: [GameId; 4] = [
        GameId::Blocks,
        GameId::Escape,
        GameId::TapRush,
        GameId::Sequence,
    ];

    /// Short id used in ledger keys and asset paths
    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Blocks => "A",
            GameId::Escape => "B",
            GameId::TapRush => "C",
            GameId::Sequence => "D",
        }
    }

    /// Display name for the shell
    pub fn name(&self) -> &'static str {
        match self {
            GameId::Blocks => "Neon Blocks",
            GameId::Escape => "Escape Grid",
            GameId::TapRush => "Neon Tap Rush",
            GameId::Sequence => "Neon Sequence",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "A" => Some(GameId::Blocks),
            "B" => Some(GameId::Escape),
            "C" => Some(GameId::TapRush),
            "D" => Some(GameId::Sequence),
            _ => None,
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stats snapshot attached to a completion.
///
/// `moves` is universal; the optional fields only apply to some games
/// (score/lines to the placement puzzle, time to timed levels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub moves: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_secs: Option<u64>,
}

impl Stats {
    /// Stats carrying only a move count
    pub fn moves(moves: u32) -> Self {
        Self {
            moves,
            ..Self::default()
        }
    }
}

/// Persistent progress ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    /// `completed[game][level_id] -> true` once a level has been cleared
    #[serde(default)]
    completed: BTreeMap<GameId, BTreeMap<String, bool>>,
    /// Best stats snapshot per completed level
    #[serde(default)]
    best: BTreeMap<GameId, BTreeMap<String, Stats>>,
    /// `"{game}_{level_id}"` -> unlocked clip indices (1-based)
    #[serde(default)]
    unlocked: BTreeMap<String, Vec<u32>>,
}

impl Default for Ledger {
    fn default() -> Self {
        let mut ledger = Self {
            completed: BTreeMap::new(),
            best: BTreeMap::new(),
            unlocked: BTreeMap::new(),
        };
        ledger.ensure_games();
        ledger
    }
}

impl Ledger {
    /// Storage key for the persisted snapshot
    pub const STORAGE_KEY: &'static str = "neon_vault_progress";

    /// Guarantee an entry exists for every game, whatever was persisted
    fn ensure_games(&mut self) {
        for game in GameId::ALL {
            self.completed.entry(game).or_default();
            self.best.entry(game).or_default();
        }
    }

    fn unlock_key(game: GameId, level_id: &str) -> String {
        format!("{}_{}", game.as_str(), level_id)
    }

    /// Load the ledger from the store, merged over defaults.
    ///
    /// Corrupt data is non-fatal: the ledger resets to defaults and the
    /// condition is logged.
    pub fn load(store: &dyn KvStore) -> Self {
        let Some(raw) = store.get(Self::STORAGE_KEY) else {
            log::info!("No saved progress, starting fresh");
            return Self::default();
        };
        match serde_json::from_str::<Ledger>(&raw) {
            Ok(mut ledger) => {
                ledger.ensure_games();
                log::info!(
                    "Loaded progress ({} levels completed)",
                    ledger.total_completed()
                );
                ledger
            }
            Err(err) => {
                log::warn!("Progress reset due to corrupt save: {err}");
                Self::default()
            }
        }
    }

    /// Persist the full ledger in a single store write
    pub fn save(&self, store: &dyn KvStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                store.set(Self::STORAGE_KEY, &json);
                log::info!("Progress saved");
            }
            Err(err) => log::warn!("Failed to serialize progress: {err}"),
        }
    }

    /// Erase persisted state and return the default ledger
    pub fn reset(store: &dyn KvStore) -> Self {
        store.remove(Self::STORAGE_KEY);
        Self::default()
    }

    /// Record a completion and its stats snapshot. Idempotent per level.
    pub fn mark_completed(&mut self, game: GameId, level_id: &str, stats: Stats) {
        self.completed
            .entry(game)
            .or_default()
            .insert(level_id.to_string(), true);
        self.best
            .entry(game)
            .or_default()
            .insert(level_id.to_string(), stats);
    }

    pub fn is_completed(&self, game: GameId, level_id: &str) -> bool {
        self.completed
            .get(&game)
            .and_then(|levels| levels.get(level_id))
            .copied()
            .unwrap_or(false)
    }

    /// Best stats recorded for a completed level
    pub fn best(&self, game: GameId, level_id: &str) -> Option<Stats> {
        self.best
            .get(&game)
            .and_then(|levels| levels.get(level_id))
            .copied()
    }

    /// Mark `count` reward clips unlocked for a game/level pair
    pub fn unlock_clips(&mut self, game: GameId, level_id: &str, count: u32) {
        self.unlocked
            .insert(Self::unlock_key(game, level_id), (1..=count).collect());
    }

    pub fn is_unlocked(&self, game: GameId, level_id: &str) -> bool {
        self.unlocked.contains_key(&Self::unlock_key(game, level_id))
    }

    /// Unlocked clip indices for a game/level pair
    pub fn unlocked_clips(&self, game: GameId, level_id: &str) -> &[u32] {
        self.unlocked
            .get(&Self::unlock_key(game, level_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total unlocked clips across the whole vault
    pub fn unlocked_count(&self) -> usize {
        self.unlocked.values().map(Vec::len).sum()
    }

    /// Completed level count for one game
    pub fn completed_count(&self, game: GameId) -> usize {
        self.completed
            .get(&game)
            .map(|levels| levels.values().filter(|done| **done).count())
            .unwrap_or(0)
    }

    /// Completed level count across all games
    pub fn total_completed(&self) -> usize {
        GameId::ALL
            .iter()
            .map(|game| self.completed_count(*game))
            .sum()
    }
}
