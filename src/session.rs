//! Session controller
//!
//! Owns the ledger, the level catalog, and one engine per game. The
//! presentation shell forwards raw input and a monotonic clock here and
//! renders from the returned events: stat updates, toasts, flashes, the
//! level timer, and reward unlocks on first completion.

use crate::consts::{CLIPS_PER_LEVEL, DEFAULT_TIME_LIMIT_SECS};
use crate::engine::{
    BlocksEngine, Engine, EngineEvent, EscapeEngine, InputEvent, Millis, SequenceEngine,
    TapEngine,
};
use crate::error::Result;
use crate::ledger::{GameId, Ledger, Stats};
use crate::levels::{LevelCatalog, LevelDef};
use crate::platform::KvStore;
use crate::vault::{self, RewardClip};

/// Events the shell renders from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Transient notification
    Toast(String),
    /// Move-count-affecting stat update from the active engine
    Stats(Stats),
    /// Highlight a cell on the active game's grid
    Flash { cell: usize },
    /// Level timer display update
    ElapsedSecs(u64),
    /// The level's time limit passed; the timer stopped
    TimeUp,
    /// The active engine signalled completion (fires on replays too)
    Completed {
        game: GameId,
        level_id: String,
        stats: Stats,
    },
    /// First completion of this level: reward clips unlocked and persisted
    RewardUnlocked {
        game: GameId,
        level_id: String,
        clips: Vec<RewardClip>,
    },
}

/// The level currently being played
#[derive(Debug, Clone, Copy)]
struct ActiveLevel {
    game: GameId,
    index: usize,
    elapsed_secs: u64,
    /// Seconds allowed, when the level is timed
    time_limit: Option<u64>,
    /// Next whole-second timer tick; `None` once the limit passed
    next_second: Option<Millis>,
    /// The limit passed; input is dead until restart
    timed_out: bool,
}

/// Wires ledger, catalog, and engines together for one player
pub struct Session<S: KvStore> {
    store: S,
    ledger: Ledger,
    catalog: LevelCatalog,
    blocks: BlocksEngine,
    escape: EscapeEngine,
    tap: TapEngine,
    sequence: SequenceEngine,
    active: Option<ActiveLevel>,
    base_seed: u64,
    runs: u64,
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl<S: KvStore> Session<S> {
    /// Load the ledger from the store and stand up all four engines
    pub fn new(store: S, catalog: LevelCatalog, base_seed: u64) -> Self {
        let ledger = Ledger::load(&store);
        Self {
            store,
            ledger,
            catalog,
            blocks: BlocksEngine::new(),
            escape: EscapeEngine::new(),
            tap: TapEngine::new(),
            sequence: SequenceEngine::new(),
            active: None,
            base_seed,
            runs: 0,
        }
    }

    fn next_seed(&mut self) -> u64 {
        self.runs += 1;
        splitmix64(self.base_seed.wrapping_add(self.runs))
    }

    fn engine_mut(&mut self, game: GameId) -> &mut dyn Engine {
        match game {
            GameId::Blocks => &mut self.blocks,
            GameId::Escape => &mut self.escape,
            GameId::TapRush => &mut self.tap,
            GameId::Sequence => &mut self.sequence,
        }
    }

    /// Begin a level: fresh engine session, fresh timer, fresh seed
    pub fn start_level(
        &mut self,
        game: GameId,
        index: usize,
        now: Millis,
    ) -> Result<Vec<SessionEvent>> {
        let level = self.catalog.level(game, index)?;
        // Only the placement puzzle is time-limited
        let time_limit = match &level {
            LevelDef::Blocks(l) => Some(l.time_limit.unwrap_or(DEFAULT_TIME_LIMIT_SECS)),
            _ => None,
        };
        let seed = self.next_seed();
        let events = self.engine_mut(game).start_level(&level, seed, now)?;
        self.active = Some(ActiveLevel {
            game,
            index,
            elapsed_secs: 0,
            time_limit,
            next_second: Some(now + 1_000),
            timed_out: false,
        });
        let mut out = vec![SessionEvent::ElapsedSecs(0)];
        self.forward(events, &mut out);
        Ok(out)
    }

    /// Restart the current level from scratch
    pub fn restart(&mut self, now: Millis) -> Result<Vec<SessionEvent>> {
        match self.active {
            Some(active) => self.start_level(active.game, active.index, now),
            None => Ok(Vec::new()),
        }
    }

    /// Forward one input event to the active engine
    pub fn handle_input(&mut self, input: &InputEvent, now: Millis) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        let Some(active) = self.active.as_ref() else {
            return out;
        };
        // A timed-out level is over; only a restart revives it
        if active.timed_out {
            return out;
        }
        let game = active.game;
        let events = self.engine_mut(game).handle_input(input, now);
        self.forward(events, &mut out);
        out
    }

    /// Advance the level timer and the active engine's timers
    pub fn advance(&mut self, now: Millis) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        let Some(game) = self.active.as_ref().map(|a| a.game) else {
            return out;
        };
        if let Some(active) = self.active.as_mut() {
            while let Some(due) = active.next_second {
                if due > now {
                    break;
                }
                active.elapsed_secs += 1;
                out.push(SessionEvent::ElapsedSecs(active.elapsed_secs));
                if active
                    .time_limit
                    .is_some_and(|limit| active.elapsed_secs >= limit)
                {
                    active.next_second = None;
                    active.timed_out = true;
                    out.push(SessionEvent::TimeUp);
                    out.push(SessionEvent::Toast(
                        "Time up! Restart to try again.".to_string(),
                    ));
                } else {
                    active.next_second = Some(due + 1_000);
                }
            }
        }
        let events = self.engine_mut(game).advance(now);
        self.forward(events, &mut out);
        out
    }

    /// Erase all persisted progress
    pub fn reset(&mut self) -> Vec<SessionEvent> {
        self.ledger = Ledger::reset(&self.store);
        vec![SessionEvent::Toast("Progress reset.".to_string())]
    }

    /// First not-yet-completed level, scanning games in id order
    pub fn next_incomplete(&self) -> (GameId, usize) {
        for game in GameId::ALL {
            for index in 0..self.catalog.level_count(game) {
                if !self.ledger.is_completed(game, &vault::level_id(index)) {
                    return (game, index);
                }
            }
        }
        (GameId::Blocks, 0)
    }

    fn forward(&mut self, events: Vec<EngineEvent>, out: &mut Vec<SessionEvent>) {
        for event in events {
            match event {
                EngineEvent::Stats(stats) => out.push(SessionEvent::Stats(stats)),
                EngineEvent::Notice(message) => out.push(SessionEvent::Toast(message)),
                EngineEvent::Flash { cell } => out.push(SessionEvent::Flash { cell }),
                EngineEvent::Completed(stats) => self.complete(stats, out),
            }
        }
    }

    /// Record a completion: ledger, unlocks, persistence, reward events.
    /// Replays of an already-completed level change nothing.
    fn complete(&mut self, stats: Stats, out: &mut Vec<SessionEvent>) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let (game, index, elapsed) = (active.game, active.index, active.elapsed_secs);
        let level_id = vault::level_id(index);
        out.push(SessionEvent::Completed {
            game,
            level_id: level_id.clone(),
            stats,
        });
        if self.ledger.is_completed(game, &level_id) {
            return;
        }

        let mut snapshot = stats;
        snapshot.time_secs = Some(elapsed);
        self.ledger.mark_completed(game, &level_id, snapshot);
        self.ledger.unlock_clips(game, &level_id, CLIPS_PER_LEVEL);
        self.ledger.save(&self.store);
        out.push(SessionEvent::Toast("Level cleared. Vault unlocked.".to_string()));
        out.push(SessionEvent::RewardUnlocked {
            game,
            level_id,
            clips: vault::reward_clips(game, index),
        });
    }

    // Read-only views for the shell

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn current(&self) -> Option<(GameId, usize)> {
        self.active.as_ref().map(|a| (a.game, a.index))
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.active.as_ref().map(|a| a.elapsed_secs).unwrap_or(0)
    }

    pub fn blocks_engine(&self) -> &BlocksEngine {
        &self.blocks
    }

    pub fn escape_engine(&self) -> &EscapeEngine {
        &self.escape
    }

    pub fn tap_engine(&self) -> &TapEngine {
        &self.tap
    }

    pub fn sequence_engine(&self) -> &SequenceEngine {
        &self.sequence
    }
}
