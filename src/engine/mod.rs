//! Game engines behind a common lifecycle contract
//!
//! Each engine is a self-contained state machine. `start_level` rebuilds the
//! whole session from a level definition and a seed; afterwards the host
//! feeds it discrete input events and clock readings and consumes the events
//! it returns. Nothing runs between calls: timers are absolute deadlines
//! stored in session state and fired by `advance`, so replacing the session
//! on restart cancels every pending tick by construction.

pub mod blocks;
pub mod escape;
pub mod sequence;
pub mod tap;

pub use blocks::BlocksEngine;
pub use escape::EscapeEngine;
pub use sequence::SequenceEngine;
pub use tap::TapEngine;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::error::Result;
use crate::ledger::Stats;
use crate::levels::LevelDef;

/// Milliseconds on the host's monotonic clock
pub type Millis = u64;

/// A discrete input event from the presentation surface.
///
/// Coordinates are grid cells; the surface converts from pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Choose a piece from the placement-puzzle pool
    SelectPiece(usize),
    /// Tap a board cell (placement target)
    CellTap { x: usize, y: usize },
    /// Tap a pad by flat index (reaction and sequence games)
    Tap { cell: usize },
    /// Begin a drag gesture at a grid cell
    PointerDown { x: i32, y: i32 },
    /// Drag continues over a grid cell
    PointerMove { x: i32, y: i32 },
    /// Drag gesture released
    PointerUp,
}

/// Events an engine hands back to the session controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Move-count-affecting change; fired on every such event
    Stats(Stats),
    /// Level cleared; fired at most once per started level
    Completed(Stats),
    /// Transient user-facing notice (toast)
    Notice(String),
    /// Highlight a cell (sequence replay/echo, reaction target move)
    Flash { cell: usize },
}

/// Uniform engine lifecycle contract shared by all four games
pub trait Engine {
    /// Reset all transient state and begin the given level.
    ///
    /// Fails with [`crate::VaultError::LevelMismatch`] when handed another
    /// game's level definition.
    fn start_level(&mut self, level: &LevelDef, seed: u64, now: Millis)
    -> Result<Vec<EngineEvent>>;

    /// Apply one input event
    fn handle_input(&mut self, input: &InputEvent, now: Millis) -> Vec<EngineEvent>;

    /// Advance session timers to `now`
    fn advance(&mut self, now: Millis) -> Vec<EngineEvent>;
}

/// Seeded per-session RNG; all engine randomness goes through this
pub(crate) fn session_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}
