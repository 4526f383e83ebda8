//! Neon Vault - four casual mini-games behind a shared reward vault
//!
//! Core modules:
//! - `ledger`: Persistent completion/unlock state
//! - `levels`: External level-definition data model
//! - `engine`: The four game state machines behind a common contract
//! - `session`: Wires ledger, levels, and engines together
//! - `vault`: Reward clip naming and unlock listing
//! - `platform`: Storage and logging abstraction (LocalStorage on web)
//!
//! The crate is the logic core of the arcade: a thin presentation layer
//! feeds it input events and a monotonic clock, and renders from the
//! events and state it exposes. Nothing here touches the DOM.

pub mod engine;
pub mod error;
pub mod ledger;
pub mod levels;
pub mod platform;
pub mod session;
pub mod vault;

pub use engine::{Engine, EngineEvent, InputEvent, Millis};
pub use error::{Result, VaultError};
pub use ledger::{GameId, Ledger, Stats};
pub use session::{Session, SessionEvent};

/// Wasm entry: logging and the panic hook must be in place before the
/// shell constructs a [`Session`]
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_init() {
    platform::init_logging();
}

/// Game configuration constants
pub mod consts {
    /// Placement-puzzle board is square, this many cells per side
    pub const BOARD_SIZE: usize = 8;
    /// Sliding-block grid is square, this many cells per side
    pub const ESCAPE_GRID_SIZE: i32 = 6;
    /// Shapes offered at once in the placement puzzle
    pub const PIECE_POOL_SIZE: usize = 3;
    /// Points awarded per cleared row or column
    pub const LINE_CLEAR_POINTS: u64 = 10;

    /// Reaction game target relocation cadence
    pub const TAP_CADENCE_MS: u64 = 700;
    /// Pause between sequence replay flashes, on top of the flash itself
    pub const REPLAY_GAP_MS: u64 = 120;

    /// Reward clips unlocked per completed level
    pub const CLIPS_PER_LEVEL: u32 = 3;
    /// Fallback time limit for the placement puzzle (seconds)
    pub const DEFAULT_TIME_LIMIT_SECS: u64 = 60;
}
