//! Reaction-timing game (Neon Tap Rush)
//!
//! One pad on a rows x cols grid is active. It relocates on a fixed 700 ms
//! cadence and immediately after every correct tap, never landing on its
//! previous position. Hits count toward the level target; misses are
//! uncapped and only tracked. The cadence deadline lives in the session
//! struct, so restarting the level cancels it deterministically.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::TAP_CADENCE_MS;
use crate::error::{Result, VaultError};
use crate::ledger::Stats;
use crate::levels::{LevelDef, TapLevel};

use super::{Engine, EngineEvent, InputEvent, Millis, session_rng};

/// Transient per-level state, rebuilt on every `start_level`
#[derive(Debug)]
struct TapSession {
    level: TapLevel,
    active: usize,
    hits: u32,
    misses: u32,
    /// Next scheduled relocation; `None` once the level is done
    next_shift: Option<Millis>,
    rng: Pcg32,
    finished: bool,
}

impl TapSession {
    /// Move the active pad, guaranteed away from its previous position
    fn relocate(&mut self) {
        let pads = self.level.pad_count();
        let mut next = self.rng.random_range(0..pads);
        if next == self.active {
            next = (next + 1) % pads;
        }
        self.active = next;
    }
}

/// Reaction-timing engine
#[derive(Debug, Default)]
pub struct TapEngine {
    session: Option<TapSession>,
}

impl TapEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active pad index
    pub fn active_cell(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.active)
    }

    /// Hit and miss counters
    pub fn score(&self) -> (u32, u32) {
        self.session
            .as_ref()
            .map(|s| (s.hits, s.misses))
            .unwrap_or((0, 0))
    }
}

impl Engine for TapEngine {
    fn start_level(
        &mut self,
        level: &LevelDef,
        seed: u64,
        now: Millis,
    ) -> Result<Vec<EngineEvent>> {
        let LevelDef::Tap(level) = level else {
            return Err(VaultError::LevelMismatch {
                expected: "reaction-timing",
            });
        };
        let mut session = TapSession {
            level: level.clone(),
            active: 0,
            hits: 0,
            misses: 0,
            next_shift: Some(now + TAP_CADENCE_MS),
            rng: session_rng(seed),
            finished: false,
        };
        session.relocate();
        let events = vec![
            EngineEvent::Stats(Stats::moves(0)),
            EngineEvent::Flash { cell: session.active },
        ];
        self.session = Some(session);
        Ok(events)
    }

    fn handle_input(&mut self, input: &InputEvent, _now: Millis) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let Some(session) = self.session.as_mut() else {
            return events;
        };
        if session.finished {
            return events;
        }
        let InputEvent::Tap { cell } = *input else {
            return events;
        };

        if cell == session.active {
            session.hits += 1;
            events.push(EngineEvent::Stats(Stats::moves(session.hits)));
            if session.hits >= session.level.target_hits {
                session.finished = true;
                session.next_shift = None;
                events.push(EngineEvent::Notice("Target streak complete.".to_string()));
                events.push(EngineEvent::Completed(Stats::moves(session.hits)));
            } else {
                session.relocate();
                events.push(EngineEvent::Flash { cell: session.active });
            }
        } else {
            session.misses += 1;
        }
        events
    }

    fn advance(&mut self, now: Millis) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let Some(session) = self.session.as_mut() else {
            return events;
        };
        // The cadence keeps its own rhythm: a late advance catches up one
        // relocation per elapsed interval
        while let Some(due) = session.next_shift {
            if due > now {
                break;
            }
            session.relocate();
            events.push(EngineEvent::Flash { cell: session.active });
            session.next_shift = Some(due + TAP_CADENCE_MS);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(rows: usize, cols: usize, target_hits: u32) -> LevelDef {
        LevelDef::Tap(TapLevel {
            rows,
            cols,
            target_hits,
            goal_text: None,
        })
    }

    #[test]
    fn test_relocation_never_repeats() {
        let mut engine = TapEngine::new();
        engine.start_level(&level(3, 3, 100), 42, 0).unwrap();
        let mut prev = engine.active_cell().unwrap();
        for i in 1..200u64 {
            engine.advance(i * TAP_CADENCE_MS);
            let cur = engine.active_cell().unwrap();
            assert_ne!(cur, prev);
            prev = cur;
        }
    }

    #[test]
    fn test_tap_relocates_immediately() {
        let mut engine = TapEngine::new();
        engine.start_level(&level(3, 3, 10), 7, 0).unwrap();
        let active = engine.active_cell().unwrap();
        let events = engine.handle_input(&InputEvent::Tap { cell: active }, 10);
        assert_ne!(engine.active_cell().unwrap(), active);
        assert!(events.contains(&EngineEvent::Stats(Stats::moves(1))));
    }

    #[test]
    fn test_misses_are_uncapped_and_silent() {
        let mut engine = TapEngine::new();
        engine.start_level(&level(3, 3, 5), 7, 0).unwrap();
        let active = engine.active_cell().unwrap();
        let wrong = (active + 1) % 9;
        for _ in 0..50 {
            let events = engine.handle_input(&InputEvent::Tap { cell: wrong }, 10);
            assert!(events.is_empty());
        }
        assert_eq!(engine.score(), (0, 50));
        // The active pad did not move on misses
        assert_eq!(engine.active_cell().unwrap(), active);
    }

    #[test]
    fn test_five_hits_complete_the_level() {
        let mut engine = TapEngine::new();
        engine.start_level(&level(3, 3, 5), 99, 0).unwrap();
        let mut completed = Vec::new();
        for _ in 0..5 {
            let active = engine.active_cell().unwrap();
            for event in engine.handle_input(&InputEvent::Tap { cell: active }, 10) {
                if let EngineEvent::Completed(stats) = event {
                    completed.push(stats);
                }
            }
        }
        assert_eq!(completed, vec![Stats::moves(5)]);
        assert_eq!(engine.score(), (5, 0));

        // Timer cancelled on completion: no more relocations
        let active = engine.active_cell().unwrap();
        assert!(engine.advance(1_000_000).is_empty());
        assert_eq!(engine.active_cell().unwrap(), active);
        // And further taps are ignored
        assert!(engine.handle_input(&InputEvent::Tap { cell: active }, 10).is_empty());
    }

    #[test]
    fn test_cadence_catches_up_after_a_gap() {
        let mut engine = TapEngine::new();
        engine.start_level(&level(3, 3, 100), 5, 0).unwrap();
        // Three intervals pass in one advance
        let events = engine.advance(3 * TAP_CADENCE_MS + 1);
        let flashes = events
            .iter()
            .filter(|e| matches!(e, EngineEvent::Flash { .. }))
            .count();
        assert_eq!(flashes, 3);
    }

    #[test]
    fn test_restart_discards_pending_cadence() {
        let mut engine = TapEngine::new();
        engine.start_level(&level(3, 3, 100), 5, 0).unwrap();
        // Restart at t=500; the old t=700 deadline must be gone
        engine.start_level(&level(3, 3, 100), 6, 500).unwrap();
        assert!(engine.advance(700).is_empty());
        assert_eq!(engine.advance(1200).len(), 1);
    }

    #[test]
    fn test_deterministic_for_a_seed() {
        let mut a = TapEngine::new();
        let mut b = TapEngine::new();
        a.start_level(&level(4, 4, 100), 1234, 0).unwrap();
        b.start_level(&level(4, 4, 100), 1234, 0).unwrap();
        for i in 1..50u64 {
            a.advance(i * TAP_CADENCE_MS);
            b.advance(i * TAP_CADENCE_MS);
            assert_eq!(a.active_cell(), b.active_cell());
        }
    }
}
