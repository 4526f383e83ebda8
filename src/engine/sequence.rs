//! Sequence-memory game (Neon Sequence)
//!
//! A seeded sequence of pad indices replays as a timed flash animation;
//! input is rejected until the replay finishes. The player then repeats the
//! sequence one tap at a time: a wrong tap ends the attempt, completing the
//! whole sequence clears the level. Replay deadlines live in the session
//! struct, so restarting cancels any pending flash.

use rand::Rng;

use crate::consts::REPLAY_GAP_MS;
use crate::error::{Result, VaultError};
use crate::ledger::Stats;
use crate::levels::{LevelDef, SequenceLevel};

use super::{Engine, EngineEvent, InputEvent, Millis, session_rng};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Non-interactive replay; `step` flashes when `next_at` passes
    Replaying { step: usize, next_at: Millis },
    /// Replay done, taps accepted
    Accepting,
    /// Wrong tap ended the attempt; restart required
    Failed,
    /// Sequence completed
    Done,
}

/// Transient per-level state, rebuilt on every `start_level`
#[derive(Debug)]
struct SequenceSession {
    level: SequenceLevel,
    sequence: Vec<usize>,
    user_index: usize,
    phase: Phase,
}

impl SequenceSession {
    /// Visible flash time plus the inter-step gap
    fn step_interval(&self) -> Millis {
        self.level.speed_ms + REPLAY_GAP_MS
    }
}

/// Sequence-memory engine
#[derive(Debug, Default)]
pub struct SequenceEngine {
    session: Option<SequenceSession>,
}

impl SequenceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether taps are currently accepted
    pub fn accepting(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.phase == Phase::Accepting)
    }

    /// How far the player has correctly recalled
    pub fn progress(&self) -> (usize, usize) {
        self.session
            .as_ref()
            .map(|s| (s.user_index, s.sequence.len()))
            .unwrap_or((0, 0))
    }
}

impl Engine for SequenceEngine {
    fn start_level(
        &mut self,
        level: &LevelDef,
        seed: u64,
        now: Millis,
    ) -> Result<Vec<EngineEvent>> {
        let LevelDef::Sequence(level) = level else {
            return Err(VaultError::LevelMismatch {
                expected: "sequence-memory",
            });
        };
        let mut rng = session_rng(seed);
        let pads = level.pad_count();
        let sequence = (0..level.sequence_length)
            .map(|_| rng.random_range(0..pads))
            .collect();
        self.session = Some(SequenceSession {
            level: level.clone(),
            sequence,
            user_index: 0,
            phase: Phase::Replaying { step: 0, next_at: now },
        });
        Ok(vec![EngineEvent::Stats(Stats::moves(0))])
    }

    fn handle_input(&mut self, input: &InputEvent, _now: Millis) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let Some(session) = self.session.as_mut() else {
            return events;
        };
        // Input only lands between replay and the end of the attempt
        if session.phase != Phase::Accepting {
            return events;
        }
        let InputEvent::Tap { cell } = *input else {
            return events;
        };

        // Echo every accepted tap
        events.push(EngineEvent::Flash { cell });
        if cell != session.sequence[session.user_index] {
            session.phase = Phase::Failed;
            events.push(EngineEvent::Notice(
                "Missed beat. Restart to try again.".to_string(),
            ));
            return events;
        }

        session.user_index += 1;
        events.push(EngineEvent::Stats(Stats::moves(session.user_index as u32)));
        if session.user_index >= session.sequence.len() {
            session.phase = Phase::Done;
            events.push(EngineEvent::Notice("Sequence cleared.".to_string()));
            events.push(EngineEvent::Completed(Stats::moves(
                session.user_index as u32,
            )));
        }
        events
    }

    fn advance(&mut self, now: Millis) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let Some(session) = self.session.as_mut() else {
            return events;
        };
        // Replay runs one flash per interval; acceptance begins one full
        // interval after the last flash
        while let Phase::Replaying { step, next_at } = session.phase {
            if next_at > now {
                break;
            }
            if step < session.sequence.len() {
                events.push(EngineEvent::Flash {
                    cell: session.sequence[step],
                });
                session.phase = Phase::Replaying {
                    step: step + 1,
                    next_at: next_at + session.step_interval(),
                };
            } else {
                session.phase = Phase::Accepting;
            }
        }
        events
    }
}
