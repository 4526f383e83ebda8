//! Sliding-block puzzle (Escape Grid)
//!
//! A 6x6 grid of axis-aligned blocks, one marked as the escape target.
//! Blocks slide only along their long axis; a drag gesture repositions one
//! block, clamped to the grid and rejected while it would overlap another.
//! The move counter ticks once per completed gesture. The level is won when
//! the target's trailing edge reaches the far boundary on its travel axis.

use crate::consts::ESCAPE_GRID_SIZE;
use crate::error::{Result, VaultError};
use crate::ledger::Stats;
use crate::levels::{BlockRect, LevelDef};

use super::{Engine, EngineEvent, InputEvent, Millis};

/// An in-flight drag gesture
#[derive(Debug, Clone, Copy)]
struct Drag {
    /// Index of the dragged block
    block: usize,
    /// Cell where the pointer went down
    press: (i32, i32),
    /// Block origin when the gesture began
    origin: (i32, i32),
}

/// Transient per-level state, rebuilt on every `start_level`
#[derive(Debug)]
struct EscapeSession {
    blocks: Vec<BlockRect>,
    moves: u32,
    drag: Option<Drag>,
    finished: bool,
}

impl EscapeSession {
    /// Whether `blocks[index]` moved to `(x, y)` would overlap any other block
    fn collides(&self, index: usize, x: i32, y: i32) -> bool {
        let moved = &self.blocks[index];
        self.blocks
            .iter()
            .enumerate()
            .any(|(i, other)| i != index && moved.overlaps_at(x, y, other))
    }

    fn target(&self) -> Option<&BlockRect> {
        self.blocks.iter().find(|b| b.is_target())
    }

    /// Target's trailing edge at the far boundary along its travel axis
    fn escaped(&self) -> bool {
        self.target().is_some_and(|t| {
            if t.horizontal() {
                t.x + t.w == ESCAPE_GRID_SIZE
            } else {
                t.y + t.h == ESCAPE_GRID_SIZE
            }
        })
    }

    fn begin_drag(&mut self, x: i32, y: i32) {
        let Some(index) = self.blocks.iter().position(|b| b.contains(x, y)) else {
            return;
        };
        let block = &self.blocks[index];
        self.drag = Some(Drag {
            block: index,
            press: (x, y),
            origin: (block.x, block.y),
        });
    }

    /// Recompute the dragged block's position from the gesture origin.
    ///
    /// Movement off the travel axis is discarded; a colliding candidate
    /// leaves the block where it is.
    fn move_drag(&mut self, x: i32, y: i32) {
        let Some(drag) = self.drag else {
            return;
        };
        let block = &self.blocks[drag.block];
        if block.horizontal() {
            let next = (drag.origin.0 + (x - drag.press.0))
                .clamp(0, ESCAPE_GRID_SIZE - block.w);
            if !self.collides(drag.block, next, block.y) {
                self.blocks[drag.block].x = next;
            }
        } else {
            let next = (drag.origin.1 + (y - drag.press.1))
                .clamp(0, ESCAPE_GRID_SIZE - block.h);
            if !self.collides(drag.block, block.x, next) {
                self.blocks[drag.block].y = next;
            }
        }
    }

    fn end_drag(&mut self, events: &mut Vec<EngineEvent>) {
        if self.drag.take().is_none() {
            return;
        }
        self.moves += 1;
        events.push(EngineEvent::Stats(Stats::moves(self.moves)));
        if self.escaped() {
            self.finished = true;
            events.push(EngineEvent::Notice("Exit reached!".to_string()));
            events.push(EngineEvent::Completed(Stats::moves(self.moves)));
        }
    }
}

/// Sliding-block engine
#[derive(Debug, Default)]
pub struct EscapeEngine {
    session: Option<EscapeSession>,
}

impl EscapeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current block layout, for the surface to render
    pub fn blocks(&self) -> &[BlockRect] {
        self.session
            .as_ref()
            .map(|s| s.blocks.as_slice())
            .unwrap_or(&[])
    }
}

impl Engine for EscapeEngine {
    fn start_level(
        &mut self,
        level: &LevelDef,
        _seed: u64,
        _now: Millis,
    ) -> Result<Vec<EngineEvent>> {
        let LevelDef::Escape(level) = level else {
            return Err(VaultError::LevelMismatch {
                expected: "sliding-block",
            });
        };
        self.session = Some(EscapeSession {
            blocks: level.blocks.clone(),
            moves: 0,
            drag: None,
            finished: false,
        });
        Ok(vec![EngineEvent::Stats(Stats::moves(0))])
    }

    fn handle_input(&mut self, input: &InputEvent, _now: Millis) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let Some(session) = self.session.as_mut() else {
            return events;
        };
        if session.finished {
            return events;
        }
        match *input {
            InputEvent::PointerDown { x, y } => session.begin_drag(x, y),
            InputEvent::PointerMove { x, y } => session.move_drag(x, y),
            InputEvent::PointerUp => session.end_drag(&mut events),
            _ => {}
        }
        events
    }

    fn advance(&mut self, _now: Millis) -> Vec<EngineEvent> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rect(id: &str, x: i32, y: i32, w: i32, h: i32) -> BlockRect {
        BlockRect {
            id: id.to_string(),
            x,
            y,
            w,
            h,
        }
    }

    fn level(blocks: Vec<BlockRect>) -> LevelDef {
        LevelDef::Escape(crate::levels::EscapeLevel {
            blocks,
            goal_text: None,
        })
    }

    fn drag(engine: &mut EscapeEngine, from: (i32, i32), to: (i32, i32)) -> Vec<EngineEvent> {
        engine.handle_input(&InputEvent::PointerDown { x: from.0, y: from.1 }, 0);
        engine.handle_input(&InputEvent::PointerMove { x: to.0, y: to.1 }, 0);
        engine.handle_input(&InputEvent::PointerUp, 0)
    }

    #[test]
    fn test_horizontal_block_ignores_vertical_delta() {
        let mut engine = EscapeEngine::new();
        engine
            .start_level(&level(vec![rect("X", 0, 2, 2, 1)]), 1, 0)
            .unwrap();
        // Pure vertical drag: block must not move
        engine.handle_input(&InputEvent::PointerDown { x: 0, y: 2 }, 0);
        engine.handle_input(&InputEvent::PointerMove { x: 0, y: 5 }, 0);
        assert_eq!(engine.blocks()[0], rect("X", 0, 2, 2, 1));
    }

    #[test]
    fn test_move_clamps_to_grid() {
        let mut engine = EscapeEngine::new();
        engine
            .start_level(&level(vec![rect("B1", 1, 0, 1, 2)]), 1, 0)
            .unwrap();
        // Drag far past the bottom edge
        drag(&mut engine, (1, 0), (1, 20));
        assert_eq!(engine.blocks()[0].y, ESCAPE_GRID_SIZE - 2);
    }

    #[test]
    fn test_blocked_move_is_rejected() {
        let mut engine = EscapeEngine::new();
        engine
            .start_level(
                &level(vec![rect("X", 0, 2, 2, 1), rect("B1", 3, 2, 2, 1)]),
                1,
                0,
            )
            .unwrap();
        // Every candidate past x=1 overlaps the wall at x=3..5
        engine.handle_input(&InputEvent::PointerDown { x: 0, y: 2 }, 0);
        engine.handle_input(&InputEvent::PointerMove { x: 4, y: 2 }, 0);
        assert_eq!(engine.blocks()[0].x, 0);
        engine.handle_input(&InputEvent::PointerMove { x: 1, y: 2 }, 0);
        assert_eq!(engine.blocks()[0].x, 1);
        engine.handle_input(&InputEvent::PointerMove { x: 2, y: 2 }, 0);
        assert_eq!(engine.blocks()[0].x, 1);
        let events = engine.handle_input(&InputEvent::PointerUp, 0);
        assert_eq!(events, vec![EngineEvent::Stats(Stats::moves(1))]);
    }

    #[test]
    fn test_win_at_far_boundary_single_gesture() {
        let mut engine = EscapeEngine::new();
        // Target width 2 at x=4: already at the boundary (4 + 2 == 6)
        engine
            .start_level(&level(vec![rect("X", 4, 2, 2, 1)]), 1, 0)
            .unwrap();
        let events = drag(&mut engine, (4, 2), (4, 2));
        assert_eq!(
            events,
            vec![
                EngineEvent::Stats(Stats::moves(1)),
                EngineEvent::Notice("Exit reached!".to_string()),
                EngineEvent::Completed(Stats::moves(1)),
            ]
        );
        // Finished: no further gestures count
        assert!(drag(&mut engine, (4, 2), (4, 2)).is_empty());
    }

    #[test]
    fn test_vertical_target_wins_at_bottom_edge() {
        let mut engine = EscapeEngine::new();
        engine
            .start_level(&level(vec![rect("X", 2, 0, 1, 2)]), 1, 0)
            .unwrap();
        let events = drag(&mut engine, (2, 0), (2, 4));
        assert_eq!(engine.blocks()[0].y, 4);
        assert!(events.contains(&EngineEvent::Completed(Stats::moves(1))));
    }

    #[test]
    fn test_moves_count_per_gesture_not_per_step() {
        let mut engine = EscapeEngine::new();
        engine
            .start_level(&level(vec![rect("B1", 0, 0, 3, 1)]), 1, 0)
            .unwrap();
        engine.handle_input(&InputEvent::PointerDown { x: 0, y: 0 }, 0);
        for x in 1..=3 {
            engine.handle_input(&InputEvent::PointerMove { x, y: 0 }, 0);
        }
        let events = engine.handle_input(&InputEvent::PointerUp, 0);
        assert_eq!(events, vec![EngineEvent::Stats(Stats::moves(1))]);
    }

    #[test]
    fn test_pointer_up_without_drag_is_ignored() {
        let mut engine = EscapeEngine::new();
        engine
            .start_level(&level(vec![rect("B1", 0, 0, 2, 1)]), 1, 0)
            .unwrap();
        // Press on an empty cell, then release
        engine.handle_input(&InputEvent::PointerDown { x: 5, y: 5 }, 0);
        let events = engine.handle_input(&InputEvent::PointerUp, 0);
        assert!(events.is_empty());
    }

    proptest! {
        #[test]
        fn prop_blocks_never_overlap_after_drags(
            deltas in proptest::collection::vec((-6i32..7, -6i32..7), 1..20),
        ) {
            let mut engine = EscapeEngine::new();
            engine
                .start_level(
                    &level(vec![
                        rect("X", 0, 2, 2, 1),
                        rect("B1", 3, 0, 1, 3),
                        rect("B2", 4, 4, 2, 1),
                    ]),
                    1,
                    0,
                )
                .unwrap();
            for (dx, dy) in deltas {
                // Grab the target block wherever it is and wiggle it around
                let (tx, ty) = {
                    let t = engine.blocks().iter().find(|b| b.is_target()).unwrap();
                    (t.x, t.y)
                };
                engine.handle_input(&InputEvent::PointerDown { x: tx, y: ty }, 0);
                engine.handle_input(&InputEvent::PointerMove { x: tx + dx, y: ty + dy }, 0);
                engine.handle_input(&InputEvent::PointerUp, 0);

                let blocks = engine.blocks();
                for (i, a) in blocks.iter().enumerate() {
                    // In bounds
                    prop_assert!(a.x >= 0 && a.x + a.w <= ESCAPE_GRID_SIZE);
                    prop_assert!(a.y >= 0 && a.y + a.h <= ESCAPE_GRID_SIZE);
                    for b in &blocks[i + 1..] {
                        prop_assert!(!a.overlaps_at(a.x, a.y, b));
                    }
                }
            }
        }
    }
}
