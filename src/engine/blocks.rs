//! Placement puzzle (Neon Blocks)
//!
//! An 8x8 board starts empty. A pool of three shapes is offered; placing one
//! fills its cells, scores its size, and refills the pool from a seeded RNG.
//! Fully-filled rows and columns clear within the same placement step, 10
//! points each. The level is won once both the score and line goals are met,
//! and stalls once the piece budget runs out.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::{BOARD_SIZE, LINE_CLEAR_POINTS, PIECE_POOL_SIZE};
use crate::error::{Result, VaultError};
use crate::ledger::Stats;
use crate::levels::{BlocksLevel, LevelDef};

use super::{Engine, EngineEvent, InputEvent, Millis, session_rng};

/// Shape catalog: cell offsets from the placement anchor
pub const SHAPES: [&[(usize, usize)]; 10] = [
    &[(0, 0)],
    &[(0, 0), (1, 0)],
    &[(0, 0), (0, 1)],
    &[(0, 0), (1, 0), (0, 1)],
    &[(0, 0), (1, 0), (2, 0)],
    &[(0, 0), (0, 1), (0, 2)],
    &[(0, 0), (1, 0), (2, 0), (0, 1)],
    &[(0, 0), (1, 0), (1, 1)],
    &[(0, 0), (1, 0), (2, 0), (3, 0)],
    &[(0, 0), (0, 1), (1, 1), (2, 1)],
];

/// The 8x8 board, `true` = filled, indexed `[y][x]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[bool; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[false; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    pub fn filled(&self, x: usize, y: usize) -> bool {
        self.cells[y][x]
    }

    pub fn filled_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|c| **c).count())
            .sum()
    }

    /// A shape fits iff every cell lands in bounds on an empty cell
    pub fn can_place(&self, shape: &[(usize, usize)], x: usize, y: usize) -> bool {
        shape.iter().all(|&(px, py)| {
            let nx = x + px;
            let ny = y + py;
            nx < BOARD_SIZE && ny < BOARD_SIZE && !self.cells[ny][nx]
        })
    }

    /// Fill the shape's cells. Caller must have checked `can_place`.
    pub fn place(&mut self, shape: &[(usize, usize)], x: usize, y: usize) {
        for &(px, py) in shape {
            self.cells[y + py][x + px] = true;
        }
    }

    fn row_full(&self, y: usize) -> bool {
        self.cells[y].iter().all(|c| *c)
    }

    fn col_full(&self, x: usize) -> bool {
        (0..BOARD_SIZE).all(|y| self.cells[y][x])
    }

    /// Clear every full row and column, returning how many lines cleared.
    ///
    /// Rows collapse downward (an empty row refills at the top) and the same
    /// index is re-tested so clears cascade within one call. Columns empty in
    /// place. A cleared line cannot be counted twice: clearing leaves it
    /// non-full.
    pub fn clear_full_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = BOARD_SIZE;
        while y > 0 {
            let row = y - 1;
            if self.row_full(row) {
                for yy in (1..=row).rev() {
                    self.cells[yy] = self.cells[yy - 1];
                }
                self.cells[0] = [false; BOARD_SIZE];
                cleared += 1;
                // Rows above shifted into `row`; test it again
            } else {
                y -= 1;
            }
        }
        for x in 0..BOARD_SIZE {
            if self.col_full(x) {
                for yy in 0..BOARD_SIZE {
                    self.cells[yy][x] = false;
                }
                cleared += 1;
            }
        }
        cleared
    }
}

/// Transient per-level state, rebuilt on every `start_level`
#[derive(Debug)]
struct BlocksSession {
    level: BlocksLevel,
    board: Board,
    score: u64,
    lines: u32,
    pieces_used: u32,
    selected: usize,
    /// Offered shapes, as indices into [`SHAPES`]
    pool: Vec<usize>,
    rng: Pcg32,
    finished: bool,
    /// Piece budget ran out without the goal met; input is dead until restart
    stalled: bool,
}

impl BlocksSession {
    fn new(level: BlocksLevel, seed: u64) -> Self {
        let mut rng = session_rng(seed);
        let pool = (0..PIECE_POOL_SIZE).map(|_| random_shape(&mut rng)).collect();
        Self {
            level,
            board: Board::new(),
            score: 0,
            lines: 0,
            pieces_used: 0,
            selected: 0,
            pool,
            rng,
            finished: false,
            stalled: false,
        }
    }

    fn stats(&self) -> Stats {
        Stats {
            moves: self.pieces_used,
            score: Some(self.score),
            lines: Some(self.lines),
            time_secs: None,
        }
    }

    fn goal_met(&self) -> bool {
        self.score >= self.level.goal.score && self.lines >= self.level.goal.lines
    }

    fn place_at(&mut self, x: usize, y: usize, events: &mut Vec<EngineEvent>) {
        let Some(&shape_index) = self.pool.get(self.selected) else {
            return;
        };
        let shape = SHAPES[shape_index];
        if !self.board.can_place(shape, x, y) {
            events.push(EngineEvent::Notice("Cannot place there.".to_string()));
            return;
        }

        self.board.place(shape, x, y);
        self.pool.remove(self.selected);
        let refill = random_shape(&mut self.rng);
        self.pool.push(refill);
        self.pieces_used += 1;
        self.score += shape.len() as u64;

        let cleared = self.board.clear_full_lines();
        if cleared > 0 {
            self.lines += cleared;
            self.score += u64::from(cleared) * LINE_CLEAR_POINTS;
            events.push(EngineEvent::Notice(format!("Lines cleared: {cleared}")));
        }

        events.push(EngineEvent::Stats(self.stats()));

        if self.goal_met() {
            self.finished = true;
            events.push(EngineEvent::Completed(self.stats()));
        } else if self.pieces_used >= self.level.max_pieces {
            self.stalled = true;
            events.push(EngineEvent::Notice(
                "Out of pieces. Restart to try again.".to_string(),
            ));
        }
    }
}

/// Placement-puzzle engine
#[derive(Debug, Default)]
pub struct BlocksEngine {
    session: Option<BlocksSession>,
}

impl BlocksEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current board, for the surface to render
    pub fn board(&self) -> Option<&Board> {
        self.session.as_ref().map(|s| &s.board)
    }

    /// Offered shape indices and the selected slot
    pub fn pool(&self) -> (&[usize], usize) {
        self.session
            .as_ref()
            .map(|s| (s.pool.as_slice(), s.selected))
            .unwrap_or((&[], 0))
    }
}

fn random_shape(rng: &mut Pcg32) -> usize {
    rng.random_range(0..SHAPES.len())
}

impl Engine for BlocksEngine {
    fn start_level(
        &mut self,
        level: &LevelDef,
        seed: u64,
        _now: Millis,
    ) -> Result<Vec<EngineEvent>> {
        let LevelDef::Blocks(level) = level else {
            return Err(VaultError::LevelMismatch {
                expected: "placement-puzzle",
            });
        };
        let session = BlocksSession::new(level.clone(), seed);
        let events = vec![EngineEvent::Stats(session.stats())];
        self.session = Some(session);
        Ok(events)
    }

    fn handle_input(&mut self, input: &InputEvent, _now: Millis) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let Some(session) = self.session.as_mut() else {
            return events;
        };
        if session.finished || session.stalled {
            return events;
        }
        match *input {
            InputEvent::SelectPiece(index) => {
                if index < session.pool.len() {
                    session.selected = index;
                }
            }
            InputEvent::CellTap { x, y } => session.place_at(x, y, &mut events),
            _ => {}
        }
        events
    }

    fn advance(&mut self, _now: Millis) -> Vec<EngineEvent> {
        // No timers; the shell owns the level clock
        Vec::new()
    }
}
