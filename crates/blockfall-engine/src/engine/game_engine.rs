use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    MoveError, PieceCollisionError,
    core::{
        board::{Board, Cell},
        piece::{Piece, PiecePosition},
        shape::Shape,
    },
};

use super::piece_generator::{PieceGenerator, PieceSeed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum EngineState {
    Playing,
    /// A freshly spawned piece overlapped locked cells. Terminal until [`Engine::reset`].
    GameOver,
}

/// Result of an accepted command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum MoveOutcome {
    /// The piece moved or rotated.
    Moved,
    /// The piece could not descend, was locked, and a new piece spawned.
    Locked { cleared_lines: usize },
    /// The piece was locked but the new piece had no room; the game is over.
    ToppedOut { cleared_lines: usize },
}

impl MoveOutcome {
    #[must_use]
    pub fn cleared_lines(self) -> usize {
        match self {
            MoveOutcome::Moved => 0,
            MoveOutcome::Locked { cleared_lines } | MoveOutcome::ToppedOut { cleared_lines } => {
                cleared_lines
            }
        }
    }
}

/// Read-only copy of the engine state for hosts that render or persist it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: EngineState,
    pub seed: PieceSeed,
    pub active_piece: Option<Piece>,
    pub board: Board,
}

/// The simulation engine: a board, the active piece projected onto it, and
/// the generator that supplies the next piece.
///
/// Every command validates the candidate position against the walls, the
/// floor and locked cells before touching the board, so a rejected command
/// leaves the engine exactly as it was. A blocked downward move locks the
/// piece, clears full rows and spawns the next piece.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Cell, Engine, MoveOutcome, PieceSeed};
///
/// let mut engine = Engine::with_seed(PieceSeed::from_u128(1));
/// assert_eq!(engine.board().count(Cell::Active), 4);
///
/// engine.move_left().ok();
/// engine.rotate().ok();
///
/// let outcome = engine.hard_drop().unwrap();
/// assert!(matches!(outcome, MoveOutcome::Locked { .. }));
/// assert_eq!(engine.board().count(Cell::Locked), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    board: Board,
    active_piece: Piece,
    generator: PieceGenerator,
    state: EngineState,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with an empty board, the standard catalog and a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_generator(PieceGenerator::new())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::with_generator(PieceGenerator::with_seed(seed))
    }

    /// Creates an engine with an empty board and spawns the first piece from `generator`.
    #[must_use]
    pub fn with_generator(mut generator: PieceGenerator) -> Self {
        let active_piece = Piece::new(generator.next_kind());
        let mut engine = Self {
            board: Board::EMPTY,
            active_piece,
            generator,
            state: EngineState::Playing,
        };
        engine.project(Cell::Active);
        debug!("spawned {} at {:?}", engine.active_piece.kind(), PiecePosition::SPAWN);
        engine
    }

    /// Creates an engine from a prepared position.
    ///
    /// Active cells in `board` are discarded and full rows are cleared before
    /// `piece` is placed. Fails if `piece` leaves the board or overlaps locked
    /// cells.
    pub fn from_parts(
        mut board: Board,
        piece: Piece,
        generator: PieceGenerator,
    ) -> Result<Self, PieceCollisionError> {
        board.erase_active();
        board.clear_lines();
        if !fits(&board, piece.shape(), piece.position()) {
            return Err(PieceCollisionError);
        }
        let mut engine = Self {
            board,
            active_piece: piece,
            generator,
            state: EngineState::Playing,
        };
        engine.project(Cell::Active);
        Ok(engine)
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the falling piece, or `None` once the game is over.
    #[must_use]
    pub fn active_piece(&self) -> Option<&Piece> {
        self.state.is_playing().then_some(&self.active_piece)
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub fn generator(&self) -> &PieceGenerator {
        &self.generator
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            seed: self.generator.seed(),
            active_piece: self.active_piece().cloned(),
            board: self.board.clone(),
        }
    }

    pub fn move_left(&mut self) -> Result<MoveOutcome, MoveError> {
        self.attempt_move(-1, 0, false)
    }

    pub fn move_right(&mut self) -> Result<MoveOutcome, MoveError> {
        self.attempt_move(1, 0, false)
    }

    /// Moves the piece down one row, locking it if it cannot descend.
    pub fn soft_drop(&mut self) -> Result<MoveOutcome, MoveError> {
        self.attempt_move(0, 1, false)
    }

    /// Rotates the piece 90° clockwise in place. No wall kicks are attempted.
    pub fn rotate(&mut self) -> Result<MoveOutcome, MoveError> {
        self.attempt_move(0, 0, true)
    }

    /// Drops the piece row by row until it locks.
    pub fn hard_drop(&mut self) -> Result<MoveOutcome, MoveError> {
        loop {
            match self.soft_drop()? {
                MoveOutcome::Moved => {}
                outcome => return Ok(outcome),
            }
        }
    }

    /// Returns whether the piece could move by `(dx, dy)`, optionally rotated.
    #[must_use]
    pub fn check(&self, dx: i32, dy: i32, rotated: bool) -> bool {
        if self.state.is_game_over() {
            return false;
        }
        let target = self.active_piece.position().offset(dx, dy);
        if rotated {
            fits(&self.board, &self.active_piece.shape().rotated(), target)
        } else {
            fits(&self.board, self.active_piece.shape(), target)
        }
    }

    /// Moves the piece by `(dx, dy)`, with its shape rotated clockwise if `rotated`.
    ///
    /// - Valid candidate: the piece moves and `Moved` is returned.
    /// - Invalid and `dy > 0`: the piece locks where it is, full rows are
    ///   cleared and the next piece spawns.
    /// - Invalid otherwise: nothing changes and [`MoveError::Collision`] is returned.
    pub fn attempt_move(
        &mut self,
        dx: i32,
        dy: i32,
        rotated: bool,
    ) -> Result<MoveOutcome, MoveError> {
        if self.state.is_game_over() {
            return Err(MoveError::GameOver);
        }

        let rotated_shape = rotated.then(|| self.active_piece.shape().rotated());
        let shape = rotated_shape.as_ref().unwrap_or(self.active_piece.shape());
        let target = self.active_piece.position().offset(dx, dy);
        if !fits(&self.board, shape, target) {
            if dy > 0 {
                return Ok(self.lock_and_spawn());
            }
            return Err(MoveError::Collision);
        }

        self.project(Cell::Empty);
        let mut piece = self.active_piece.translated(dx, dy);
        if let Some(shape) = rotated_shape {
            piece = piece.with_shape(shape);
        }
        self.active_piece = piece;
        self.project(Cell::Active);
        Ok(MoveOutcome::Moved)
    }

    /// Clears fully locked rows and returns how many were removed.
    ///
    /// Locking already clears rows, so this only finds work on boards that
    /// gained full rows some other way.
    pub fn clear_lines(&mut self) -> usize {
        let playing = self.state.is_playing();
        if playing {
            self.project(Cell::Empty);
        }
        let cleared_lines = self.board.clear_lines();
        if playing {
            self.project(Cell::Active);
        }
        cleared_lines
    }

    /// Starts over with an empty board, replaying the generator's sequence from its seed.
    pub fn reset(&mut self) {
        self.generator.restart();
        *self = Self::with_generator(self.generator.clone());
        info!("game reset with seed {}", self.generator.seed());
    }

    fn lock_and_spawn(&mut self) -> MoveOutcome {
        self.project(Cell::Locked);
        debug!(
            "locked {} at {:?}",
            self.active_piece.kind(),
            self.active_piece.position()
        );

        let cleared_lines = self.board.clear_lines();
        if cleared_lines > 0 {
            debug!("cleared {cleared_lines} lines");
        }

        let piece = Piece::new(self.generator.next_kind());
        let has_room = fits(&self.board, piece.shape(), piece.position());
        self.active_piece = piece;
        if !has_room {
            self.state = EngineState::GameOver;
            info!(
                "game over: {} cannot spawn at {:?}",
                self.active_piece.kind(),
                self.active_piece.position()
            );
            return MoveOutcome::ToppedOut { cleared_lines };
        }

        self.project(Cell::Active);
        debug!(
            "spawned {} at {:?}",
            self.active_piece.kind(),
            self.active_piece.position()
        );
        MoveOutcome::Locked { cleared_lines }
    }

    /// Writes `cell` into every board cell covered by the active piece.
    fn project(&mut self, cell: Cell) {
        for (x, y) in self.active_piece.occupied_positions() {
            self.board.set_cell_at(x, y, cell);
        }
    }
}

/// Returns whether `shape` placed at `origin` lies inside the board without
/// touching locked cells. Every occupied sub-cell is checked.
fn fits(board: &Board, shape: &Shape, origin: PiecePosition) -> bool {
    shape.offsets().all(|(dx, dy)| {
        matches!(
            board.cell_at(origin.x() + dx, origin.y() + dy),
            Some(Cell::Empty | Cell::Active)
        )
    })
}
