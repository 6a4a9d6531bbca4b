//! Game rules on top of the core data structures.
//!
//! - [`Engine`] - Board, active piece and the move/rotate/lock/clear rules
//! - [`PieceGenerator`] - Seeded uniform draw from a [`Catalog`](crate::Catalog)
//! - [`PieceSeed`] - Seed for deterministic piece generation
//! - [`Command`] - One discrete player command, as delivered by a host
//!
//! # Game Flow
//!
//! 1. Create an [`Engine`]; the first piece spawns at the top center
//! 2. The host forwards each input event as one command and calls
//!    [`Engine::soft_drop`] on every gravity tick
//! 3. A piece that cannot descend locks, full rows clear and the next piece spawns
//! 4. When the next piece has no room the engine reports
//!    [`MoveOutcome::ToppedOut`] and rejects further commands
//!
//! The host re-reads [`Engine::board`] after each call to render it.
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{Command, Engine, MoveError, PieceSeed};
//!
//! let mut engine = Engine::with_seed(PieceSeed::from_u128(42));
//!
//! for command in [Command::Rotate, Command::MoveLeft, Command::HardDrop] {
//!     match command.apply(&mut engine) {
//!         Ok(outcome) if outcome.is_topped_out() => println!("Game over!"),
//!         Ok(_) | Err(MoveError::Collision) => {}
//!         Err(MoveError::GameOver) => break,
//!     }
//! }
//! ```

pub use self::{command::*, game_engine::*, piece_generator::*};

mod command;
mod game_engine;
mod piece_generator;
