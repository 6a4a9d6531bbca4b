//! Core data structures: the board grid, shape matrices and pieces.
//!
//! These types carry no game rules of their own beyond geometry. The rules
//! (validation, locking, spawning) live in [`crate::engine`].

pub use self::{board::*, piece::*, shape::*};

pub(crate) mod board;
pub(crate) mod piece;
pub(crate) mod shape;
