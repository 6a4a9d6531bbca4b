pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece out of bounds or colliding with locked cells")]
pub struct PieceCollisionError;

/// Reason an engine command was rejected without changing any state.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::Error,
    derive_more::IsVariant,
)]
pub enum MoveError {
    #[display("piece blocked by a wall or locked cells")]
    Collision,
    #[display("board is full; game is over")]
    GameOver,
}
