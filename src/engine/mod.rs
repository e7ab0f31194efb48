pub mod attacks;
pub mod board;
pub mod clock;
pub mod game;
pub mod movegen;
pub mod types;

pub use board::{Board, GameState};
pub use clock::Clock;
pub use game::Game;
pub use movegen::{legal_moves, legal_moves_for_piece};
pub use types::*;
