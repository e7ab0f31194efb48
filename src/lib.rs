//! Chess rules engine with a terminal front-end.
//!
//! `engine` holds the rules (board state, move generation, legality, check,
//! checkmate and stalemate, castling, en passant, promotion) plus a clocked
//! `Game` session; `cli` plays that session over stdin/stdout.

pub mod cli;
pub mod config;
pub mod engine;
