//! Terminal front-end: parses typed commands, draws the board and runs the
//! clocked play loop on top of `engine::Game`.

pub mod commands;
pub mod render;
pub mod session;

pub use commands::{Command, CommandError};
pub use session::{run, Session};
