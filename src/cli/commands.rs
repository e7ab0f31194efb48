//! Commands typed at the terminal prompt.

use std::path::PathBuf;
use std::str::FromStr;

use crate::engine::types::{PieceKind, Square};

/// Text shown for `help`.
pub const HELP: &str = "\
commands:
  e2 e4 | e2e4 | a7a8q   move a piece (optional promotion letter)
  moves <square>         show legal destinations
  promote <q|r|b|n>      choose the piece for a pending promotion
  board                  redraw the board
  fen                    print the position as FEN
  save <path>            write a JSON snapshot
  load <path>            restore a JSON snapshot
  resign                 concede the game
  new [seconds]          start a fresh game (optionally with a new time control)
  help                   show this text
  quit                   leave";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move {
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    },
    Moves(Square),
    Promote(PieceKind),
    Board,
    Fen,
    Save(PathBuf),
    Load(PathBuf),
    Resign,
    /// Start over, optionally with a different time per side in seconds.
    New(Option<u64>),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty input")]
    Empty,

    #[error("unknown command: {0} (type 'help')")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("promotion piece must be q, r, b or n, got '{0}'")]
    InvalidPromotion(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = tokens.first() else {
            return Err(CommandError::Empty);
        };
        let rest = &tokens[1..];

        match first.to_ascii_lowercase().as_str() {
            "moves" => match rest {
                [sq] => Ok(Command::Moves(square(sq)?)),
                _ => Err(CommandError::Usage("moves <square>")),
            },
            "promote" => match rest {
                [piece] => Ok(Command::Promote(promotion_piece(piece)?)),
                _ => Err(CommandError::Usage("promote <q|r|b|n>")),
            },
            "save" => match rest {
                [path] => Ok(Command::Save(PathBuf::from(path))),
                _ => Err(CommandError::Usage("save <path>")),
            },
            "load" => match rest {
                [path] => Ok(Command::Load(PathBuf::from(path))),
                _ => Err(CommandError::Usage("load <path>")),
            },
            "board" => Ok(Command::Board),
            "fen" => Ok(Command::Fen),
            "resign" => Ok(Command::Resign),
            "new" => match rest {
                [] => Ok(Command::New(None)),
                [secs] => match secs.parse::<u64>() {
                    Ok(secs) if secs > 0 => Ok(Command::New(Some(secs))),
                    _ => Err(CommandError::Usage("new [seconds]")),
                },
                _ => Err(CommandError::Usage("new [seconds]")),
            },
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            _ => parse_move(&tokens),
        }
    }
}

/// `e2 e4`, `e2e4`, `a7 a8 q` or `a7a8q`.
fn parse_move(tokens: &[&str]) -> Result<Command, CommandError> {
    let joined: String = tokens.concat();
    if !(4..=5).contains(&joined.len()) || !joined.is_ascii() {
        return Err(CommandError::Unknown(tokens.join(" ")));
    }
    let Some(from) = Square::from_algebraic(&joined[0..2]) else {
        return Err(CommandError::Unknown(tokens.join(" ")));
    };
    let to = square(&joined[2..4])?;
    let promotion = match joined.get(4..) {
        Some("") | None => None,
        Some(p) => Some(promotion_piece(p)?),
    };
    Ok(Command::Move {
        from,
        to,
        promotion,
    })
}

fn square(s: &str) -> Result<Square, CommandError> {
    Square::from_algebraic(s).ok_or_else(|| CommandError::InvalidSquare(s.to_string()))
}

fn promotion_piece(s: &str) -> Result<PieceKind, CommandError> {
    let kind = match s.to_ascii_lowercase().as_str() {
        "queen" => Some(PieceKind::Queen),
        "rook" => Some(PieceKind::Rook),
        "bishop" => Some(PieceKind::Bishop),
        "knight" => Some(PieceKind::Knight),
        letter if letter.len() == 1 => letter.chars().next().and_then(PieceKind::from_letter),
        _ => None,
    };
    kind.filter(|k| k.is_promotion_target())
        .ok_or_else(|| CommandError::InvalidPromotion(s.to_string()))
}
