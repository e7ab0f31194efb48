//! Text rendering of the board and game status.

use std::fmt::Write;

use crate::engine::types::{Color, GameResult, GameStatus, Piece, PieceKind, Square};
use crate::engine::{Board, Game};

/// Glyph for a piece: Unicode chess symbol or its FEN letter.
pub fn glyph(piece: Piece, unicode: bool) -> char {
    if !unicode {
        return piece.to_char();
    }
    match (piece.color, piece.kind) {
        (Color::White, PieceKind::King) => '♔',
        (Color::White, PieceKind::Queen) => '♕',
        (Color::White, PieceKind::Rook) => '♖',
        (Color::White, PieceKind::Bishop) => '♗',
        (Color::White, PieceKind::Knight) => '♘',
        (Color::White, PieceKind::Pawn) => '♙',
        (Color::Black, PieceKind::King) => '♚',
        (Color::Black, PieceKind::Queen) => '♛',
        (Color::Black, PieceKind::Rook) => '♜',
        (Color::Black, PieceKind::Bishop) => '♝',
        (Color::Black, PieceKind::Knight) => '♞',
        (Color::Black, PieceKind::Pawn) => '♟',
    }
}

/// Draw the board from White's side, rank 8 on top. Squares in `targets`
/// are marked `*` when empty and `x` when they hold a piece to capture.
pub fn board(board: &Board, unicode: bool, targets: &[Square]) -> String {
    let mut out = String::with_capacity(200);
    for row in 0..8u8 {
        let _ = write!(out, "{} ", 8 - row);
        for col in 0..8u8 {
            let sq = Square::new(row, col);
            let cell = match (board.get(sq), targets.contains(&sq)) {
                (Some(_), true) => 'x',
                (None, true) => '*',
                (Some(piece), false) => glyph(piece, unicode),
                (None, false) => '.',
            };
            out.push(cell);
            if col < 7 {
                out.push(' ');
            }
        }
        out.push('\n');
    }
    out.push_str("  a b c d e f g h");
    out
}

/// One-line status banner.
pub fn status_line(game: &Game) -> String {
    if let Some(result) = game.result() {
        return match result {
            GameResult::Win { winner, reason } => {
                let how = match reason {
                    GameStatus::Checkmate => "CHECKMATE",
                    GameStatus::TimeOut => "TIME OUT",
                    _ => "RESIGNATION",
                };
                format!("{} WINS - {how}!", side_name(winner))
            }
            GameResult::Draw => "STALEMATE - DRAW!".to_string(),
        };
    }
    let side = side_name(game.side_to_move());
    if let Some(sq) = game.pending_promotion() {
        return format!("{side} PROMOTES ON {sq} - choose q, r, b or n");
    }
    match game.status() {
        GameStatus::Check => format!("{side} TURN - CHECK"),
        _ => format!("{side} TURN"),
    }
}

/// Board, banner and clocks.
pub fn report(game: &Game, unicode: bool) -> String {
    format!(
        "{}\n{}\n{}",
        board(&game.state().board, unicode, &[]),
        status_line(game),
        game.clock().display()
    )
}

/// Sorted, space-separated algebraic squares, or a note when there are
/// none.
pub fn destinations(moves: &[Square]) -> String {
    if moves.is_empty() {
        return "no legal moves".to_string();
    }
    let mut names: Vec<String> = moves.iter().map(|sq| sq.to_algebraic()).collect();
    names.sort();
    names.join(" ")
}

fn side_name(color: Color) -> String {
    color.to_string().to_uppercase()
}
