//! Attack oracle: which squares a colour attacks, and whether a king is in
//! check.
//!
//! Attacks are computed by scanning the attacker's pieces and testing each
//! against the target square. Pawn attacks use their own predicate (diagonal
//! only, occupancy irrelevant); every other piece attacks along its move
//! shape, with sliders requiring a clear line to the target.

use crate::engine::board::Board;
use crate::engine::types::{Color, PieceKind, Square};

/// The eight knight jumps as (row, col) deltas.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// The eight squares around a king.
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

pub const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Whether any piece of `by` attacks `target`.
pub fn is_square_attacked(board: &Board, target: Square, by: Color) -> bool {
    board
        .pieces_of(by)
        .any(|(from, piece)| attacks_square(board, from, piece.kind, by, target))
}

/// Whether `color`'s king is attacked by the opponent.
///
/// # Panics
///
/// Panics if `color` has no king on the board.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    is_square_attacked(board, king_square(board, color), !color)
}

/// Locate `color`'s king.
///
/// # Panics
///
/// Panics if `color` has no king; every position the engine handles is
/// expected to carry exactly one king per side.
pub fn king_square(board: &Board, color: Color) -> Square {
    board
        .pieces_of(color)
        .find(|(_, p)| p.kind == PieceKind::King)
        .map(|(sq, _)| sq)
        .unwrap_or_else(|| panic!("malformed board: no {color} king"))
}

/// Attack predicate for a single piece of `kind` and `color` on `from`.
fn attacks_square(board: &Board, from: Square, kind: PieceKind, color: Color, target: Square) -> bool {
    let dr = target.row as i8 - from.row as i8;
    let dc = target.col as i8 - from.col as i8;
    match kind {
        PieceKind::Pawn => dr == color.forward() && dc.abs() == 1,
        PieceKind::Knight => matches!((dr.abs(), dc.abs()), (2, 1) | (1, 2)),
        PieceKind::Bishop => is_diagonal_clear(board, from, target),
        PieceKind::Rook => is_straight_clear(board, from, target),
        PieceKind::Queen => {
            is_diagonal_clear(board, from, target) || is_straight_clear(board, from, target)
        }
        PieceKind::King => dr.abs() <= 1 && dc.abs() <= 1 && (dr, dc) != (0, 0),
    }
}

// ---------------------------------------------------------------------------
// Line geometry
// ---------------------------------------------------------------------------

/// True when `from` and `to` share a diagonal with no piece strictly
/// between them.
pub fn is_diagonal_clear(board: &Board, from: Square, to: Square) -> bool {
    let dr = to.row as i8 - from.row as i8;
    let dc = to.col as i8 - from.col as i8;
    if dr == 0 || dr.abs() != dc.abs() {
        return false;
    }
    is_path_clear(board, from, to, dr.signum(), dc.signum())
}

/// True when `from` and `to` share a row or column with no piece strictly
/// between them.
pub fn is_straight_clear(board: &Board, from: Square, to: Square) -> bool {
    if from == to || (from.row != to.row && from.col != to.col) {
        return false;
    }
    let dr = (to.row as i8 - from.row as i8).signum();
    let dc = (to.col as i8 - from.col as i8).signum();
    is_path_clear(board, from, to, dr, dc)
}

fn is_path_clear(board: &Board, from: Square, to: Square, dr: i8, dc: i8) -> bool {
    let mut cur = from.offset(dr, dc);
    while let Some(sq) = cur {
        if sq == to {
            return true;
        }
        if board.get(sq).is_some() {
            return false;
        }
        cur = sq.offset(dr, dc);
    }
    false
}

// =========================================================================
// Tests
// =========================================================================
