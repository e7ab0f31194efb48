//! Move generation.
//!
//! Pipeline:
//!   1. Generate pseudo-legal destinations for one piece (its movement
//!      pattern plus board occupancy, ignoring king safety).
//!   2. Filter: play each move on a scratch copy of the board and keep it
//!      only if the mover's king is not attacked afterwards.
//!
//! The scratch copy is a by-value `Board`, so a legality check can never
//! disturb the real `GameState`.

use crate::engine::attacks::{self, DIAGONALS, KING_OFFSETS, KNIGHT_OFFSETS, ORTHOGONALS};
use crate::engine::board::GameState;
use crate::engine::types::{CastleSide, Color, Piece, PieceKind, Square};

// =========================================================================
// Public API
// =========================================================================

/// Legal destinations for the piece on `from`, restricted to the side to
/// move. Empty while a promotion choice is pending.
pub fn legal_moves(state: &GameState, from: Square) -> Vec<Square> {
    if state.pending_promotion.is_some() {
        return Vec::new();
    }
    match state.piece_at(from) {
        Some(piece) if piece.color == state.side_to_move => legal_moves_for_piece(state, from),
        _ => Vec::new(),
    }
}

/// Legal destinations for whatever piece stands on `from`, whichever side
/// it belongs to.
pub fn legal_moves_for_piece(state: &GameState, from: Square) -> Vec<Square> {
    pseudo_legal_moves(state, from)
        .into_iter()
        .filter(|&to| leaves_king_safe(state, from, to))
        .collect()
}

/// Every legal `(from, to)` pair for `color`.
pub fn all_legal_moves(state: &GameState, color: Color) -> Vec<(Square, Square)> {
    state
        .board
        .pieces_of(color)
        .flat_map(|(from, _)| {
            legal_moves_for_piece(state, from)
                .into_iter()
                .map(move |to| (from, to))
        })
        .collect()
}

pub fn has_legal_move(state: &GameState, color: Color) -> bool {
    state
        .board
        .pieces_of(color)
        .any(|(from, _)| !legal_moves_for_piece(state, from).is_empty())
}

/// In check with no legal move.
pub fn is_checkmate(state: &GameState, color: Color) -> bool {
    state.is_in_check(color) && !has_legal_move(state, color)
}

/// Not in check, yet no legal move.
pub fn is_stalemate(state: &GameState, color: Color) -> bool {
    !state.is_in_check(color) && !has_legal_move(state, color)
}

/// Whether playing `from -> to` keeps the mover's king out of check.
///
/// The move is applied to a copy of the board. An en-passant victim is
/// lifted too, since it can be the only piece screening the king along its
/// rank. The castling rook is left in place: the king's path has already
/// been vetted square by square.
pub fn leaves_king_safe(state: &GameState, from: Square, to: Square) -> bool {
    let Some(piece) = state.piece_at(from) else {
        return false;
    };
    let mut scratch = state.board;
    if is_en_passant_capture(state, from, to) {
        scratch.set(Square::new(from.row, to.col), None);
    }
    scratch.relocate(from, to);
    !attacks::is_in_check(&scratch, piece.color)
}

/// A pawn stepping diagonally onto the en-passant target with an enemy
/// pawn beside it.
pub fn is_en_passant_capture(state: &GameState, from: Square, to: Square) -> bool {
    let Some(piece) = state.piece_at(from) else {
        return false;
    };
    piece.kind == PieceKind::Pawn
        && from.col != to.col
        && state.en_passant == Some(to)
        && state.piece_at(to).is_none()
        && state.piece_at(Square::new(from.row, to.col))
            == Some(Piece::new(PieceKind::Pawn, !piece.color))
}

/// Pseudo-legal destinations for the piece on `from`.
pub fn pseudo_legal_moves(state: &GameState, from: Square) -> Vec<Square> {
    let Some(piece) = state.piece_at(from) else {
        return Vec::new();
    };
    let mut moves = Vec::with_capacity(28);
    match piece.kind {
        PieceKind::Pawn => pawn_moves(state, from, piece.color, &mut moves),
        PieceKind::Knight => step_moves(state, from, piece.color, &KNIGHT_OFFSETS, &mut moves),
        PieceKind::Bishop => slider_moves(state, from, piece.color, &DIAGONALS, &mut moves),
        PieceKind::Rook => slider_moves(state, from, piece.color, &ORTHOGONALS, &mut moves),
        PieceKind::Queen => {
            slider_moves(state, from, piece.color, &DIAGONALS, &mut moves);
            slider_moves(state, from, piece.color, &ORTHOGONALS, &mut moves);
        }
        PieceKind::King => {
            step_moves(state, from, piece.color, &KING_OFFSETS, &mut moves);
            castling_moves(state, from, piece.color, &mut moves);
        }
    }
    moves
}

// =========================================================================
// Per-piece rules (internal)
// =========================================================================

fn pawn_moves(state: &GameState, from: Square, us: Color, moves: &mut Vec<Square>) {
    let dir = us.forward();

    // --- Pushes ---
    if let Some(one) = from.offset(dir, 0) {
        if state.piece_at(one).is_none() {
            moves.push(one);
            if from.row == us.pawn_start_row() {
                if let Some(two) = from.offset(2 * dir, 0) {
                    if state.piece_at(two).is_none() {
                        moves.push(two);
                    }
                }
            }
        }
    }

    // --- Captures, including en passant ---
    for dc in [-1, 1] {
        let Some(target) = from.offset(dir, dc) else {
            continue;
        };
        match state.piece_at(target) {
            Some(p) if p.color != us => moves.push(target),
            None if is_en_passant_capture(state, from, target) => moves.push(target),
            _ => {}
        }
    }
}

/// Knight and king steps: each offset is fine unless off-board or onto a
/// friendly piece.
fn step_moves(
    state: &GameState,
    from: Square,
    us: Color,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Square>,
) {
    for &(dr, dc) in offsets {
        if let Some(to) = from.offset(dr, dc) {
            if !matches!(state.piece_at(to), Some(p) if p.color == us) {
                moves.push(to);
            }
        }
    }
}

fn slider_moves(
    state: &GameState,
    from: Square,
    us: Color,
    directions: &[(i8, i8)],
    moves: &mut Vec<Square>,
) {
    for &(dr, dc) in directions {
        let mut cur = from.offset(dr, dc);
        while let Some(to) = cur {
            match state.piece_at(to) {
                None => moves.push(to),
                Some(p) => {
                    if p.color != us {
                        moves.push(to);
                    }
                    break;
                }
            }
            cur = to.offset(dr, dc);
        }
    }
}

// =========================================================================
// Castling
// =========================================================================

fn castling_moves(state: &GameState, from: Square, us: Color, moves: &mut Vec<Square>) {
    if state.king_moved(us) || attacks::is_in_check(&state.board, us) {
        return;
    }
    for side in CastleSide::BOTH {
        if can_castle(state, from, us, side) {
            if let Some(to) = from.offset(0, 2 * side.direction()) {
                moves.push(to);
            }
        }
    }
}

/// Castling eligibility for the king on `from` toward `side`.
///
/// The rook square is re-inspected every time: the right flag survives a
/// rook being captured on its corner.
pub fn can_castle(state: &GameState, from: Square, us: Color, side: CastleSide) -> bool {
    if !state.castling.get(us, side) {
        return false;
    }
    if from != Square::new(us.home_row(), 4) {
        return false;
    }

    let dir = side.direction();
    let rook_sq = Square::new(from.row, side.rook_col());

    // Squares strictly between king and rook must be empty.
    let mut cur = from.offset(0, dir);
    while let Some(sq) = cur {
        if sq == rook_sq {
            break;
        }
        if state.piece_at(sq).is_some() {
            return false;
        }
        cur = sq.offset(0, dir);
    }

    if state.piece_at(rook_sq) != Some(Piece::new(PieceKind::Rook, us)) {
        return false;
    }

    // King may not start on, cross, or land on an attacked square.
    (0..=2).all(|step| {
        from.offset(0, step * dir)
            .is_some_and(|sq| !attacks::is_square_attacked(&state.board, sq, !us))
    })
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn state(fen: &str) -> GameState {
        GameState::from_fen(fen).unwrap()
    }

    fn moves_from(fen: &str, from: &str) -> Vec<String> {
        let mut v: Vec<String> = legal_moves(&state(fen), sq(from))
            .into_iter()
            .map(|s| s.to_algebraic())
            .collect();
        v.sort();
        v
    }

    // -------------------------------------------------------------------
    // Starting position
    // -------------------------------------------------------------------

    #[test]
    fn starting_position_has_20_moves() {
        let s = GameState::new();
        assert_eq!(all_legal_moves(&s, Color::White).len(), 20);
        assert_eq!(all_legal_moves(&s, Color::Black).len(), 20);
    }

    #[test]
    fn wrong_side_or_empty_square_has_no_moves() {
        let s = GameState::new();
        assert!(legal_moves(&s, sq("e7")).is_empty());
        assert!(legal_moves(&s, sq("e4")).is_empty());
        // The same piece is still analysable directly.
        assert_eq!(legal_moves_for_piece(&s, sq("e7")).len(), 2);
    }

    // -------------------------------------------------------------------
    // Pawns
    // -------------------------------------------------------------------

    #[test]
    fn pawn_pushes() {
        assert_eq!(moves_from(crate::engine::board::STARTING_FEN, "e2"), ["e3", "e4"]);
        assert_eq!(moves_from("4k3/8/8/8/8/4P3/8/4K3 w - - 0 1", "e3"), ["e4"]);
    }

    #[test]
    fn pawn_blocked() {
        assert!(moves_from("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1", "e2").is_empty());
        // Double step blocked on the landing square only.
        assert_eq!(moves_from("4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1", "e2"), ["e3"]);
    }

    #[test]
    fn pawn_captures_only_enemies() {
        assert_eq!(
            moves_from("4k3/8/8/8/8/3p1N2/4P3/4K3 w - - 0 1", "e2"),
            ["d3", "e3", "e4"]
        );
    }

    #[test]
    fn black_pawn_moves_down() {
        assert_eq!(moves_from("4k3/3p4/8/8/8/8/8/4K3 b - - 0 1", "d7"), ["d5", "d6"]);
    }

    #[test]
    fn en_passant_offered_only_beside_enemy_pawn() {
        let fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1";
        assert_eq!(moves_from(fen, "e5"), ["d6", "e6"]);
        assert!(is_en_passant_capture(&state(fen), sq("e5"), sq("d6")));
        // Target set but no pawn to take.
        assert_eq!(moves_from("4k3/8/8/4P3/8/8/8/4K3 w - d6 0 1", "e5"), ["e6"]);
    }

    #[test]
    fn en_passant_that_exposes_king_is_illegal() {
        // Taking d5 would open the fifth rank between the rook and king.
        let fen = "4k3/8/8/K2pP2r/8/8/8/8 w - d6 0 1";
        assert_eq!(moves_from(fen, "e5"), ["e6"]);
    }

    // -------------------------------------------------------------------
    // Leapers and sliders
    // -------------------------------------------------------------------

    #[test]
    fn knight_in_corner() {
        assert_eq!(moves_from("4k3/8/8/8/8/8/8/N3K3 w - - 0 1", "a1"), ["b3", "c2"]);
    }

    #[test]
    fn rook_stops_at_blockers() {
        let mut m = moves_from("4k3/8/8/8/p7/8/8/R3K3 w - - 0 1", "a1");
        m.retain(|s| s.starts_with('a'));
        assert_eq!(m, ["a2", "a3", "a4"]);
    }

    #[test]
    fn queen_from_center_on_empty_board() {
        assert_eq!(moves_from("k7/8/8/8/3Q4/8/8/7K w - - 0 1", "d4").len(), 27);
    }

    #[test]
    fn pinned_piece_cannot_leave_line() {
        // Bishop e2 pinned by the rook on e8; it has no legal move.
        assert!(moves_from("4r1k1/8/8/8/8/8/4B3/4K3 w - - 0 1", "e2").is_empty());
    }

    #[test]
    fn king_avoids_attacked_squares() {
        let m = moves_from("k7/8/8/8/8/8/r7/4K3 w - - 0 1", "e1");
        assert_eq!(m, ["d1", "f1"]);
    }

    // -------------------------------------------------------------------
    // Castling
    // -------------------------------------------------------------------

    #[test]
    fn castling_both_sides() {
        let m = moves_from("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1", "e1");
        assert!(m.contains(&"g1".to_string()));
        assert!(m.contains(&"c1".to_string()));
    }

    #[test]
    fn castling_needs_empty_path() {
        let m = moves_from("4k3/8/8/8/8/8/8/RN2K1NR w KQ - 0 1", "e1");
        assert!(!m.contains(&"g1".to_string()));
        assert!(!m.contains(&"c1".to_string()));
    }

    #[test]
    fn queenside_b_file_only_needs_to_be_empty() {
        // b1 attacked but not crossed by the king.
        let m = moves_from("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1", "e1");
        assert!(m.contains(&"c1".to_string()));
    }

    #[test]
    fn castling_through_check_forbidden() {
        let m = moves_from("3rk3/8/8/8/8/8/8/R3K3 w Q - 0 1", "e1");
        assert!(!m.contains(&"c1".to_string()));
    }

    #[test]
    fn castling_out_of_check_forbidden() {
        let m = moves_from("4r1k1/8/8/8/8/8/8/4K2R w K - 0 1", "e1");
        assert!(!m.contains(&"g1".to_string()));
    }

    #[test]
    fn castling_requires_own_rook_on_corner() {
        let mut s = state("4k3/8/8/8/8/8/8/4K2R w K - 0 1");
        s.board.set(sq("h1"), Some(Piece::new(PieceKind::Knight, Color::White)));
        assert!(!can_castle(&s, sq("e1"), Color::White, CastleSide::Kingside));
        s.board.set(sq("h1"), Some(Piece::new(PieceKind::Rook, Color::Black)));
        assert!(!can_castle(&s, sq("e1"), Color::White, CastleSide::Kingside));
        s.board.set(sq("h1"), None);
        assert!(!can_castle(&s, sq("e1"), Color::White, CastleSide::Kingside));
    }

    #[test]
    fn castling_blocked_by_king_moved_flag() {
        let mut s = state("4k3/8/8/8/8/8/8/4K2R w K - 0 1");
        s.white_king_moved = true;
        assert!(!legal_moves(&s, sq("e1")).contains(&sq("g1")));
    }

    // -------------------------------------------------------------------
    // Game end
    // -------------------------------------------------------------------

    #[test]
    fn back_rank_mate() {
        let s = state("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let mut s2 = s.clone();
        s2.execute_move(sq("a1"), sq("a8"));
        assert!(is_checkmate(&s2, Color::Black));
        assert!(!is_stalemate(&s2, Color::Black));
        assert!(!is_checkmate(&s, Color::Black));
    }

    #[test]
    fn corner_stalemate() {
        let s = state("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1");
        assert!(is_stalemate(&s, Color::Black));
        assert!(!is_checkmate(&s, Color::Black));
        assert!(!has_legal_move(&s, Color::Black));
        assert!(has_legal_move(&s, Color::White));
    }

    #[test]
    fn legality_check_never_mutates_state() {
        let s = state("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let before = s.clone();
        for color in Color::BOTH {
            for (from, _) in s.board.pieces_of(color) {
                for to in pseudo_legal_moves(&s, from) {
                    leaves_king_safe(&s, from, to);
                    assert_eq!(s, before);
                }
            }
        }
    }
}
