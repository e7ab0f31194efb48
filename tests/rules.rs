//! End-to-end rule scenarios and whole-game properties.
//!
//! The property tests play seeded random games and check, at every
//! position reached, that legal moves never leave the mover in check, that
//! kings never stand next to each other, that checkmate and stalemate never
//! coincide, and that probing a move leaves the state untouched.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use chess_rules::engine::attacks::king_square;
use chess_rules::engine::movegen::{all_legal_moves, leaves_king_safe, pseudo_legal_moves};
use chess_rules::engine::{Color, GameState, MoveOutcome, Piece, PieceKind, Square};

fn sq(name: &str) -> Square {
    Square::from_algebraic(name).unwrap()
}

fn play(state: &mut GameState, from: &str, to: &str) -> MoveOutcome {
    let outcome = state.execute_move(sq(from), sq(to));
    assert!(outcome.is_applied(), "{from}{to} rejected");
    outcome
}

// =====================================================================
// Scenarios
// =====================================================================

#[test]
fn fools_mate_leaves_white_in_check() {
    let mut s = GameState::new();
    play(&mut s, "f2", "f3");
    play(&mut s, "e7", "e5");
    play(&mut s, "g2", "g4");
    play(&mut s, "d8", "h4");
    assert_eq!(s.side_to_move(), Color::White);
    assert!(s.is_in_check(Color::White));
    // Nothing interposes on f2/g3 and the king cannot step out: mate.
    assert!(s.is_checkmate(Color::White));
    assert!(!s.is_stalemate(Color::White));
    assert!(all_legal_moves(&s, Color::White).is_empty());
}

#[test]
fn en_passant_capture_removes_passed_pawn() {
    let mut s = GameState::new();
    play(&mut s, "e2", "e4");
    play(&mut s, "a7", "a6");
    play(&mut s, "e4", "e5");
    play(&mut s, "d7", "d5");
    assert_eq!(s.en_passant, Some(sq("d6")));
    assert!(s.legal_moves(sq("e5")).contains(&sq("d6")));

    assert_eq!(s.execute_move(sq("e5"), sq("d6")), MoveOutcome::MovedWithCapture);
    assert_eq!(s.piece_at(sq("d5")), None);
    assert_eq!(s.piece_at(sq("e5")), None);
    assert_eq!(s.piece_at(sq("d6")), Some(Piece::new(PieceKind::Pawn, Color::White)));
    assert_eq!(s.en_passant, None);
}

#[test]
fn en_passant_expires_after_one_move() {
    let mut s = GameState::new();
    play(&mut s, "e2", "e4");
    play(&mut s, "a7", "a6");
    play(&mut s, "e4", "e5");
    play(&mut s, "d7", "d5");
    play(&mut s, "g1", "f3");
    play(&mut s, "a6", "a5");
    assert!(!s.legal_moves(sq("e5")).contains(&sq("d6")));
}

#[test]
fn castling_through_attacked_square_not_offered() {
    let s = GameState::from_fen("4k3/8/b7/8/8/8/8/4K2R w K - 0 1").unwrap();
    let king_moves = s.legal_moves(sq("e1"));
    assert!(!king_moves.contains(&sq("g1")));
    assert!(!king_moves.contains(&sq("f1")));
    assert!(king_moves.contains(&sq("d1")));

    // Same setup without the bishop: castling is available.
    let s = GameState::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    assert!(s.legal_moves(sq("e1")).contains(&sq("g1")));
}

#[test]
fn promotion_blocks_play_until_completed() {
    let mut s = GameState::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert_eq!(s.execute_move(sq("a7"), sq("a8")), MoveOutcome::PromotionPending(sq("a8")));
    let frozen = s.clone();
    assert_eq!(s.execute_move(sq("e1"), sq("d1")), MoveOutcome::Invalid);
    assert_eq!(s.execute_move(sq("e8"), sq("d7")), MoveOutcome::Invalid);
    assert_eq!(s, frozen);

    s.complete_promotion(sq("a8"), PieceKind::Queen).unwrap();
    assert_eq!(s.piece_at(sq("a8")), Some(Piece::new(PieceKind::Queen, Color::White)));
    assert_eq!(s.side_to_move(), Color::Black);
    assert_eq!(s.pending_promotion, None);
}

#[test]
fn lone_king_stalemate() {
    let s = GameState::from_fen("7k/5K2/6Q1/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(s.is_stalemate(Color::Black));
    assert!(!s.is_in_check(Color::Black));
    assert!(!s.is_checkmate(Color::Black));
}

#[test]
fn kings_cannot_approach_each_other() {
    let s = GameState::from_fen("8/8/8/3k4/8/3K4/8/8 w - - 0 1").unwrap();
    let moves = s.legal_moves(sq("d3"));
    for forbidden in ["c4", "d4", "e4"] {
        assert!(!moves.contains(&sq(forbidden)), "{forbidden}");
    }
    assert_eq!(moves.len(), 5);
}

// =====================================================================
// Properties over random games
// =====================================================================

fn kings_adjacent(s: &GameState) -> bool {
    let w = king_square(&s.board, Color::White);
    let b = king_square(&s.board, Color::Black);
    w.row.abs_diff(b.row) <= 1 && w.col.abs_diff(b.col) <= 1
}

fn check_position(s: &GameState) {
    let mover = s.side_to_move();

    assert!(!kings_adjacent(s), "kings adjacent in {}", s.to_fen());
    for color in Color::BOTH {
        assert!(!(s.is_checkmate(color) && s.is_stalemate(color)));
    }

    for (from, to) in all_legal_moves(s, mover) {
        let mut child = s.clone();
        assert!(child.execute_move(from, to).is_applied());
        assert!(!child.is_in_check(mover), "{from}{to} leaves {mover} in check");
    }

    let before = s.clone();
    for (from, _) in s.board.pieces() {
        for to in pseudo_legal_moves(s, from) {
            leaves_king_safe(s, from, to);
        }
    }
    assert_eq!(*s, before);
}

#[test]
fn random_games_respect_invariants() {
    for seed in 0..12u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut s = GameState::new();
        for _ in 0..120 {
            check_position(&s);
            let mover = s.side_to_move();
            let moves = all_legal_moves(&s, mover);
            let Some(&(from, to)) = moves.choose(&mut rng) else {
                assert!(s.is_checkmate(mover) || s.is_stalemate(mover));
                break;
            };

            let was_double_step = s.piece_at(from).map(|p| p.kind) == Some(PieceKind::Pawn)
                && from.row.abs_diff(to.row) == 2;
            match s.execute_move(from, to) {
                MoveOutcome::PromotionPending(at) => {
                    let kind = *PieceKind::PROMOTIONS.choose(&mut rng).unwrap();
                    s.complete_promotion(at, kind).unwrap();
                }
                MoveOutcome::Invalid => panic!("generated move {from}{to} rejected"),
                _ => {}
            }
            assert_eq!(s.side_to_move(), !mover);
            assert_eq!(s.en_passant.is_some(), was_double_step);
        }
    }
}
