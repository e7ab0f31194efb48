//! Board representation and game state.
//!
//! `Board` is a plain 8×8 grid of optional pieces indexed by `(row, col)`,
//! row 0 being Black's back rank. `GameState` adds the side to move,
//! castling rights, the en-passant target, per-colour king-moved flags and
//! the pending-promotion window, and owns every state transition.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::attacks;
use crate::engine::movegen;
use crate::engine::types::{
    CastleSide, CastlingRights, ChessError, Color, MoveOutcome, Piece, PieceKind, Square,
};

/// Standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Column the kings start on.
const KING_HOME_COL: u8 = 4;

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// 8×8 grid, `squares[row][col]`. Cheap to copy, which the legality filter
/// relies on for its scratch copies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Board {
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    pub fn starting() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut board = Board::empty();
        for color in Color::BOTH {
            let home = color.home_row() as usize;
            let pawns = color.pawn_start_row() as usize;
            for (col, kind) in BACK_RANK.iter().enumerate() {
                board.squares[home][col] = Some(Piece::new(*kind, color));
                board.squares[pawns][col] = Some(Piece::new(PieceKind::Pawn, color));
            }
        }
        board
    }

    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.row as usize][sq.col as usize]
    }

    #[inline]
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.row as usize][sq.col as usize] = piece;
    }

    /// Move whatever is on `from` to `to`, returning the piece that was on
    /// `to` before.
    #[inline]
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        let moving = self.get(from);
        let captured = self.get(to);
        self.set(to, moving);
        self.set(from, None);
        captured
    }

    /// Every occupied square, row by row from a8.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    /// Exactly one king per colour; every rule query assumes it.
    pub fn check_kings(&self) -> Result<(), String> {
        for color in Color::BOTH {
            let kings = self
                .pieces_of(color)
                .filter(|(_, p)| p.kind == PieceKind::King)
                .count();
            if kings != 1 {
                return Err(format!("{color} has {kings} kings (expected 1)"));
            }
        }
        Ok(())
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::starting()
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Complete rules state of one game.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub side_to_move: Color,
    pub castling: CastlingRights,
    /// Square skipped by the previous move's double pawn step, if any.
    pub en_passant: Option<Square>,
    pub white_king_moved: bool,
    pub black_king_moved: bool,
    /// Square of a pawn waiting for its promotion choice.
    pub pending_promotion: Option<Square>,
}

impl GameState {
    /// Standard initial position, White to move, full castling rights.
    pub fn new() -> Self {
        GameState {
            board: Board::starting(),
            side_to_move: Color::White,
            castling: CastlingRights::ALL,
            en_passant: None,
            white_king_moved: false,
            black_king_moved: false,
            pending_promotion: None,
        }
    }

    // -----------------------------------------------------------------
    // Board-state primitives
    // -----------------------------------------------------------------

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board.get(sq)
    }

    /// Relocate the piece on `from` to `to` without any rule checks,
    /// capturing whatever stood on `to`.
    #[inline]
    pub fn move_piece(&mut self, from: Square, to: Square) {
        self.board.relocate(from, to);
    }

    pub fn set_castling_right(&mut self, color: Color, side: CastleSide, value: bool) {
        self.castling.set(color, side, value);
    }

    #[inline]
    pub fn clear_en_passant(&mut self) {
        self.en_passant = None;
    }

    #[inline]
    pub fn set_en_passant(&mut self, sq: Square) {
        self.en_passant = Some(sq);
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn king_moved(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_king_moved,
            Color::Black => self.black_king_moved,
        }
    }

    fn set_king_moved(&mut self, color: Color) {
        match color {
            Color::White => self.white_king_moved = true,
            Color::Black => self.black_king_moved = true,
        }
    }

    // -----------------------------------------------------------------
    // Rule queries
    // -----------------------------------------------------------------

    /// Legal destinations for the piece on `from`. Empty for an empty
    /// square, an opponent's piece, or while a promotion is pending.
    pub fn legal_moves(&self, from: Square) -> Vec<Square> {
        movegen::legal_moves(self, from)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        attacks::is_in_check(&self.board, color)
    }

    pub fn is_checkmate(&self, color: Color) -> bool {
        movegen::is_checkmate(self, color)
    }

    pub fn is_stalemate(&self, color: Color) -> bool {
        movegen::is_stalemate(self, color)
    }

    // -----------------------------------------------------------------
    // Move execution
    // -----------------------------------------------------------------

    /// Play `from -> to` for the side to move.
    ///
    /// Returns `MoveOutcome::Invalid` and leaves the state untouched if the
    /// destination is not a legal move or a promotion choice is outstanding.
    pub fn execute_move(&mut self, from: Square, to: Square) -> MoveOutcome {
        if let Some(pending) = self.pending_promotion {
            debug!(%from, %to, %pending, "move rejected: promotion pending");
            return MoveOutcome::Invalid;
        }
        if !movegen::legal_moves(self, from).contains(&to) {
            debug!(%from, %to, "move rejected: not legal");
            return MoveOutcome::Invalid;
        }
        let Some(piece) = self.piece_at(from) else {
            return MoveOutcome::Invalid;
        };

        if piece.kind == PieceKind::King && from.col.abs_diff(to.col) == 2 {
            self.castle(from, to, piece.color);
            debug!(%from, %to, color = %piece.color, "castled");
            return MoveOutcome::Castled;
        }

        let mut outcome = if self.piece_at(to).is_some() {
            MoveOutcome::MovedWithCapture
        } else {
            MoveOutcome::Moved
        };
        if movegen::is_en_passant_capture(self, from, to) {
            self.board.set(Square::new(from.row, to.col), None);
            outcome = MoveOutcome::MovedWithCapture;
        }

        self.move_piece(from, to);
        self.revoke_rights_after_move(piece, from);

        if piece.kind == PieceKind::Pawn && from.row.abs_diff(to.row) == 2 {
            self.set_en_passant(Square::new((from.row + to.row) / 2, from.col));
        } else {
            self.clear_en_passant();
        }

        if piece.kind == PieceKind::Pawn && to.row == piece.color.promotion_row() {
            self.pending_promotion = Some(to);
            debug!(%from, %to, "promotion pending");
            return MoveOutcome::PromotionPending(to);
        }

        self.side_to_move = !self.side_to_move;
        debug!(%from, %to, ?outcome, "move executed");
        outcome
    }

    /// Finish a pending promotion by replacing the pawn on `square` with
    /// `kind`, then pass the turn.
    pub fn complete_promotion(&mut self, square: Square, kind: PieceKind) -> Result<(), ChessError> {
        let pending = self.pending_promotion.ok_or(ChessError::NoPromotionPending)?;
        if pending != square {
            return Err(ChessError::PromotionSquareMismatch {
                pending,
                requested: square,
            });
        }
        if !kind.is_promotion_target() {
            return Err(ChessError::InvalidPromotion(kind.to_string()));
        }

        let color = self.side_to_move;
        self.board.set(square, Some(Piece::new(kind, color)));
        self.pending_promotion = None;
        self.side_to_move = !color;
        debug!(%square, %kind, %color, "promotion completed");
        Ok(())
    }

    /// King jumps two squares toward the rook, the rook lands on the square
    /// the king crossed.
    fn castle(&mut self, from: Square, to: Square, color: Color) {
        let side = if to.col > from.col {
            CastleSide::Kingside
        } else {
            CastleSide::Queenside
        };
        let rook_from = Square::new(from.row, side.rook_col());
        let rook_to = Square::new(from.row, (to.col as i8 - side.direction()) as u8);

        self.move_piece(from, to);
        self.move_piece(rook_from, rook_to);
        self.set_king_moved(color);
        for side in CastleSide::BOTH {
            self.set_castling_right(color, side, false);
        }
        self.clear_en_passant();
        self.side_to_move = !self.side_to_move;
    }

    /// King moves and rook moves off a home corner drop castling rights. A
    /// rook captured on its corner keeps the flag; castling re-checks that
    /// the rook is really there.
    fn revoke_rights_after_move(&mut self, piece: Piece, from: Square) {
        match piece.kind {
            PieceKind::King => {
                self.set_king_moved(piece.color);
                for side in CastleSide::BOTH {
                    self.set_castling_right(piece.color, side, false);
                }
            }
            PieceKind::Rook if from.row == piece.color.home_row() => {
                for side in CastleSide::BOTH {
                    if from.col == side.rook_col() {
                        self.set_castling_right(piece.color, side, false);
                    }
                }
            }
            _ => {}
        }
    }

    // -----------------------------------------------------------------
    // FEN
    // -----------------------------------------------------------------

    /// Load a position from FEN. The move counters are optional and
    /// ignored. Castling rights whose king or rook is off its home square
    /// are dropped.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(ChessError::InvalidFen(format!(
                "expected 4 to 6 fields, got {}",
                fields.len()
            )));
        }

        let mut board = Board::empty();
        let rows: Vec<&str> = fields[0].split('/').collect();
        if rows.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                rows.len()
            )));
        }
        for (row, row_str) in rows.iter().enumerate() {
            let mut col: u8 = 0;
            for ch in row_str.chars() {
                if col > 7 {
                    return Err(ChessError::InvalidFen(format!(
                        "too many squares in rank {}",
                        8 - row
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidFen(format!(
                            "invalid empty count '{ch}' in rank {}",
                            8 - row
                        )));
                    }
                    col += digit as u8;
                } else if let Some(piece) = Piece::from_char(ch) {
                    board.set(Square::new(row as u8, col), Some(piece));
                    col += 1;
                } else {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if col != 8 {
                return Err(ChessError::InvalidFen(format!(
                    "rank {} has {col} squares instead of 8",
                    8 - row
                )));
            }
        }

        board.check_kings().map_err(ChessError::InvalidFen)?;

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::InvalidFen(format!(
                    "invalid side to move: '{other}'"
                )));
            }
        };

        let mut castling = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
            ChessError::InvalidFen(format!("invalid castling string: '{}'", fields[2]))
        })?;

        let en_passant = if fields[3] == "-" {
            None
        } else {
            let sq = Square::from_algebraic(fields[3]).ok_or_else(|| {
                ChessError::InvalidFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            if sq.row != 2 && sq.row != 5 {
                return Err(ChessError::InvalidFen(format!(
                    "en passant square {sq} is not on rank 3 or 6"
                )));
            }
            Some(sq)
        };

        let mut king_moved = [false; 2];
        for (i, color) in Color::BOTH.into_iter().enumerate() {
            let home = Square::new(color.home_row(), KING_HOME_COL);
            king_moved[i] = board.get(home) != Some(Piece::new(PieceKind::King, color));
            for side in CastleSide::BOTH {
                let rook_home = Square::new(color.home_row(), side.rook_col());
                if king_moved[i] || board.get(rook_home) != Some(Piece::new(PieceKind::Rook, color)) {
                    castling.set(color, side, false);
                }
            }
        }

        Ok(GameState {
            board,
            side_to_move,
            castling,
            en_passant,
            white_king_moved: king_moved[0],
            black_king_moved: king_moved[1],
            pending_promotion: None,
        })
    }

    /// Consistency check for a state that did not come through `from_fen`
    /// or `execute_move`, such as a loaded snapshot.
    pub fn validate(&self) -> Result<(), ChessError> {
        self.board.check_kings().map_err(ChessError::InvalidSnapshot)?;

        if let Some(ep) = self.en_passant {
            let skipped_row = match self.side_to_move {
                Color::White => 2,
                Color::Black => 5,
            };
            if ep.row != skipped_row || self.piece_at(ep).is_some() {
                return Err(ChessError::InvalidSnapshot(format!(
                    "en passant square {ep} does not fit {} to move",
                    self.side_to_move
                )));
            }
        }

        if let Some(sq) = self.pending_promotion {
            let color = self.side_to_move;
            if sq.row != color.promotion_row()
                || self.piece_at(sq) != Some(Piece::new(PieceKind::Pawn, color))
            {
                return Err(ChessError::InvalidSnapshot(format!(
                    "pending promotion on {sq} has no {color} pawn on its last rank"
                )));
            }
        }
        Ok(())
    }

    /// Write the position as FEN with zeroed move counters.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for row in 0..8u8 {
            let mut empty = 0;
            for col in 0..8u8 {
                match self.board.get(Square::new(row, col)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }
            if row < 7 {
                fen.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let ep = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_algebraic());
        format!("{fen} {side} {} {ep} 0 1", self.castling.to_fen())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
