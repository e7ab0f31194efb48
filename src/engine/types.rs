use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    /// Row delta of a forward pawn step. White advances toward row 0.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row the pawns of this colour start on.
    #[inline]
    pub const fn pawn_start_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Row the pawns of this colour promote on.
    #[inline]
    pub const fn promotion_row(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Back rank holding this colour's king and rooks at the start.
    #[inline]
    pub const fn home_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceKind / Piece
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Kinds a pawn may promote to, in the order a chooser would offer them.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    #[inline]
    pub fn is_promotion_target(self) -> bool {
        Self::PROMOTIONS.contains(&self)
    }

    /// Lowercase letter used in FEN and in the command line.
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    /// Parse a kind letter (case-insensitive).
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceKind::Pawn => write!(f, "pawn"),
            PieceKind::Knight => write!(f, "knight"),
            PieceKind::Bishop => write!(f, "bishop"),
            PieceKind::Rook => write!(f, "rook"),
            PieceKind::Queen => write!(f, "queen"),
            PieceKind::King => write!(f, "king"),
        }
    }
}

/// A coloured piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Piece { kind, color }
    }

    /// FEN character: uppercase for White, lowercase for Black.
    pub fn to_char(self) -> char {
        let c = self.kind.letter();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        let kind = PieceKind::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece { kind, color })
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A board square as (row, col). Row 0 is Black's back rank (rank 8),
/// row 7 is White's (rank 1); col 0 is the a-file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SquareFields")]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

/// Unchecked wire form of `Square`; deserialisation goes through it so an
/// off-board coordinate is rejected at load time.
#[derive(Deserialize)]
struct SquareFields {
    row: u8,
    col: u8,
}

impl TryFrom<SquareFields> for Square {
    type Error = String;

    fn try_from(raw: SquareFields) -> Result<Self, Self::Error> {
        if raw.row < 8 && raw.col < 8 {
            Ok(Square {
                row: raw.row,
                col: raw.col,
            })
        } else {
            Err(format!("square out of range: ({}, {})", raw.row, raw.col))
        }
    }
}

impl Square {
    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < 8 && col < 8, "square out of range: ({row}, {col})");
        Square { row, col }
    }

    /// The square `(dr, dc)` away, if it is still on the board.
    #[inline]
    pub fn offset(self, dr: i8, dc: i8) -> Option<Square> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// All 64 squares, row by row from a8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|row| (0..8u8).map(move |col| Square { row, col }))
    }

    /// Parse algebraic notation like "e4".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let col = bytes[0].to_ascii_lowercase().wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if col < 8 && rank < 8 {
            Some(Square::new(7 - rank, col))
        } else {
            None
        }
    }

    /// Convert to algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.col) as char;
        let rank = (b'8' - self.row) as char;
        format!("{file}{rank}")
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

impl std::str::FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s).ok_or_else(|| ChessError::InvalidSquare(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// CastlingRights
// ---------------------------------------------------------------------------

/// Which wing a castle goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::Kingside, CastleSide::Queenside];

    /// Column of the rook that takes part in this castle.
    #[inline]
    pub const fn rook_col(self) -> u8 {
        match self {
            CastleSide::Kingside => 7,
            CastleSide::Queenside => 0,
        }
    }

    /// Column step from the king toward the rook.
    #[inline]
    pub const fn direction(self) -> i8 {
        match self {
            CastleSide::Kingside => 1,
            CastleSide::Queenside => -1,
        }
    }
}

/// Castling availability per colour and wing. Flags only ever go from
/// `true` to `false` during a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    pub const NONE: CastlingRights = CastlingRights {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };

    #[inline]
    pub fn get(self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::Kingside) => self.white_kingside,
            (Color::White, CastleSide::Queenside) => self.white_queenside,
            (Color::Black, CastleSide::Kingside) => self.black_kingside,
            (Color::Black, CastleSide::Queenside) => self.black_queenside,
        }
    }

    #[inline]
    pub fn set(&mut self, color: Color, side: CastleSide, value: bool) {
        let flag = match (color, side) {
            (Color::White, CastleSide::Kingside) => &mut self.white_kingside,
            (Color::White, CastleSide::Queenside) => &mut self.white_queenside,
            (Color::Black, CastleSide::Kingside) => &mut self.black_kingside,
            (Color::Black, CastleSide::Queenside) => &mut self.black_queenside,
        };
        *flag = value;
    }

    pub fn any(self, color: Color) -> bool {
        self.get(color, CastleSide::Kingside) || self.get(color, CastleSide::Queenside)
    }

    /// Parse FEN castling string (e.g. "KQkq", "-", "Kq").
    pub fn from_fen(s: &str) -> Option<Self> {
        if s == "-" {
            return Some(CastlingRights::NONE);
        }
        let mut rights = CastlingRights::NONE;
        for c in s.chars() {
            match c {
                'K' => rights.white_kingside = true,
                'Q' => rights.white_queenside = true,
                'k' => rights.black_kingside = true,
                'q' => rights.black_queenside = true,
                _ => return None,
            }
        }
        Some(rights)
    }

    /// Convert to FEN castling string.
    pub fn to_fen(self) -> String {
        let mut s = String::with_capacity(4);
        if self.white_kingside {
            s.push('K');
        }
        if self.white_queenside {
            s.push('Q');
        }
        if self.black_kingside {
            s.push('k');
        }
        if self.black_queenside {
            s.push('q');
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        CastlingRights::ALL
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

// ---------------------------------------------------------------------------
// MoveOutcome
// ---------------------------------------------------------------------------

/// Result of asking the engine to play `from -> to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "square")]
pub enum MoveOutcome {
    Moved,
    MovedWithCapture,
    Castled,
    /// The pawn reached the last rank; the move completes on
    /// `complete_promotion` for this square.
    PromotionPending(Square),
    /// Not a legal move; nothing changed.
    Invalid,
}

impl MoveOutcome {
    /// Whether the board changed.
    pub fn is_applied(self) -> bool {
        !matches!(self, MoveOutcome::Invalid)
    }
}

// ---------------------------------------------------------------------------
// GameStatus & GameResult
// ---------------------------------------------------------------------------

/// Status of a game from the point of view of the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Active,
    Check,
    Checkmate,
    Stalemate,
    TimeOut,
    Resigned,
}

impl GameStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GameStatus::Active => "active",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::TimeOut => "time_out",
            GameStatus::Resigned => "resigned",
        }
    }

    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::Active | GameStatus::Check)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final result of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Win { winner: Color, reason: GameStatus },
    Draw,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Win { winner, reason } => {
                let how = match reason {
                    GameStatus::Checkmate => "checkmate",
                    GameStatus::TimeOut => "time out",
                    GameStatus::Resigned => "resignation",
                    other => other.as_str(),
                };
                write!(f, "{} wins by {how}", winner.to_string().to_uppercase())
            }
            GameResult::Draw => write!(f, "draw by stalemate"),
        }
    }
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Errors raised by input-shaped operations. Rule queries never fail.
#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    #[error("invalid square notation: {0}")]
    InvalidSquare(String),

    #[error("invalid FEN string: {0}")]
    InvalidFen(String),

    #[error("invalid promotion piece: {0}")]
    InvalidPromotion(String),

    #[error("no promotion is pending")]
    NoPromotionPending,

    #[error("promotion is pending on {pending}, not {requested}")]
    PromotionSquareMismatch { pending: Square, requested: Square },

    #[error("game is already over: {0}")]
    GameOver(String),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("inconsistent snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_toggle() {
        assert_eq!(!Color::White, Color::Black);
        assert_eq!(!Color::Black, Color::White);
    }

    #[test]
    fn color_orientation() {
        assert_eq!(Color::White.forward(), -1);
        assert_eq!(Color::Black.forward(), 1);
        assert_eq!(Color::White.pawn_start_row(), 6);
        assert_eq!(Color::Black.promotion_row(), 7);
        assert_eq!(Color::White.home_row(), 7);
    }

    #[test]
    fn piece_char_round_trip() {
        for kind in [
            PieceKind::Pawn,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
            PieceKind::King,
        ] {
            for color in Color::BOTH {
                let p = Piece::new(kind, color);
                assert_eq!(Piece::from_char(p.to_char()), Some(p));
            }
        }
        assert_eq!(Piece::from_char('x'), None);
        assert_eq!(Piece::new(PieceKind::Queen, Color::White).to_char(), 'Q');
    }

    #[test]
    fn promotion_targets() {
        assert!(PieceKind::Queen.is_promotion_target());
        assert!(PieceKind::Knight.is_promotion_target());
        assert!(!PieceKind::King.is_promotion_target());
        assert!(!PieceKind::Pawn.is_promotion_target());
    }

    #[test]
    fn square_algebraic_orientation() {
        assert_eq!(Square::from_algebraic("a8"), Some(Square::new(0, 0)));
        assert_eq!(Square::from_algebraic("h1"), Some(Square::new(7, 7)));
        assert_eq!(Square::from_algebraic("e4"), Some(Square::new(4, 4)));
        assert_eq!(Square::new(6, 4).to_algebraic(), "e2");
    }

    #[test]
    fn square_algebraic_round_trip() {
        for sq in Square::all() {
            assert_eq!(Square::from_algebraic(&sq.to_algebraic()), Some(sq));
        }
        assert_eq!(Square::all().count(), 64);
    }

    #[test]
    fn square_from_algebraic_invalid() {
        assert_eq!(Square::from_algebraic(""), None);
        assert_eq!(Square::from_algebraic("a9"), None);
        assert_eq!(Square::from_algebraic("i1"), None);
        assert_eq!(Square::from_algebraic("e44"), None);
        assert!("z0".parse::<Square>().is_err());
    }

    #[test]
    fn square_offset_bounds() {
        let a8 = Square::new(0, 0);
        assert_eq!(a8.offset(-1, 0), None);
        assert_eq!(a8.offset(0, -1), None);
        assert_eq!(a8.offset(1, 2), Some(Square::new(1, 2)));
        assert_eq!(Square::new(7, 7).offset(1, 1), None);
    }

    #[test]
    fn square_deserialization_rejects_off_board() {
        let sq: Square = serde_json::from_str(r#"{"row":6,"col":4}"#).unwrap();
        assert_eq!(sq, Square::new(6, 4));
        assert!(serde_json::from_str::<Square>(r#"{"row":9,"col":4}"#).is_err());
        assert!(serde_json::from_str::<Square>(r#"{"row":0,"col":8}"#).is_err());
    }

    #[test]
    fn castling_rights_fen_round_trip() {
        for s in ["-", "K", "Kq", "KQkq", "kq", "Q"] {
            assert_eq!(CastlingRights::from_fen(s).unwrap().to_fen(), s);
        }
        assert_eq!(CastlingRights::from_fen("X"), None);
    }

    #[test]
    fn castling_rights_get_set() {
        let mut cr = CastlingRights::ALL;
        cr.set(Color::White, CastleSide::Kingside, false);
        assert!(!cr.get(Color::White, CastleSide::Kingside));
        assert!(cr.get(Color::White, CastleSide::Queenside));
        assert!(cr.any(Color::White));
        cr.set(Color::White, CastleSide::Queenside, false);
        assert!(!cr.any(Color::White));
        assert!(cr.any(Color::Black));
    }

    #[test]
    fn game_status_is_game_over() {
        assert!(!GameStatus::Active.is_game_over());
        assert!(!GameStatus::Check.is_game_over());
        assert!(GameStatus::Checkmate.is_game_over());
        assert!(GameStatus::Stalemate.is_game_over());
        assert!(GameStatus::TimeOut.is_game_over());
        assert!(GameStatus::Resigned.is_game_over());
    }

    #[test]
    fn game_result_display() {
        let r = GameResult::Win {
            winner: Color::Black,
            reason: GameStatus::Checkmate,
        };
        assert_eq!(r.to_string(), "BLACK wins by checkmate");
        let r = GameResult::Win {
            winner: Color::White,
            reason: GameStatus::TimeOut,
        };
        assert_eq!(r.to_string(), "WHITE wins by time out");
        assert_eq!(GameResult::Draw.to_string(), "draw by stalemate");
    }

    #[test]
    fn move_outcome_serializes_with_square() {
        let json = serde_json::to_string(&MoveOutcome::PromotionPending(Square::new(0, 0))).unwrap();
        assert_eq!(json, r#"{"type":"promotion_pending","square":{"row":0,"col":0}}"#);
        assert!(!MoveOutcome::Invalid.is_applied());
        assert!(MoveOutcome::Castled.is_applied());
    }
}
