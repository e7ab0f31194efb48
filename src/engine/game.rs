//! Stateful game controller wrapping `GameState`.
//!
//! `Game` adds what a single played game needs on top of the rules: a
//! clock, the current status for the side to move, the final result, and
//! JSON snapshots. It is the type the terminal front-end drives.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::board::GameState;
use crate::engine::clock::Clock;
use crate::engine::types::{
    ChessError, Color, GameResult, GameStatus, MoveOutcome, PieceKind, Square,
};

// =========================================================================
// Game
// =========================================================================

/// One game in progress (or finished).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    state: GameState,
    clock: Clock,
    status: GameStatus,
    result: Option<GameResult>,
    /// Completed half-moves.
    plies: usize,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Standard starting position with `time_control` per side.
    pub fn new(time_control: Duration) -> Self {
        Self::with_state(GameState::new(), time_control)
    }

    /// Start from a FEN position. The status is evaluated immediately, so a
    /// mated or stalemated position is already over.
    pub fn from_fen(fen: &str, time_control: Duration) -> Result<Self, ChessError> {
        Ok(Self::with_state(GameState::from_fen(fen)?, time_control))
    }

    fn with_state(state: GameState, time_control: Duration) -> Self {
        let mut game = Self {
            state,
            clock: Clock::new(time_control),
            status: GameStatus::Active,
            result: None,
            plies: 0,
        };
        game.update_status();
        game
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn side_to_move(&self) -> Color {
        self.state.side_to_move()
    }

    pub fn pending_promotion(&self) -> Option<Square> {
        self.state.pending_promotion
    }

    pub fn plies(&self) -> usize {
        self.plies
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Legal destinations from `sq`; empty once the game is over.
    pub fn legal_moves(&self, sq: Square) -> Vec<Square> {
        if self.is_game_over() {
            return Vec::new();
        }
        self.state.legal_moves(sq)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.state.is_in_check(color)
    }

    pub fn is_checkmate(&self, color: Color) -> bool {
        self.state.is_checkmate(color)
    }

    pub fn is_stalemate(&self, color: Color) -> bool {
        self.state.is_stalemate(color)
    }

    // -----------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------

    /// Play `from -> to`. Illegal moves come back as `MoveOutcome::Invalid`;
    /// a finished game is an error.
    pub fn execute_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, ChessError> {
        self.ensure_running()?;
        let outcome = self.state.execute_move(from, to);
        match outcome {
            MoveOutcome::Invalid | MoveOutcome::PromotionPending(_) => {}
            _ => self.finish_turn(),
        }
        Ok(outcome)
    }

    /// Supply the piece for a pending promotion and complete the move.
    pub fn complete_promotion(&mut self, square: Square, kind: PieceKind) -> Result<(), ChessError> {
        self.ensure_running()?;
        self.state.complete_promotion(square, kind)?;
        self.finish_turn();
        Ok(())
    }

    /// Give up on behalf of `color`.
    pub fn resign(&mut self, color: Color) -> Result<(), ChessError> {
        self.ensure_running()?;
        self.end(
            GameStatus::Resigned,
            GameResult::Win {
                winner: !color,
                reason: GameStatus::Resigned,
            },
        );
        Ok(())
    }

    // -----------------------------------------------------------------
    // Clock
    // -----------------------------------------------------------------

    /// Charge `elapsed` to the side to move. The clock stands still while a
    /// promotion choice is outstanding or once the game is over. Returns
    /// `true` when this tick ran the side out of time.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if self.is_game_over() || self.state.pending_promotion.is_some() {
            return false;
        }
        let side = self.side_to_move();
        if !self.clock.tick(side, elapsed) {
            return false;
        }
        self.end(
            GameStatus::TimeOut,
            GameResult::Win {
                winner: !side,
                reason: GameStatus::TimeOut,
            },
        );
        true
    }

    // -----------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------

    pub fn to_json(&self) -> Result<String, ChessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore a snapshot. Besides the JSON shape, the position itself is
    /// checked, so a hand-edited file cannot reach the rule queries with a
    /// missing king or a dangling promotion.
    pub fn from_json(json: &str) -> Result<Self, ChessError> {
        let game: Game = serde_json::from_str(json)?;
        game.state.validate()?;
        if game.status.is_game_over() != game.result.is_some() {
            return Err(ChessError::InvalidSnapshot(format!(
                "status {} disagrees with the recorded result",
                game.status
            )));
        }
        Ok(game)
    }

    // -----------------------------------------------------------------
    // Status detection
    // -----------------------------------------------------------------

    fn ensure_running(&self) -> Result<(), ChessError> {
        if self.is_game_over() {
            return Err(ChessError::GameOver(self.status.to_string()));
        }
        Ok(())
    }

    fn finish_turn(&mut self) {
        self.plies += 1;
        self.update_status();
    }

    /// Classify the position for the side now to move: checkmate first,
    /// then stalemate, then plain check.
    fn update_status(&mut self) {
        let side = self.side_to_move();
        if self.state.is_checkmate(side) {
            self.end(
                GameStatus::Checkmate,
                GameResult::Win {
                    winner: !side,
                    reason: GameStatus::Checkmate,
                },
            );
        } else if self.state.is_stalemate(side) {
            self.end(GameStatus::Stalemate, GameResult::Draw);
        } else if self.state.is_in_check(side) {
            debug!(%side, "in check");
            self.status = GameStatus::Check;
        } else {
            self.status = GameStatus::Active;
        }
    }

    fn end(&mut self, status: GameStatus, result: GameResult) {
        info!(%status, %result, plies = self.plies, "game over");
        self.status = status;
        self.result = Some(result);
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Clock::default().initial())
    }
}

// =========================================================================
// Tests
// =========================================================================
