//! Interactive play loop.
//!
//! Input lines and a one-second clock interval are multiplexed with
//! `tokio::select!`. Wall time is charged to the side to move before every
//! command and on every tick, so the clock is exact even when the player
//! answers between ticks.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::cli::commands::{Command, HELP};
use crate::cli::render;
use crate::config::AppConfig;
use crate::engine::types::{ChessError, MoveOutcome, Piece, PieceKind, Square};
use crate::engine::Game;

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Show(String),
    Quit,
}

/// One terminal game, restartable with `new`.
pub struct Session {
    game: Game,
    unicode: bool,
    start_fen: Option<String>,
    time_control: Duration,
}

impl Session {
    pub fn new(config: &AppConfig) -> Result<Self, ChessError> {
        let time_control = config.time_control();
        Ok(Session {
            game: fresh_game(config.start_fen.as_deref(), time_control)?,
            unicode: config.unicode_pieces,
            start_fen: config.start_fen.clone(),
            time_control,
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Advance the clock; returns the banner when this tick ended the game.
    pub fn tick(&mut self, elapsed: Duration) -> Option<String> {
        self.game
            .tick(elapsed)
            .then(|| render::report(&self.game, self.unicode))
    }

    pub async fn handle(&mut self, cmd: Command) -> Result<Reply, ChessError> {
        let text = match cmd {
            Command::Move {
                from,
                to,
                promotion: Some(kind),
            } if !self.is_promotion_move(from, to) => {
                warn!(%from, %to, %kind, "promotion piece on a non-promoting move");
                format!("{from} {to} does not promote; drop the '{}'", kind.letter())
            }
            Command::Move {
                from,
                to,
                promotion,
            } => match self.game.execute_move(from, to)? {
                MoveOutcome::Invalid => {
                    warn!(%from, %to, "illegal move");
                    format!("illegal move: {from} {to}")
                }
                MoveOutcome::PromotionPending(sq) => match promotion {
                    Some(kind) => {
                        self.game.complete_promotion(sq, kind)?;
                        self.report()
                    }
                    None => self.report(),
                },
                _ => self.report(),
            },
            Command::Moves(sq) => {
                let moves = self.game.legal_moves(sq);
                format!(
                    "{}\n{sq}: {}",
                    render::board(&self.game.state().board, self.unicode, &moves),
                    render::destinations(&moves)
                )
            }
            Command::Promote(kind) => {
                let sq = self
                    .game
                    .pending_promotion()
                    .ok_or(ChessError::NoPromotionPending)?;
                self.game.complete_promotion(sq, kind)?;
                self.report()
            }
            Command::Board => self.report(),
            Command::Fen => self.game.state().to_fen(),
            Command::Save(path) => {
                tokio::fs::write(&path, self.game.to_json()?).await?;
                info!(path = %path.display(), "game saved");
                format!("saved to {}", path.display())
            }
            Command::Load(path) => {
                let json = tokio::fs::read_to_string(&path).await?;
                self.game = Game::from_json(&json)?;
                info!(path = %path.display(), "game loaded");
                self.report()
            }
            Command::Resign => {
                let side = self.game.side_to_move();
                self.game.resign(side)?;
                self.report()
            }
            Command::New(secs) => {
                if let Some(secs) = secs {
                    self.time_control = Duration::from_secs(secs);
                }
                self.game = fresh_game(self.start_fen.as_deref(), self.time_control)?;
                info!(time_control = self.time_control.as_secs(), "new game started");
                self.report()
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Show(text))
    }

    fn report(&self) -> String {
        render::report(&self.game, self.unicode)
    }

    /// A pawn of the side to move heading for its last rank.
    fn is_promotion_move(&self, from: Square, to: Square) -> bool {
        let side = self.game.side_to_move();
        self.game.state().piece_at(from) == Some(Piece::new(PieceKind::Pawn, side))
            && to.row == side.promotion_row()
    }
}

fn fresh_game(start_fen: Option<&str>, time_control: Duration) -> Result<Game, ChessError> {
    match start_fen {
        Some(fen) => Game::from_fen(fen, time_control),
        None => Ok(Game::new(time_control)),
    }
}

/// Run a game over the given input and output until `quit` or end of input.
pub async fn run<R, W>(config: &AppConfig, input: R, mut output: W) -> Result<(), ChessError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = Session::new(config)?;
    info!(time_control = config.time_control_secs, "game started");

    let mut lines = input.lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;
    let mut last = Instant::now();

    write_block(&mut output, &session.report()).await?;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let now = Instant::now();
                if let Some(banner) = session.tick(now - last) {
                    write_block(&mut output, &banner).await?;
                }
                last = now;

                let reply = match line.parse::<Command>() {
                    Ok(cmd) => session.handle(cmd).await,
                    Err(e) => {
                        warn!(input = %line.trim(), "unparseable command: {e}");
                        Ok(Reply::Show(e.to_string()))
                    }
                };
                match reply {
                    Ok(Reply::Show(text)) => write_block(&mut output, &text).await?,
                    Ok(Reply::Quit) => break,
                    Err(e) => write_block(&mut output, &format!("error: {e}")).await?,
                }
            }
            _ = ticker.tick(), if !session.game().is_game_over() => {
                let now = Instant::now();
                if let Some(banner) = session.tick(now - last) {
                    write_block(&mut output, &banner).await?;
                }
                last = now;
            }
        }
    }

    info!(status = %session.game().status(), plies = session.game().plies(), "session ended");
    output.flush().await?;
    Ok(())
}

async fn write_block<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<(), ChessError> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n\n").await?;
    output.flush().await?;
    Ok(())
}
