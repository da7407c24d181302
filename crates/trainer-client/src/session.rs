//! Drop-to-reconciliation flow for one game page.
//!
//! A [`GameSession`] owns the local replica, the promotion negotiator and
//! the board surface, and turns piece drops into submissions shaped for the
//! current training mode. The server's reply is authoritative: whatever the
//! session rendered optimistically is rebuilt from the reply's move list.

use std::str::FromStr;
use std::time::Duration;

use shakmaty::{Color, Role, Square};
use tracing::{debug, warn};
use trainer_core::{GameReplica, UciMove};

use crate::api::TrainerApi;
use crate::board::BoardSurface;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::promotion::PromotionNegotiator;
use crate::render::{render_annotations, render_bars, render_turn_marker, HintLevel};
use crate::wire::{GameUpdate, Phase};

/// Training mode of the current page. Decides the submission shape and how
/// much feedback gets rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Beginner,
    Medium,
    Advanced,
    Expert,
    Explore,
    Casual,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Beginner => "beginner",
            Mode::Medium => "medium",
            Mode::Advanced => "advanced",
            Mode::Expert => "expert",
            Mode::Explore => "explore",
            Mode::Casual => "casual",
        }
    }

    pub(crate) fn profile(self) -> ModeProfile {
        match self {
            Mode::Beginner => ModeProfile {
                submission: Submission::TwoPhase,
                delayed_reply: false,
                second_needs_ask: false,
                hints: HintLevel::Full,
                show_messages: true,
            },
            Mode::Medium => ModeProfile {
                submission: Submission::TwoPhase,
                delayed_reply: true,
                second_needs_ask: false,
                hints: HintLevel::IconsOnly,
                show_messages: false,
            },
            Mode::Advanced => ModeProfile {
                submission: Submission::TwoPhase,
                delayed_reply: true,
                second_needs_ask: true,
                hints: HintLevel::Full,
                show_messages: false,
            },
            Mode::Expert => ModeProfile {
                submission: Submission::TwoPhase,
                delayed_reply: true,
                second_needs_ask: false,
                hints: HintLevel::None,
                show_messages: false,
            },
            Mode::Explore => ModeProfile {
                submission: Submission::SingleRequest,
                delayed_reply: false,
                second_needs_ask: false,
                hints: HintLevel::Full,
                show_messages: true,
            },
            Mode::Casual => ModeProfile {
                submission: Submission::FenSnapshot,
                delayed_reply: false,
                second_needs_ask: false,
                hints: HintLevel::None,
                show_messages: false,
            },
        }
    }
}

impl FromStr for Mode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Mode::Beginner),
            "medium" => Ok(Mode::Medium),
            "advanced" => Ok(Mode::Advanced),
            "expert" => Ok(Mode::Expert),
            "explore" => Ok(Mode::Explore),
            "casual" => Ok(Mode::Casual),
            other => Err(ClientError::BadRequest(format!("unknown mode '{other}'"))),
        }
    }
}

/// How a mode ships a move to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Submission {
    /// `phase=first` for the player's move, `phase=second` for the engine's
    /// reply.
    TwoPhase,
    /// One request, whole update (or a redirect) in the response.
    SingleRequest,
    /// Stateless exchange: request carries the FEN, response carries the FEN
    /// with the engine's reply applied.
    FenSnapshot,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ModeProfile {
    pub submission: Submission,
    pub delayed_reply: bool,
    /// Second phase fires only when the first reply says `ask_again`.
    pub second_needs_ask: bool,
    pub hints: HintLevel,
    pub show_messages: bool,
}

/// What became of a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Not a legal move, or the board refused it. The piece goes back.
    Snapback,
    /// Submitted and reconciled.
    Played(UciMove),
    /// The explore page ran out of book and wants a page change.
    Redirect(String),
}

pub struct GameSession<S: BoardSurface> {
    api: TrainerApi,
    surface: S,
    mode: Mode,
    profile: ModeProfile,
    replica: GameReplica,
    negotiator: PromotionNegotiator,
    player: Option<Color>,
    board_locked: bool,
    in_flight: bool,
    move_delay: Duration,
}

impl<S: BoardSurface> GameSession<S> {
    pub fn new(
        config: &ClientConfig,
        api: TrainerApi,
        surface: S,
        mode: Mode,
        player: Option<Color>,
    ) -> Self {
        Self {
            api,
            surface,
            mode,
            profile: mode.profile(),
            replica: GameReplica::new(),
            negotiator: PromotionNegotiator::new(),
            player,
            board_locked: false,
            in_flight: false,
            move_delay: config.move_delay,
        }
    }

    /// Whether a drag may start from `source`. A drag during an open
    /// promotion session acts as a click on that square instead.
    pub fn on_drag_start(&mut self, source: Square) -> bool {
        if self.negotiator.is_open() {
            if let Err(err) = self.negotiator.select_square(source) {
                warn!(%err, "promotion click failed");
            }
            return false;
        }
        if self.board_locked || self.in_flight || self.replica.is_game_over() {
            return false;
        }
        let Some(color) = self.replica.piece_color_at(source) else {
            return false;
        };
        color == self.replica.turn() && self.player.map_or(true, |p| p == color)
    }

    /// Submit a drop from `from` to `to`. At most one submission runs at a
    /// time; the board refuses drags while one is in flight.
    pub async fn submit_drop(&mut self, from: Square, to: Square) -> Result<DropOutcome, ClientError> {
        if self.in_flight {
            return Err(ClientError::SubmissionInFlight);
        }
        if self.board_locked || self.replica.is_game_over() {
            return Ok(DropOutcome::Snapback);
        }
        if self.replica.candidate(from, to).is_none() {
            debug!(%from, %to, "drop has no legal candidate");
            return Ok(DropOutcome::Snapback);
        }
        self.in_flight = true;
        let outcome = self.drive(from, to).await;
        self.in_flight = false;
        outcome
    }

    async fn drive(&mut self, from: Square, to: Square) -> Result<DropOutcome, ClientError> {
        let mv = if self.replica.requires_promotion(from, to) {
            match self.negotiate_promotion(from, to).await? {
                Some(role) => UciMove::with_promotion(from, to, role),
                None => return Ok(DropOutcome::Snapback),
            }
        } else {
            UciMove::new(from, to)
        };

        match self.profile.submission {
            Submission::TwoPhase => self.submit_two_phase(mv).await,
            Submission::SingleRequest => self.submit_single(mv).await,
            Submission::FenSnapshot => self.submit_fen(mv).await,
        }
    }

    /// Park until the user picks a promotion piece. `None` means the session
    /// was cancelled and the position was restored from the snapshot.
    async fn negotiate_promotion(
        &mut self,
        from: Square,
        to: Square,
    ) -> Result<Option<Role>, ClientError> {
        let color = self.replica.turn();
        let snapshot = self.replica.fen();
        let pending = self.negotiator.begin(color, to, snapshot.clone())?;
        self.surface.show_promotion_overlays(pending.overlays());
        let choice = pending.choice().await;
        self.surface.clear_promotion_overlays();
        match choice {
            Ok(role) => {
                debug!(%from, %to, ?role, "promotion selected");
                Ok(Some(role))
            }
            Err(ClientError::PromotionCancelled) => {
                self.surface.set_position(&snapshot, false);
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }

    async fn submit_two_phase(&mut self, mv: UciMove) -> Result<DropOutcome, ClientError> {
        self.play_optimistic(mv)?;
        let encoded = mv.to_string();

        let reply = self.api.make_move(&encoded, Some(Phase::First)).await?;
        let update = require_data(reply.data, "make_move")?;
        self.apply_update(&update)?;

        let proceed = update.ask_again.unwrap_or(!self.profile.second_needs_ask);
        if self.board_locked || !proceed {
            return Ok(DropOutcome::Played(mv));
        }

        if self.profile.delayed_reply {
            tokio::time::sleep(self.move_delay).await;
        }
        let reply = self.api.make_move(&encoded, Some(Phase::Second)).await?;
        let update = require_data(reply.data, "make_move")?;
        self.animate_bot_move(&update);
        self.apply_update(&update)?;
        Ok(DropOutcome::Played(mv))
    }

    async fn submit_single(&mut self, mv: UciMove) -> Result<DropOutcome, ClientError> {
        self.play_optimistic(mv)?;
        let reply = self.api.make_move(&mv.to_string(), None).await?;
        if reply.redirect == Some(true) {
            return Ok(DropOutcome::Redirect(reply.url.unwrap_or_default()));
        }
        let update = require_data(reply.data, "make_move")?;
        self.apply_update(&update)?;
        Ok(DropOutcome::Played(mv))
    }

    async fn submit_fen(&mut self, mv: UciMove) -> Result<DropOutcome, ClientError> {
        // The request carries the position before the move; the reply is
        // the position with the engine's answer already applied.
        let before = self.replica.fen();
        self.play_optimistic(mv)?;
        let reply = self.api.make_move_from_fen(&before, &mv.to_string()).await?;
        let Some(fen) = reply.fen else {
            return Err(ClientError::Protocol {
                endpoint: "make_move",
                reason: "reply carries neither data nor fen".to_string(),
            });
        };
        self.replica = GameReplica::from_fen(&fen)?;
        self.surface.set_position(&fen, true);
        render_turn_marker(&mut self.surface, self.player, self.replica.turn());
        Ok(DropOutcome::Played(mv))
    }

    fn play_optimistic(&mut self, mv: UciMove) -> Result<(), ClientError> {
        self.replica.play(mv)?;
        self.surface.set_position(&self.replica.fen(), true);
        Ok(())
    }

    /// Animate the engine's reply before the full rebuild, so the bot's
    /// piece glides instead of teleporting.
    fn animate_bot_move(&mut self, update: &GameUpdate) {
        let Some(bot) = update.bot_move.as_deref().filter(|m| !m.is_empty()) else {
            return;
        };
        match bot.parse::<UciMove>().map_err(ClientError::from).and_then(|mv| {
            self.replica.play(mv).map_err(ClientError::from)
        }) {
            Ok(()) => {
                let fen = self.replica.fen();
                self.surface.set_position(&fen, true);
            }
            Err(err) => warn!(bot, %err, "could not animate engine reply"),
        }
    }

    /// Reconcile with an authoritative update: rebuild the replica from the
    /// move list and redraw everything the mode reveals.
    pub fn apply_update(&mut self, update: &GameUpdate) -> Result<(), ClientError> {
        self.replica = GameReplica::from_moves(&update.moves)?;
        self.surface.set_position(&self.replica.fen(), false);

        if let Some(color) = update.player_color.as_deref() {
            self.player = match color {
                "white" => Some(Color::White),
                "black" => Some(Color::Black),
                // The explore page plays both sides as "noone".
                "noone" => None,
                _ => self.player,
            };
        }
        render_turn_marker(&mut self.surface, self.player, self.replica.turn());
        self.surface.set_pgn(&update.pgn);
        render_bars(&mut self.surface, update);
        self.board_locked = update.lock_board;

        if self.profile.show_messages {
            if let Some(message) = update.move_message.as_deref().filter(|m| !m.is_empty()) {
                self.surface.set_move_message(message);
            }
        }
        render_annotations(&mut self.surface, update, self.profile.hints);
        Ok(())
    }

    /// Step one ply back: undo locally right away, then reconcile with the
    /// server's view.
    pub async fn prev_move(&mut self) -> Result<(), ClientError> {
        if self.replica.undo()?.is_some() {
            self.surface.set_position(&self.replica.fen(), true);
        }
        if let Some(update) = self.api.prev_move().await? {
            self.apply_update(&update)?;
        }
        Ok(())
    }

    /// Step one ply forward along the stored game.
    pub async fn next_move(&mut self) -> Result<(), ClientError> {
        let Some(update) = self.api.next_move().await? else {
            return Ok(());
        };
        // Animate the restored ply when the update is exactly one ahead.
        if update.moves.len() == self.replica.moves().len() + 1 {
            if let Some(last) = update.moves.last() {
                if let Ok(mv) = last.parse::<UciMove>() {
                    if self.replica.play(mv).is_ok() {
                        self.surface.set_position(&self.replica.fen(), true);
                    }
                }
            }
        }
        self.apply_update(&update)?;
        Ok(())
    }

    /// Pull the PGN and evaluation without moving.
    pub async fn refresh_state(&mut self) -> Result<(), ClientError> {
        let summary = self.api.query_game_state().await?;
        self.surface.set_pgn(&summary.pgn);
        if let Some(score) = summary.score {
            self.surface.set_eval_bar(score);
        }
        Ok(())
    }

    /// Resolve an open promotion session with `role`.
    pub fn choose_promotion(&self, role: Role) -> Result<(), ClientError> {
        self.negotiator.select(role)
    }

    pub fn negotiator(&self) -> PromotionNegotiator {
        self.negotiator.clone()
    }

    pub fn replica(&self) -> &GameReplica {
        &self.replica
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn api(&self) -> &TrainerApi {
        &self.api
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_locked(&self) -> bool {
        self.board_locked
    }
}

fn require_data(data: Option<GameUpdate>, endpoint: &'static str) -> Result<GameUpdate, ClientError> {
    data.ok_or(ClientError::Protocol {
        endpoint,
        reason: "missing data member".to_string(),
    })
}
