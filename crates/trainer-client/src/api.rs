//! HTTP client for the trainer service.

use reqwest::Client;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::wire::{ChooseReply, GameStateSummary, GameUpdate, MoveReply, Phase};

pub struct TrainerApi {
    client: Client,
    base_url: String,
}

impl TrainerApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Submit a move. `phase` is present for the two-phase trainer pages and
    /// absent for the explore page.
    pub async fn make_move(
        &self,
        move_uci: &str,
        phase: Option<Phase>,
    ) -> Result<MoveReply, ClientError> {
        debug!(move_uci, phase = phase.map(Phase::as_str), "POST make_move");
        let mut form = vec![("move_uci", move_uci.to_string())];
        if let Some(phase) = phase {
            form.push(("phase", phase.as_str().to_string()));
        }
        let reply = self
            .client
            .post(self.url("make_move"))
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json::<MoveReply>()
            .await?;
        Ok(reply)
    }

    /// Single-phase submission: the request carries the position, the
    /// response is the position with the engine's reply already applied.
    pub async fn make_move_from_fen(
        &self,
        fen: &str,
        move_uci: &str,
    ) -> Result<MoveReply, ClientError> {
        debug!(move_uci, fen, "POST make_move (single-phase)");
        let reply = self
            .client
            .post(self.url("make_move"))
            .form(&[("fen", fen), ("move_uci", move_uci)])
            .send()
            .await?
            .error_for_status()?
            .json::<MoveReply>()
            .await?;
        Ok(reply)
    }

    /// Step one ply back. `None` means the server had nothing to undo.
    pub async fn prev_move(&self) -> Result<Option<GameUpdate>, ClientError> {
        debug!("POST prev_move");
        let reply = self
            .client
            .post(self.url("prev_move"))
            .send()
            .await?
            .error_for_status()?
            .json::<MoveReply>()
            .await?;
        Ok(reply.data)
    }

    /// Step one ply forward along the stored game.
    pub async fn next_move(&self) -> Result<Option<GameUpdate>, ClientError> {
        debug!("POST next_move");
        let reply = self
            .client
            .post(self.url("next_move"))
            .send()
            .await?
            .error_for_status()?
            .json::<MoveReply>()
            .await?;
        Ok(reply.data)
    }

    pub async fn query_game_state(&self) -> Result<GameStateSummary, ClientError> {
        debug!("POST query_game_state");
        let summary = self
            .client
            .post(self.url("query_game_state"))
            .send()
            .await?
            .error_for_status()?
            .json::<GameStateSummary>()
            .await?;
        Ok(summary)
    }

    pub async fn set_bot_lvl(&self, level: u8) -> Result<(), ClientError> {
        if !(1..=20).contains(&level) {
            return Err(ClientError::BadRequest(format!(
                "bot level {level} outside 1..=20"
            )));
        }
        debug!(level, "POST set_bot_lvl");
        self.client
            .post(self.url("set_bot_lvl"))
            .form(&[("bot_lvl", level.to_string())])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn set_freedom_degree(&self, degree: u8) -> Result<(), ClientError> {
        if !(1..=6).contains(&degree) {
            return Err(ClientError::BadRequest(format!(
                "freedom degree {degree} outside 1..=6"
            )));
        }
        debug!(degree, "POST set_freedom_degree");
        self.client
            .post(self.url("set_freedom_degree"))
            .form(&[("freedom_degree", degree.to_string())])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn choose_mode(&self, mode: &str) -> Result<ChooseReply, ClientError> {
        debug!(mode, "POST choose_mode");
        let reply = self
            .client
            .post(self.url("choose_mode"))
            .form(&[("mode", mode)])
            .send()
            .await?
            .error_for_status()?
            .json::<ChooseReply>()
            .await?;
        Ok(reply)
    }

    pub async fn choose_color(&self, color: &str) -> Result<ChooseReply, ClientError> {
        debug!(color, "POST choose_color");
        let reply = self
            .client
            .post(self.url("choose_color"))
            .form(&[("color", color)])
            .send()
            .await?
            .error_for_status()?
            .json::<ChooseReply>()
            .await?;
        Ok(reply)
    }
}
