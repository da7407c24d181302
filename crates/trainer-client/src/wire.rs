//! Typed view of the trainer service's JSON payloads.
//!
//! The server sends duck-typed records; everything here is optional or
//! defaulted so that absent and unknown fields are tolerated, per the wire
//! contract. Validation happens at this boundary, not in the flow logic.

use serde::Deserialize;

/// Two-phase submission marker: `first` carries the player's move, `second`
/// asks the engine for its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    First,
    Second,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::First => "first",
            Phase::Second => "second",
        }
    }
}

/// One popularity-annotated book line (`{"move": "e2e4", "popularity": 62}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameLine {
    #[serde(rename = "move")]
    pub mv: String,
    #[serde(default)]
    pub popularity: i64,
}

/// Authoritative game state plus annotations, as carried in the `data`
/// member of move and navigation responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameUpdate {
    #[serde(default)]
    pub moves: Vec<String>,
    #[serde(default)]
    pub pgn: String,
    #[serde(default)]
    pub fen: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub player_color: Option<String>,
    #[serde(default)]
    pub bot_move: Option<String>,
    #[serde(default)]
    pub ask_again: Option<bool>,
    #[serde(default)]
    pub lock_board: bool,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub active_bar: bool,
    #[serde(default)]
    pub move_message: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub square: Option<String>,
    #[serde(default)]
    pub refutation: Option<String>,
    #[serde(default)]
    pub mainline: Option<GameLine>,
    #[serde(default)]
    pub sidelines: Vec<GameLine>,
}

/// Envelope of `make_move`, `prev_move` and `next_move` responses. The
/// trainer pages answer with `{"data": {...}}`, the explore page may answer
/// with a redirect, and the plain bot page answers with a bare FEN.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoveReply {
    #[serde(default)]
    pub data: Option<GameUpdate>,
    #[serde(default)]
    pub fen: Option<String>,
    #[serde(default)]
    pub redirect: Option<bool>,
    #[serde(default)]
    pub url: Option<String>,
}

/// `query_game_state` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameStateSummary {
    #[serde(default)]
    pub pgn: String,
    #[serde(default)]
    pub score: Option<i64>,
}

/// `choose_mode` / `choose_color` navigation response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChooseReply {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub redirect: String,
}

impl ChooseReply {
    pub fn is_success(&self) -> bool {
        self.response == "success"
    }
}
