//! In-process stand-in for the trainer service.
//!
//! Serves the move-exchange endpoints on an ephemeral port and keeps the
//! authoritative game state in a shared [`StubState`], so tests can script
//! replies and inspect exactly what the client sent.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::State;
use axum::routing::post;
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use shakmaty::{Role, Square};
use trainer_core::{GameReplica, UciMove};

#[derive(Default)]
pub struct StubState {
    /// Authoritative move history.
    pub moves: Vec<String>,
    /// Every `make_move` request received, as `(move_uci, phase)`.
    pub requests: Vec<(String, Option<String>)>,
    /// Plies undone by `prev_move`, redone by `next_move`.
    pub redo: Vec<String>,
    /// When this move arrives in the first phase, answer with a locked
    /// board and a blunder icon.
    pub lock_on: Option<String>,
    /// When set, phaseless `make_move` answers with a redirect.
    pub redirect_to: Option<String>,
    /// Scripted engine replies, consumed front first. Falls back to the
    /// first legal move.
    pub bot_script: Vec<String>,
    /// Value of `ask_again` in first-phase replies, when set.
    pub ask_again: Option<bool>,
    /// Book line included in replies, as `(move, popularity)`.
    pub mainline: Option<(String, i64)>,
    pub sidelines: Vec<(String, i64)>,
    pub score: i64,
    pub bot_lvl: Option<u8>,
    pub freedom_degree: Option<u8>,
}

impl StubState {
    pub fn new() -> Self {
        Self {
            score: 50,
            ..Self::default()
        }
    }
}

pub type Shared = Arc<Mutex<StubState>>;

pub fn shared(state: StubState) -> Shared {
    Arc::new(Mutex::new(state))
}

pub fn lock(state: &Shared) -> MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Bind an ephemeral port, serve the stub on it, return the base URL.
pub async fn spawn_stub(state: Shared) -> String {
    let router = Router::new()
        .route("/make_move", post(make_move))
        .route("/prev_move", post(prev_move))
        .route("/next_move", post(next_move))
        .route("/query_game_state", post(query_game_state))
        .route("/set_bot_lvl", post(set_bot_lvl))
        .route("/set_freedom_degree", post(set_freedom_degree))
        .route("/choose_mode", post(choose_mode))
        .route("/choose_color", post(choose_color))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve stub");
    });
    format!("http://{addr}")
}

#[derive(Deserialize)]
struct MoveForm {
    #[serde(default)]
    move_uci: String,
    #[serde(default)]
    phase: Option<String>,
    #[serde(default)]
    fen: Option<String>,
}

fn replica_of(moves: &[String]) -> GameReplica {
    GameReplica::from_moves(moves).expect("stub history is legal")
}

fn pgn(moves: &[String]) -> String {
    moves
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| format!("{}. {}", i + 1, pair.join(" ")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_legal_move(replica: &GameReplica) -> Option<UciMove> {
    for from in Square::ALL {
        if let Some(to) = replica.legal_targets(from).first().copied() {
            let mv = if replica.requires_promotion(from, to) {
                UciMove::with_promotion(from, to, Role::Queen)
            } else {
                UciMove::new(from, to)
            };
            return Some(mv);
        }
    }
    None
}

fn base_update(state: &StubState) -> Value {
    let replica = replica_of(&state.moves);
    json!({
        "moves": state.moves,
        "pgn": pgn(&state.moves),
        "fen": replica.fen(),
        "score": state.score,
        "active_bar": true,
        "lock_board": false,
    })
}

fn with_book(state: &StubState, mut update: Value) -> Value {
    let fields = update.as_object_mut().expect("update is an object");
    if let Some((mv, popularity)) = &state.mainline {
        fields.insert(
            "mainline".into(),
            json!({"move": mv, "popularity": popularity}),
        );
    }
    if !state.sidelines.is_empty() {
        let lines: Vec<Value> = state
            .sidelines
            .iter()
            .map(|(mv, popularity)| json!({"move": mv, "popularity": popularity}))
            .collect();
        fields.insert("sidelines".into(), Value::Array(lines));
    }
    update
}

async fn make_move(State(state): State<Shared>, Form(form): Form<MoveForm>) -> Json<Value> {
    // Stateless bot page: position in, position out.
    if let Some(fen) = &form.fen {
        let mut replica = GameReplica::from_fen(fen).expect("request fen is valid");
        let mv: UciMove = form.move_uci.parse().expect("request move is well formed");
        replica.play(mv).expect("request move is legal");
        if let Some(reply) = first_legal_move(&replica) {
            replica.play(reply).expect("stub reply is legal");
        }
        return Json(json!({"fen": replica.fen()}));
    }

    let mut state = lock(&state);
    state
        .requests
        .push((form.move_uci.clone(), form.phase.clone()));

    match form.phase.as_deref() {
        // Explore page: one request, whole update or a redirect.
        None => {
            if let Some(url) = &state.redirect_to {
                return Json(json!({"redirect": true, "url": url}));
            }
            state.moves.push(form.move_uci);
            let update = with_book(&state, base_update(&state));
            Json(json!({"data": update}))
        }
        Some("first") => {
            state.moves.push(form.move_uci.clone());
            let mut update = base_update(&state);
            let fields = update.as_object_mut().unwrap();
            if state.lock_on.as_deref() == Some(form.move_uci.as_str()) {
                let target = form.move_uci.get(2..4).unwrap_or_default();
                fields.insert("lock_board".into(), json!(true));
                fields.insert("icon".into(), json!("blunder"));
                fields.insert("square".into(), json!(target));
                fields.insert("move_message".into(), json!("That loses material."));
            }
            if let Some(ask) = state.ask_again {
                fields.insert("ask_again".into(), json!(ask));
            }
            Json(json!({"data": update}))
        }
        Some(_) => {
            let replica = replica_of(&state.moves);
            let bot = if state.bot_script.is_empty() {
                first_legal_move(&replica)
                    .expect("position has a legal reply")
                    .to_string()
            } else {
                state.bot_script.remove(0)
            };
            state.moves.push(bot.clone());
            let mut update = with_book(&state, base_update(&state));
            update
                .as_object_mut()
                .unwrap()
                .insert("bot_move".into(), json!(bot));
            Json(json!({"data": update}))
        }
    }
}

async fn prev_move(State(state): State<Shared>) -> Json<Value> {
    let mut state = lock(&state);
    let Some(undone) = state.moves.pop() else {
        return Json(json!({"data": null}));
    };
    state.redo.push(undone);
    let update = base_update(&state);
    Json(json!({"data": update}))
}

async fn next_move(State(state): State<Shared>) -> Json<Value> {
    let mut state = lock(&state);
    let Some(redone) = state.redo.pop() else {
        return Json(json!({"data": null}));
    };
    state.moves.push(redone);
    let update = base_update(&state);
    Json(json!({"data": update}))
}

async fn query_game_state(State(state): State<Shared>) -> Json<Value> {
    let state = lock(&state);
    Json(json!({"pgn": pgn(&state.moves), "score": state.score}))
}

#[derive(Deserialize)]
struct BotLvlForm {
    bot_lvl: u8,
}

async fn set_bot_lvl(State(state): State<Shared>, Form(form): Form<BotLvlForm>) -> Json<Value> {
    lock(&state).bot_lvl = Some(form.bot_lvl);
    Json(json!({"response": "success"}))
}

#[derive(Deserialize)]
struct FreedomForm {
    freedom_degree: u8,
}

async fn set_freedom_degree(
    State(state): State<Shared>,
    Form(form): Form<FreedomForm>,
) -> Json<Value> {
    lock(&state).freedom_degree = Some(form.freedom_degree);
    Json(json!({"response": "success"}))
}

async fn choose_mode(State(_state): State<Shared>) -> Json<Value> {
    Json(json!({"response": "success", "redirect": "/play"}))
}

async fn choose_color(State(_state): State<Shared>) -> Json<Value> {
    Json(json!({"response": "success", "redirect": "/play"}))
}
