//! Headless terminal driver for the trainer client.
//!
//! Reads coordinate moves from stdin, pushes them through a [`GameSession`]
//! and prints the surface commands as text. Mostly useful for poking at a
//! running trainer server without a browser.

use anyhow::Context;
use shakmaty::{Role, Square};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use tokio::io::{AsyncBufReadExt, BufReader};

use trainer_client::board::{ArrowColor, BoardSurface, PromotionOverlay, TurnMarker};
use trainer_client::{ClientConfig, DropOutcome, GameSession, Mode, TrainerApi};
use trainer_core::UciMove;

/// Surface that narrates every command to stdout.
struct TermSurface;

impl BoardSurface for TermSurface {
    fn set_position(&mut self, fen: &str, animate: bool) {
        if animate {
            println!("position (animated): {fen}");
        } else {
            println!("position: {fen}");
        }
    }

    fn show_promotion_overlays(&mut self, overlays: &[PromotionOverlay]) {
        for overlay in overlays {
            println!("promotion choice: {:?} on {}", overlay.role, overlay.square);
        }
    }

    fn clear_promotion_overlays(&mut self) {
        println!("promotion choices cleared");
    }

    fn clear_annotations(&mut self) {}

    fn draw_arrow(&mut self, from: Square, to: Square, label: &str, color: ArrowColor) {
        println!("arrow {from}->{to} {label} ({color:?})");
    }

    fn draw_move_icon(&mut self, square: Square, pattern: &str) {
        println!("icon {pattern} on {square}");
    }

    fn set_eval_bar(&mut self, score: i64) {
        println!("eval: {score}%");
    }

    fn set_bar_visible(&mut self, visible: bool) {
        if !visible {
            println!("eval hidden");
        }
    }

    fn set_turn_marker(&mut self, marker: TurnMarker) {
        println!("on move: {marker:?}");
    }

    fn set_pgn(&mut self, pgn: &str) {
        println!("pgn: {pgn}");
    }

    fn set_move_message(&mut self, message: &str) {
        println!("message: {message}");
    }

    fn show_refutation(&mut self, _fen: &str, refutation: &str) {
        println!("refutation: {refutation}");
    }

    fn hide_refutation(&mut self) {}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ClientConfig::from_env();
    let mode: Mode = std::env::var("TRAINER_MODE")
        .unwrap_or_else(|_| "beginner".to_string())
        .parse()
        .context("TRAINER_MODE")?;
    let api = TrainerApi::new(&config)?;
    let mut session = GameSession::new(&config, api, TermSurface, mode, None);

    println!("trainer-cli: {} mode against {}", mode.as_str(), config.base_url);
    println!("commands: <uci move> | prev | next | state | lvl <n> | freedom <n> | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_whitespace().collect::<Vec<_>>().as_slice() {
            [] => {}
            ["quit" | "exit"] => break,
            ["prev"] => report(session.prev_move().await),
            ["next"] => report(session.next_move().await),
            ["state"] => report(session.refresh_state().await),
            ["lvl", n] => match n.parse() {
                Ok(level) => report(session.api().set_bot_lvl(level).await),
                Err(_) => println!("bot level must be a number"),
            },
            ["freedom", n] => match n.parse() {
                Ok(degree) => report(session.api().set_freedom_degree(degree).await),
                Err(_) => println!("freedom degree must be a number"),
            },
            [mv] => match mv.parse::<UciMove>() {
                Ok(mv) => submit(&mut session, mv).await,
                Err(err) => println!("bad move: {err}"),
            },
            _ => println!("unrecognized command"),
        }
    }
    Ok(())
}

/// Submit one move; if the drop opens a promotion session, resolve it from
/// the move's own suffix (queen when none was given).
async fn submit(session: &mut GameSession<TermSurface>, mv: UciMove) {
    let negotiator = session.negotiator();
    let choice = mv.promotion.unwrap_or(Role::Queen);

    let submit = session.submit_drop(mv.from, mv.to);
    tokio::pin!(submit);
    let outcome = tokio::select! {
        outcome = &mut submit => outcome,
        () = negotiator.opened() => {
            if let Err(err) = negotiator.select(choice) {
                warn!(%err, "promotion selection failed");
            }
            submit.await
        }
    };
    match outcome {
        Ok(DropOutcome::Played(mv)) => println!("played {mv}"),
        Ok(DropOutcome::Snapback) => println!("refused, piece returned"),
        Ok(DropOutcome::Redirect(url)) => println!("out of book, server suggests {url}"),
        Err(err) => println!("error: {err}"),
    }
}

fn report(result: Result<(), trainer_client::ClientError>) {
    if let Err(err) = result {
        println!("error: {err}");
    }
}
