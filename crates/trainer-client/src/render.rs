//! Turns a server reply into surface commands.

use shakmaty::{Color, Square};
use tracing::warn;
use trainer_core::UciMove;

use crate::board::{ArrowColor, BoardSurface, TurnMarker};
use crate::wire::GameUpdate;

/// How much feedback the current mode reveals after each move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintLevel {
    /// Book arrows, move icons and refutations.
    Full,
    /// Icons and refutations only, no arrows.
    IconsOnly,
    /// Nothing drawn at all.
    None,
}

pub(crate) fn render_turn_marker<S: BoardSurface>(
    surface: &mut S,
    player: Option<Color>,
    turn: Color,
) {
    let marker = match player {
        Some(color) if color == turn => TurnMarker::Bottom,
        Some(_) => TurnMarker::Top,
        None => TurnMarker::Neutral,
    };
    surface.set_turn_marker(marker);
}

pub(crate) fn render_bars<S: BoardSurface>(surface: &mut S, update: &GameUpdate) {
    if let Some(score) = update.score {
        surface.set_eval_bar(score);
    }
    surface.set_bar_visible(update.active_bar);
}

/// Redraws annotations from scratch for one reply. An icon reply takes
/// precedence over book arrows: the server sends one or the other.
pub(crate) fn render_annotations<S: BoardSurface>(
    surface: &mut S,
    update: &GameUpdate,
    hints: HintLevel,
) {
    if hints == HintLevel::None {
        return;
    }
    surface.clear_annotations();

    if let Some(icon) = update.icon.as_deref().filter(|i| !i.is_empty()) {
        let Some(square) = update.square.as_deref().and_then(parse_square) else {
            warn!(icon, square = ?update.square, "icon reply without a usable square");
            surface.hide_refutation();
            return;
        };
        surface.draw_move_icon(square, &format!("{icon}-pattern"));
        match update.refutation.as_deref().filter(|r| !r.is_empty()) {
            Some(refutation) => {
                let fen = update.fen.as_deref().unwrap_or_default();
                surface.show_refutation(fen, refutation);
            }
            None => surface.hide_refutation(),
        }
        return;
    }

    surface.hide_refutation();
    if hints != HintLevel::Full {
        return;
    }
    if let Some(line) = &update.mainline {
        draw_line_arrow(surface, &line.mv, line.popularity, ArrowColor::Mainline);
    }
    for line in &update.sidelines {
        draw_line_arrow(surface, &line.mv, line.popularity, ArrowColor::Sideline);
    }
}

fn draw_line_arrow<S: BoardSurface>(
    surface: &mut S,
    mv: &str,
    popularity: i64,
    color: ArrowColor,
) {
    match mv.parse::<UciMove>() {
        Ok(uci) => surface.draw_arrow(uci.from, uci.to, &format!("{popularity}%"), color),
        Err(err) => warn!(mv, %err, "skipping unparseable book move"),
    }
}

fn parse_square(s: &str) -> Option<Square> {
    s.parse().ok()
}
