//! Seam between the protocol flow and the actual board widget.
//!
//! Drag-and-drop, SVG drawing and DOM updates are the widget's business;
//! the flow only issues the commands below.

use shakmaty::{Color, Role, Square};

/// Arrow color conventions for book-line feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowColor {
    Mainline,
    Sideline,
}

/// Which player card gets the on-move border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnMarker {
    Bottom,
    Top,
    Neutral,
}

/// One selectable promotion piece, shown on a square beneath the
/// promotion target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionOverlay {
    pub square: Square,
    pub role: Role,
    pub color: Color,
}

pub trait BoardSurface {
    /// Reposition the whole board from a FEN string.
    fn set_position(&mut self, fen: &str, animate: bool);

    fn show_promotion_overlays(&mut self, overlays: &[PromotionOverlay]);
    fn clear_promotion_overlays(&mut self);

    /// Remove every previously drawn arrow and icon. Annotations are always
    /// redrawn from scratch, never diffed.
    fn clear_annotations(&mut self);
    fn draw_arrow(&mut self, from: Square, to: Square, label: &str, color: ArrowColor);
    fn draw_move_icon(&mut self, square: Square, pattern: &str);

    /// Bottom bar gets `score` percent, top bar the complement.
    fn set_eval_bar(&mut self, score: i64);
    fn set_bar_visible(&mut self, visible: bool);

    fn set_turn_marker(&mut self, marker: TurnMarker);
    fn set_pgn(&mut self, pgn: &str);
    fn set_move_message(&mut self, message: &str);

    /// Fill and reveal the refutation form for the given position.
    fn show_refutation(&mut self, fen: &str, refutation: &str);
    fn hide_refutation(&mut self);
}

/// Everything a surface can be told to do, as plain data.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Position { fen: String, animate: bool },
    PromotionOverlays(Vec<PromotionOverlay>),
    ClearPromotionOverlays,
    ClearAnnotations,
    Arrow {
        from: Square,
        to: Square,
        label: String,
        color: ArrowColor,
    },
    Icon {
        square: Square,
        pattern: String,
    },
    EvalBar(i64),
    BarVisible(bool),
    Turn(TurnMarker),
    Pgn(String),
    MoveMessage(String),
    ShowRefutation {
        fen: String,
        refutation: String,
    },
    HideRefutation,
}

/// Headless surface that records every command it receives. Lets the flow
/// run without a widget, e.g. under tests or scripted drivers.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub events: Vec<SurfaceEvent>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arrows(&self) -> Vec<&SurfaceEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::Arrow { .. }))
            .collect()
    }

    pub fn icons(&self) -> Vec<&SurfaceEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::Icon { .. }))
            .collect()
    }

    pub fn last_position(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|e| match e {
            SurfaceEvent::Position { fen, .. } => Some(fen.as_str()),
            _ => None,
        })
    }

    pub fn contains(&self, event: &SurfaceEvent) -> bool {
        self.events.contains(event)
    }
}

impl BoardSurface for RecordingSurface {
    fn set_position(&mut self, fen: &str, animate: bool) {
        self.events.push(SurfaceEvent::Position {
            fen: fen.to_string(),
            animate,
        });
    }

    fn show_promotion_overlays(&mut self, overlays: &[PromotionOverlay]) {
        self.events
            .push(SurfaceEvent::PromotionOverlays(overlays.to_vec()));
    }

    fn clear_promotion_overlays(&mut self) {
        self.events.push(SurfaceEvent::ClearPromotionOverlays);
    }

    fn clear_annotations(&mut self) {
        self.events.push(SurfaceEvent::ClearAnnotations);
    }

    fn draw_arrow(&mut self, from: Square, to: Square, label: &str, color: ArrowColor) {
        self.events.push(SurfaceEvent::Arrow {
            from,
            to,
            label: label.to_string(),
            color,
        });
    }

    fn draw_move_icon(&mut self, square: Square, pattern: &str) {
        self.events.push(SurfaceEvent::Icon {
            square,
            pattern: pattern.to_string(),
        });
    }

    fn set_eval_bar(&mut self, score: i64) {
        self.events.push(SurfaceEvent::EvalBar(score));
    }

    fn set_bar_visible(&mut self, visible: bool) {
        self.events.push(SurfaceEvent::BarVisible(visible));
    }

    fn set_turn_marker(&mut self, marker: TurnMarker) {
        self.events.push(SurfaceEvent::Turn(marker));
    }

    fn set_pgn(&mut self, pgn: &str) {
        self.events.push(SurfaceEvent::Pgn(pgn.to_string()));
    }

    fn set_move_message(&mut self, message: &str) {
        self.events.push(SurfaceEvent::MoveMessage(message.to_string()));
    }

    fn show_refutation(&mut self, fen: &str, refutation: &str) {
        self.events.push(SurfaceEvent::ShowRefutation {
            fen: fen.to_string(),
            refutation: refutation.to_string(),
        });
    }

    fn hide_refutation(&mut self) {
        self.events.push(SurfaceEvent::HideRefutation);
    }
}
