//! Local replica of the authoritative game state.
//!
//! The replica exists for legality checks and rendering only. It is rebuilt
//! from scratch whenever the server sends an authoritative move list or FEN
//! snapshot, never merged with local optimistic state.

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, File, Move, Position, Square};

use crate::uci::UciMove;

#[derive(Debug, thiserror::Error)]
pub enum ReplicaError {
    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("move {0} is not legal in the current position")]
    IllegalMove(UciMove),

    #[error(transparent)]
    Format(#[from] crate::uci::MoveFormatError),
}

#[derive(Debug, Clone)]
pub struct GameReplica {
    base: Chess,
    position: Chess,
    moves: Vec<UciMove>,
}

impl Default for GameReplica {
    fn default() -> Self {
        Self::new()
    }
}

impl GameReplica {
    /// Replica at the standard initial position.
    pub fn new() -> Self {
        Self {
            base: Chess::default(),
            position: Chess::default(),
            moves: Vec::new(),
        }
    }

    /// Rebuild by replaying an authoritative coordinate-move list from the
    /// initial position. The server is trusted to send legal histories; an
    /// illegal entry is reported, not skipped.
    pub fn from_moves<S: AsRef<str>>(moves: &[S]) -> Result<Self, ReplicaError> {
        let mut replica = Self::new();
        for mv in moves {
            let mv: UciMove = mv.as_ref().parse()?;
            replica.play(mv)?;
        }
        Ok(replica)
    }

    /// Rebuild from a FEN snapshot. Used by the single-phase flow, where the
    /// server reconciles with a position string instead of a move list.
    pub fn from_fen(fen: &str) -> Result<Self, ReplicaError> {
        let parsed: Fen = fen.parse().map_err(|e: shakmaty::fen::ParseFenError| {
            ReplicaError::InvalidFen {
                fen: fen.to_string(),
                reason: e.to_string(),
            }
        })?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| ReplicaError::InvalidFen {
                fen: fen.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            base: position.clone(),
            position,
            moves: Vec::new(),
        })
    }

    pub fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn is_game_over(&self) -> bool {
        self.position.is_game_over()
    }

    /// Moves applied since the replica's base position.
    pub fn moves(&self) -> &[UciMove] {
        &self.moves
    }

    pub fn piece_color_at(&self, square: Square) -> Option<Color> {
        self.position.board().piece_at(square).map(|p| p.color)
    }

    /// Destination squares of all legal moves from `from`. Castling is
    /// reported at the king's destination, matching the wire notation.
    pub fn legal_targets(&self, from: Square) -> Vec<Square> {
        self.position
            .legal_moves()
            .into_iter()
            .filter_map(|m| match m {
                Move::Normal { from: f, to, .. } if f == from => Some(to),
                Move::EnPassant { from: f, to } if f == from => Some(to),
                Move::Castle { king, rook } if king == from => Some(castle_target(king, rook)),
                _ => None,
            })
            .collect()
    }

    /// First legal move matching (from, to), promotion ignored. A promoting
    /// drop matches one of the four promotion candidates; the caller decides
    /// the piece afterwards.
    pub fn candidate(&self, from: Square, to: Square) -> Option<Move> {
        self.position.legal_moves().into_iter().find(|m| match m {
            Move::Normal { from: f, to: t, .. } => *f == from && *t == to,
            Move::EnPassant { from: f, to: t } => *f == from && *t == to,
            Move::Castle { king, rook } => *king == from && castle_target(*king, *rook) == to,
            _ => false,
        })
    }

    pub fn requires_promotion(&self, from: Square, to: Square) -> bool {
        self.candidate(from, to).map_or(false, |m| m.is_promotion())
    }

    /// Apply a coordinate move. Castling arrives in king-to-destination form
    /// (`e1g1`) and en passant as a plain pawn capture, so the move is
    /// resolved against the legal-move list rather than trusted verbatim.
    pub fn play(&mut self, mv: UciMove) -> Result<(), ReplicaError> {
        let legal = self
            .match_legal(mv)
            .ok_or(ReplicaError::IllegalMove(mv))?;
        self.position.play_unchecked(&legal);
        self.moves.push(mv);
        Ok(())
    }

    /// Drop the last applied move and replay the rest from the base
    /// position. Returns the removed move, if any.
    pub fn undo(&mut self) -> Result<Option<UciMove>, ReplicaError> {
        let Some(removed) = self.moves.pop() else {
            return Ok(None);
        };
        let moves = std::mem::take(&mut self.moves);
        self.position = self.base.clone();
        for mv in &moves {
            let legal = self
                .match_legal(*mv)
                .ok_or(ReplicaError::IllegalMove(*mv))?;
            self.position.play_unchecked(&legal);
            self.moves.push(*mv);
        }
        Ok(Some(removed))
    }

    fn match_legal(&self, mv: UciMove) -> Option<Move> {
        self.position.legal_moves().into_iter().find(|m| match m {
            Move::Normal {
                from,
                to,
                promotion,
                ..
            } => *from == mv.from && *to == mv.to && *promotion == mv.promotion,
            Move::EnPassant { from, to } => {
                *from == mv.from && *to == mv.to && mv.promotion.is_none()
            }
            Move::Castle { king, rook } => {
                *king == mv.from
                    && castle_target(*king, *rook) == mv.to
                    && mv.promotion.is_none()
            }
            _ => false,
        })
    }
}

fn castle_target(king: Square, rook: Square) -> Square {
    let file = if rook.file() > king.file() {
        File::G
    } else {
        File::C
    };
    Square::from_coords(file, king.rank())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Role;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn play_all(replica: &mut GameReplica, moves: &[&str]) {
        for m in moves {
            replica.play(m.parse().unwrap()).unwrap();
        }
    }

    #[test]
    fn starts_from_initial_position() {
        let replica = GameReplica::new();
        assert_eq!(replica.fen(), START_FEN);
        assert_eq!(replica.turn(), Color::White);
    }

    #[test]
    fn rebuilds_from_move_list() {
        let replica = GameReplica::from_moves(&["e2e4", "e7e5"]).unwrap();
        assert_eq!(
            replica.fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
        );
        assert_eq!(replica.moves().len(), 2);
    }

    #[test]
    fn rejects_illegal_history() {
        let err = GameReplica::from_moves(&["e2e5"]).unwrap_err();
        assert!(matches!(err, ReplicaError::IllegalMove(_)));
    }

    #[test]
    fn applies_castling_in_king_destination_form() {
        let mut replica = GameReplica::new();
        play_all(
            &mut replica,
            &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1"],
        );
        assert!(replica.fen().starts_with("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1"));
        assert_eq!(replica.turn(), Color::Black);
    }

    #[test]
    fn applies_en_passant_capture() {
        let mut replica = GameReplica::new();
        play_all(&mut replica, &["e2e4", "a7a6", "e4e5", "d7d5", "e5d6"]);
        // The d5 pawn is gone and a white pawn sits on d6.
        assert!(replica.fen().starts_with("rnbqkbnr/1pp1pppp/p2P4/8"));
    }

    #[test]
    fn detects_promotion_candidates() {
        let replica = GameReplica::from_fen("7k/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(replica.requires_promotion(Square::E7, Square::E8));
        assert!(!replica.requires_promotion(Square::E1, Square::E2));
    }

    #[test]
    fn promotion_requires_a_piece_choice() {
        let mut replica = GameReplica::from_fen("7k/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let bare = UciMove::new(Square::E7, Square::E8);
        assert!(matches!(
            replica.play(bare),
            Err(ReplicaError::IllegalMove(_))
        ));
        replica
            .play(UciMove::with_promotion(Square::E7, Square::E8, Role::Queen))
            .unwrap();
        assert!(replica.fen().starts_with("4Q2k"));
    }

    #[test]
    fn legal_targets_from_start() {
        let replica = GameReplica::new();
        let mut targets = replica.legal_targets(Square::E2);
        targets.sort();
        assert_eq!(targets, vec![Square::E3, Square::E4]);
        assert!(replica.legal_targets(Square::E5).is_empty());
    }

    #[test]
    fn undo_replays_remaining_history() {
        let mut replica = GameReplica::new();
        play_all(&mut replica, &["e2e4", "e7e5"]);
        let removed = replica.undo().unwrap();
        assert_eq!(removed, Some("e7e5".parse().unwrap()));
        assert_eq!(
            replica.fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        let removed = replica.undo().unwrap();
        assert_eq!(removed, Some("e2e4".parse().unwrap()));
        assert_eq!(replica.fen(), START_FEN);
        assert_eq!(replica.undo().unwrap(), None);
    }

    #[test]
    fn fen_snapshot_round_trip() {
        let replica = GameReplica::from_fen(START_FEN).unwrap();
        assert_eq!(replica.fen(), START_FEN);
        assert!(GameReplica::from_fen("not a fen").is_err());
    }
}
