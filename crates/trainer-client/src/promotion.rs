//! Promotion selection between drop and submission.
//!
//! A drop onto the last rank cannot be encoded until the player picks a
//! piece, so the submission flow parks on a [`PendingPromotion`] while the
//! surface shows four overlay pieces in the file of the target square. The
//! negotiator is a cheap cloneable handle; whoever drives the UI resolves
//! it from the other side.

use std::sync::{Arc, Mutex};

use shakmaty::{Color, Rank, Role, Square};
use tokio::sync::{oneshot, Notify};

use crate::board::PromotionOverlay;
use crate::error::ClientError;

pub const PROMOTION_ROLES: [Role; 4] = [Role::Queen, Role::Rook, Role::Bishop, Role::Knight];

/// Overlay layout for a promotion on `target`: four squares running from
/// the target square toward the middle of the board, queen first.
pub fn overlay_squares(target: Square, color: Color) -> Vec<PromotionOverlay> {
    let ranks: [u32; 4] = if target.rank() == Rank::Eighth {
        [7, 6, 5, 4]
    } else {
        [0, 1, 2, 3]
    };
    PROMOTION_ROLES
        .iter()
        .zip(ranks)
        .map(|(&role, rank)| PromotionOverlay {
            square: Square::from_coords(target.file(), Rank::new(rank)),
            role,
            color,
        })
        .collect()
}

enum State {
    Idle,
    Awaiting {
        tx: oneshot::Sender<Role>,
        overlays: Vec<PromotionOverlay>,
    },
}

struct Inner {
    state: Mutex<State>,
    opened: Notify,
}

/// Shared handle coordinating one promotion selection at a time.
#[derive(Clone)]
pub struct PromotionNegotiator {
    inner: Arc<Inner>,
}

impl Default for PromotionNegotiator {
    fn default() -> Self {
        Self::new()
    }
}

impl PromotionNegotiator {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::Idle),
                opened: Notify::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Open a selection session for a drop onto `target`. `snapshot` is the
    /// FEN to restore should the session be cancelled.
    pub fn begin(
        &self,
        color: Color,
        target: Square,
        snapshot: String,
    ) -> Result<PendingPromotion, ClientError> {
        let overlays = overlay_squares(target, color);
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.lock();
            if matches!(*state, State::Awaiting { .. }) {
                return Err(ClientError::PromotionOpen);
            }
            *state = State::Awaiting {
                tx,
                overlays: overlays.clone(),
            };
        }
        self.inner.opened.notify_one();
        Ok(PendingPromotion {
            rx,
            overlays,
            snapshot,
        })
    }

    /// Resolve the open session with the given piece.
    pub fn select(&self, role: Role) -> Result<(), ClientError> {
        let state = {
            let mut state = self.lock();
            std::mem::replace(&mut *state, State::Idle)
        };
        match state {
            State::Awaiting { tx, .. } => {
                // Receiver gone means the pending future was dropped; the
                // session is closed either way.
                let _ = tx.send(role);
                Ok(())
            }
            State::Idle => Err(ClientError::PromotionNotOpen),
        }
    }

    /// Resolve by square instead of piece. Clicks land on squares; a click
    /// outside the overlay column resolves to `None` and cancels nothing.
    pub fn select_square(&self, square: Square) -> Result<Option<Role>, ClientError> {
        let role = {
            let state = self.lock();
            match &*state {
                State::Awaiting { overlays, .. } => overlays
                    .iter()
                    .find(|o| o.square == square)
                    .map(|o| o.role),
                State::Idle => return Err(ClientError::PromotionNotOpen),
            }
        };
        if let Some(role) = role {
            self.select(role)?;
        }
        Ok(role)
    }

    /// Abort the open session, if any. The pending future resolves with
    /// [`ClientError::PromotionCancelled`].
    pub fn cancel(&self) {
        let mut state = self.lock();
        *state = State::Idle;
    }

    pub fn is_open(&self) -> bool {
        matches!(*self.lock(), State::Awaiting { .. })
    }

    /// Wait until a session is open. Returns immediately if one already is.
    pub async fn opened(&self) {
        loop {
            if self.is_open() {
                return;
            }
            self.inner.opened.notified().await;
        }
    }
}

/// Wait side of an open promotion session.
#[derive(Debug)]
pub struct PendingPromotion {
    rx: oneshot::Receiver<Role>,
    overlays: Vec<PromotionOverlay>,
    snapshot: String,
}

impl PendingPromotion {
    pub fn overlays(&self) -> &[PromotionOverlay] {
        &self.overlays
    }

    /// FEN of the position before the drop.
    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    pub async fn choice(self) -> Result<Role, ClientError> {
        self.rx.await.map_err(|_| ClientError::PromotionCancelled)
    }
}
