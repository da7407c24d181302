//! Client side of the opening-trainer move-exchange protocol.
//!
//! The server owns the game: it runs the engine, the opening book and the
//! move-quality assessment. This crate keeps a local replica of the position
//! for legality checks, negotiates promotion-piece selection with the user,
//! submits encoded moves over HTTP and reconciles the replica with whatever
//! authoritative state comes back. The board widget itself is behind the
//! [`board::BoardSurface`] seam.

pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod promotion;
pub mod render;
pub mod session;
pub mod wire;

pub use api::TrainerApi;
pub use board::{BoardSurface, RecordingSurface};
pub use config::ClientConfig;
pub use error::ClientError;
pub use promotion::PromotionNegotiator;
pub use session::{DropOutcome, GameSession, Mode};
