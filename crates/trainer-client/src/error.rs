use trainer_core::{MoveFormatError, ReplicaError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Format(#[from] MoveFormatError),

    #[error(transparent)]
    Replica(#[from] ReplicaError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response from {endpoint}: {reason}")]
    Protocol {
        endpoint: &'static str,
        reason: String,
    },

    #[error("a promotion selection is already open")]
    PromotionOpen,

    #[error("no promotion selection is open")]
    PromotionNotOpen,

    #[error("promotion selection was cancelled")]
    PromotionCancelled,

    #[error("a move submission is already in flight")]
    SubmissionInFlight,
}
