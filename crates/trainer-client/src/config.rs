use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the trainer service.
    pub base_url: String,
    /// Hard timeout per request; a stalled server surfaces as an error
    /// instead of a permanently locked board.
    pub request_timeout: Duration,
    /// Pause before applying the engine reply, for perceived smoothness.
    pub move_delay: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(30),
            move_delay: Duration::from_millis(300),
            user_agent: "OpeningTrainer/1.0".to_string(),
        }
    }

    pub fn from_env() -> Self {
        let base_url =
            env::var("TRAINER_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
        let request_timeout = env::var("TRAINER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));
        let move_delay = env::var("TRAINER_MOVE_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(300));
        Self {
            base_url,
            request_timeout,
            move_delay,
            user_agent: "OpeningTrainer/1.0".to_string(),
        }
    }

    /// No artificial pacing; used by headless drivers.
    pub fn without_move_delay(mut self) -> Self {
        self.move_delay = Duration::ZERO;
        self
    }
}
