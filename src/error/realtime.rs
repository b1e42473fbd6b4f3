use thiserror::Error as ThisError;
use tokio_tungstenite::tungstenite;

#[derive(Debug, ThisError)]
pub enum SubscribeError {
    #[error("Invalid realtime endpoint: {0}")]
    Endpoint(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum ReleaseError {
    #[error("subscription connection already closed")]
    ConnectionClosed,
}
