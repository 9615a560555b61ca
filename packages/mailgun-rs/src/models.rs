use serde::{Deserialize, Serialize};

/// Response body from `POST /v3/{domain}/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResponse {
    /// Queued message id, e.g. `<20240101000000.1.ABC@example.org>`.
    pub id: String,
    pub message: String,
}
