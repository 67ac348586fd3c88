use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether scoreboard changes still reach the backing store.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.with_scoreboard(|service| service.health_check()).await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "storage health check failed (degraded mode)");
            HealthResponse::degraded()
        }
    }
}
