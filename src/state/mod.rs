pub mod game;
pub mod state_machine;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::services::scoreboard_service::ScoreboardService;

pub use self::state_machine::{CommandError, Scoreboard, ScoreboardPhase, ScoreboardView};

/// Shared handle cloned into every request handler.
pub type SharedState = Arc<AppState>;

/// Central application state: the single scoreboard every request acts on.
pub struct AppState {
    scoreboard: Mutex<ScoreboardService>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(service: ScoreboardService) -> SharedState {
        Arc::new(Self {
            scoreboard: Mutex::new(service),
        })
    }

    /// Run `f` with exclusive access to the scoreboard.
    ///
    /// Commands are serialized through this lock, so every caller observes a
    /// fully settled state.
    pub async fn with_scoreboard<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut ScoreboardService) -> T,
    {
        let mut guard = self.scoreboard.lock().await;
        f(&mut *guard)
    }

    /// Owned copy of the current scoreboard.
    pub async fn view(&self) -> ScoreboardView {
        self.with_scoreboard(|service| service.view()).await
    }
}
