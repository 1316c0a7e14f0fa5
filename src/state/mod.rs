pub mod catalog;
pub mod engine;
pub mod session;
pub mod store;

use std::sync::Arc;

use crate::{config::AppConfig, state::store::SessionStore};

pub use self::catalog::{Catalog, CatalogError, FALLBACK_LANGUAGE, Question};
pub use self::engine::{Feedback, TurnOutcome};
pub use self::session::{LetterStatus, SessionSnapshot, SessionState};
pub use self::store::{OpenedSession, TurnReply};

/// Cheaply clonable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state: the session registry and runtime configuration.
pub struct AppState {
    sessions: SessionStore,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(catalog: Catalog, config: AppConfig) -> SharedState {
        Arc::new(Self {
            sessions: SessionStore::new(Arc::new(catalog), config.game_duration()),
            config,
        })
    }

    /// Registry of live game sessions.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
