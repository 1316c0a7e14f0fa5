use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{sync::RwLock, time::Instant};
use tracing::info;

use crate::state::{
    catalog::Catalog,
    engine::{self, TurnOutcome},
    session::{SessionSnapshot, SessionState},
};

/// Result of [`SessionStore::get_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedSession {
    /// Language the session plays in, after fallback resolution.
    pub language: String,
    /// True when the session did not exist before this call.
    pub created: bool,
    /// Projection of the session right after opening it.
    pub snapshot: SessionSnapshot,
}

/// Result of applying an answer or pass through the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    /// Outcome reported by the engine.
    pub outcome: TurnOutcome,
    /// Projection taken under the same lock as the turn.
    pub snapshot: SessionSnapshot,
}

/// Registry of live sessions guarded by a single lock.
///
/// Session states never leave the lock: every accessor runs a closure or
/// returns an owned projection, so no handle outlives one operation.
pub struct SessionStore {
    catalog: Arc<Catalog>,
    game_duration: Duration,
    sessions: RwLock<HashMap<String, SessionState>>,
}

impl SessionStore {
    /// Build an empty store backed by `catalog`.
    pub fn new(catalog: Arc<Catalog>, game_duration: Duration) -> Self {
        Self {
            catalog,
            game_duration,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Catalog shared by every session.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Return the session for `session_id`, creating it in `language` if absent.
    ///
    /// The requested language is ignored for an existing session.
    pub async fn get_or_create(&self, session_id: &str, language: &str) -> OpenedSession {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        if let Some(state) = sessions.get_mut(session_id) {
            engine::check_expiry(state, now);
            return OpenedSession {
                language: state.language.clone(),
                created: false,
                snapshot: state.snapshot(),
            };
        }

        let (resolved, questions) = self.catalog.resolve(language);
        if resolved != language {
            info!(
                session_id = %session_id,
                requested = %language,
                resolved = %resolved,
                "unknown language requested; using fallback"
            );
        }

        let state = SessionState::new(session_id, resolved, questions, self.game_duration, now);
        let opened = OpenedSession {
            language: state.language.clone(),
            created: true,
            snapshot: state.snapshot(),
        };
        sessions.insert(session_id.to_string(), state);
        info!(session_id = %session_id, language = %opened.language, "session created");

        opened
    }

    /// Current projection of a session, refreshing its clock first.
    ///
    /// The expiry check can flip the session to game over, so this takes the
    /// exclusive lock.
    pub async fn get(&self, session_id: &str) -> Option<SessionSnapshot> {
        self.with_session_mut(session_id, |state| {
            engine::check_expiry(state, Instant::now());
            state.snapshot()
        })
        .await
    }

    /// Submit an answer for a session. `None` when the session does not exist
    /// or was already over.
    pub async fn submit_answer(&self, session_id: &str, answer: &str) -> Option<TurnReply> {
        self.run_turn(session_id, |state, now| {
            engine::submit_answer(state, answer, now)
        })
        .await
    }

    /// Pass the active question of a session. Same contract as [`Self::submit_answer`].
    pub async fn pass(&self, session_id: &str) -> Option<TurnReply> {
        self.run_turn(session_id, engine::pass).await
    }

    /// Run a read-only closure against a session under the shared lock.
    pub async fn with_session<T>(
        &self,
        session_id: &str,
        f: impl FnOnce(&SessionState) -> T,
    ) -> Option<T> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(f)
    }

    /// Run a mutating closure against a session under the exclusive lock.
    pub async fn with_session_mut<T>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut SessionState) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(session_id).map(f)
    }

    /// Number of sessions currently registered.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no session has been created yet.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn run_turn<F>(&self, session_id: &str, turn: F) -> Option<TurnReply>
    where
        F: FnOnce(&mut SessionState, Instant) -> TurnOutcome,
    {
        self.with_session_mut(session_id, |state| {
            let outcome = turn(state, Instant::now());
            if outcome == TurnOutcome::Rejected {
                return None;
            }
            if state.is_game_over {
                info!(
                    session_id = %state.session_id,
                    correct = state.correct_count,
                    wrong = state.wrong_count,
                    "game over"
                );
            }
            Some(TurnReply {
                outcome,
                snapshot: state.snapshot(),
            })
        })
        .await
        .flatten()
    }
}
