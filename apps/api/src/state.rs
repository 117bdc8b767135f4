use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::llm_client::ChatBackend;
use crate::screening::conversation::ConversationHandler;
use crate::storage::CandidateStore;

/// How long an ended session whose record is on disk stays readable.
pub const ENDED_SESSION_RETENTION: Duration = Duration::from_secs(300);

/// One live screening: the dialogue plus the id of its persisted record, once written.
pub struct ScreeningSession {
    pub handler: ConversationHandler,
    pub record_id: Option<String>,
    last_active: Instant,
}

impl ScreeningSession {
    pub fn new(handler: ConversationHandler) -> Self {
        Self {
            handler,
            record_id: None,
            last_active: Instant::now(),
        }
    }

    /// Marks the session as used now.
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// Idle past `idle_timeout`, or ended with its record already persisted
    /// and idle past `ENDED_SESSION_RETENTION`.
    pub fn is_stale(&self, now: Instant, idle_timeout: Duration) -> bool {
        let idle = now.saturating_duration_since(self.last_active);
        let finished = self.handler.is_ended() && self.record_id.is_some();
        idle >= idle_timeout || (finished && idle >= ENDED_SESSION_RETENTION)
    }
}

/// Live sessions keyed by id. Each session sits behind its own lock, so
/// messages for one session are serialized without blocking the others.
pub type SessionRegistry = RwLock<HashMap<Uuid, Arc<Mutex<ScreeningSession>>>>;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    /// `None` when no usable API key is configured; every session runs offline.
    pub backend: Option<Arc<dyn ChatBackend>>,
    pub store: Arc<dyn CandidateStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        config: Config,
        backend: Option<Arc<dyn ChatBackend>>,
        store: Arc<dyn CandidateStore>,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            backend,
            store,
            config,
        }
    }

    pub async fn session(&self, id: Uuid) -> Option<Arc<Mutex<ScreeningSession>>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Drops stale sessions from the registry and returns how many went.
    /// A session whose lock is held is mid-request and always kept.
    pub async fn prune_stale_sessions(&self) -> usize {
        let now = Instant::now();
        let idle_timeout = self.config.session_idle_timeout;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, session| match session.try_lock() {
            Ok(session) => !session.is_stale(now, idle_timeout),
            Err(_) => true,
        });

        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "Pruned stale screening sessions");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::gateway::Gateway;
    use crate::storage::JsonFileStore;

    const IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

    fn state() -> AppState {
        let config = Config {
            anthropic_api_key: None,
            port: 0,
            rust_log: "info".to_string(),
            candidate_data_dir: "unused".into(),
            session_idle_timeout: IDLE_TIMEOUT,
        };
        AppState::new(config, None, Arc::new(JsonFileStore::new("unused")))
    }

    async fn insert(state: &AppState, session: ScreeningSession) -> Uuid {
        let id = Uuid::new_v4();
        state
            .sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    fn live_session() -> ScreeningSession {
        ScreeningSession::new(ConversationHandler::new(Gateway::offline()))
    }

    async fn finished_session() -> ScreeningSession {
        let mut handler = ConversationHandler::new(Gateway::offline());
        handler.initial_greeting().await;
        handler.process_message("bye").await;
        let mut session = ScreeningSession::new(handler);
        session.record_id = Some("candidate_20240309_140507".to_string());
        session
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_pruned() {
        let state = state();
        let idle = insert(&state, live_session()).await;

        tokio::time::advance(IDLE_TIMEOUT - Duration::from_secs(1)).await;
        let active = insert(&state, live_session()).await;
        assert_eq!(state.prune_stale_sessions().await, 0);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(state.prune_stale_sessions().await, 1);
        assert!(state.session(idle).await.is_none());
        assert!(state.session(active).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_keeps_session_alive() {
        let state = state();
        let id = insert(&state, live_session()).await;

        tokio::time::advance(IDLE_TIMEOUT - Duration::from_secs(1)).await;
        state.session(id).await.unwrap().lock().await.touch();
        tokio::time::advance(Duration::from_secs(10)).await;

        assert_eq!(state.prune_stale_sessions().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ended_and_persisted_sessions_go_early() {
        let state = state();
        let finished = insert(&state, finished_session().await).await;
        let mut unsaved = finished_session().await;
        unsaved.record_id = None;
        let unsaved = insert(&state, unsaved).await;

        tokio::time::advance(ENDED_SESSION_RETENTION).await;
        assert_eq!(state.prune_stale_sessions().await, 1);
        assert!(state.session(finished).await.is_none());
        // Not persisted yet, so it waits for the idle timeout
        assert!(state.session(unsaved).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_locked_session_is_kept() {
        let state = state();
        let id = insert(&state, live_session()).await;
        tokio::time::advance(IDLE_TIMEOUT).await;

        let session = state.session(id).await.unwrap();
        let _guard = session.lock().await;
        assert_eq!(state.prune_stale_sessions().await, 0);
    }
}
