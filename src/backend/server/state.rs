/**
 * Application State
 *
 * Defines `AppState`, the state shared by every handler, and the `FromRef`
 * impls that let a handler extract only the part it needs.
 *
 * # Contents
 *
 * - `config` - the validated `AppConfig`
 * - `tasks` - the task service (store + hub + store deadline)
 * - `users` - the user store
 * - `hub` - the Broadcast Hub, also reachable through `tasks`
 * - `sessions` - token signing/verification and cookie values
 *
 * Everything is cheap to clone: handles around `Arc`s.
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::auth::sessions::SessionManager;
use crate::backend::realtime::BroadcastHub;
use crate::backend::store::UserStore;
use crate::backend::tasks::TaskService;
use crate::shared::AppConfig;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tasks: TaskService,
    pub users: Arc<dyn UserStore>,
    pub hub: BroadcastHub,
    pub sessions: SessionManager,
}

impl FromRef<AppState> for TaskService {
    fn from_ref(state: &AppState) -> Self {
        state.tasks.clone()
    }
}

impl FromRef<AppState> for BroadcastHub {
    fn from_ref(state: &AppState) -> Self {
        state.hub.clone()
    }
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.config)
    }
}
