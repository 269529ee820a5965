/**
 * Server Initialization
 *
 * Builds `AppState` from a validated configuration and the chosen stores,
 * then hands it to the router.
 *
 * # Initialization Process
 *
 * 1. Create the Broadcast Hub from `config.hub`
 * 2. Open the stores (PostgreSQL, or memory as fallback)
 * 3. Wrap the task store in the `TaskService` with the store deadline
 * 4. Create the router with all routes and middleware
 */

use axum::Router;
use std::sync::Arc;

use crate::backend::auth::sessions::SessionManager;
use crate::backend::realtime::BroadcastHub;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_stores;
use crate::backend::server::state::AppState;
use crate::backend::store::{TaskStore, UserStore};
use crate::backend::tasks::TaskService;
use crate::shared::AppConfig;

/// Create and configure the Axum application
pub async fn create_app(config: AppConfig) -> Router<()> {
    tracing::info!("Initializing task server");

    let (task_store, user_store) = load_stores(&config).await;
    let state = build_state(config, task_store, user_store);

    tracing::info!(
        "Broadcast hub ready (capacity {}, overflow {:?})",
        state.hub.config().subscriber_capacity,
        state.hub.config().overflow
    );

    create_router(state)
}

/// Assemble the shared state around the given stores
pub fn build_state(config: AppConfig, task_store: Arc<dyn TaskStore>, user_store: Arc<dyn UserStore>) -> AppState {
    let hub = BroadcastHub::new(config.hub);
    let tasks = TaskService::new(task_store, hub.clone(), config.store_timeout());
    let sessions = SessionManager::from_config(&config);

    AppState {
        config: Arc::new(config),
        tasks,
        users: user_store,
        hub,
        sessions,
    }
}
