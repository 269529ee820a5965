/**
 * Router Configuration
 *
 * Builds the axum router from the route table.
 *
 * # Assembly
 *
 * 1. Each `RouteId` contributes a method router; guarded ones get the
 *    session middleware as a route layer, so it runs only for that method
 * 2. Method routers sharing a path are merged (`/tasks/{key}` carries GET,
 *    PUT and DELETE, each guarded on its own)
 * 3. `GET /` greeting, and JSON 404 and 405 fallbacks
 * 4. Request tracing and CORS (credentials allowed, explicit origins)
 */

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::Json,
    routing::{get, MethodRouter},
    Router,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::middleware::require_session;
use crate::backend::routes::table::RouteId;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let auth_table = app_state.config.routes;
    let mut by_path: BTreeMap<&'static str, MethodRouter<AppState>> = BTreeMap::new();

    for route in RouteId::ALL {
        let mut method_router = route.method_router();
        if route.requires_auth(&auth_table) {
            method_router =
                method_router.route_layer(middleware::from_fn_with_state(app_state.clone(), require_session));
        }

        let merged = match by_path.remove(route.path()) {
            Some(existing) => existing.merge(method_router),
            None => method_router,
        };
        by_path.insert(route.path(), merged);

        tracing::debug!(
            "[Router] {:?} {} (session {})",
            route,
            route.path(),
            if route.requires_auth(&auth_table) { "required" } else { "not required" }
        );
    }

    let mut router = Router::new().route("/", get(greeting));
    for (path, method_router) in by_path {
        router = router.route(path, method_router);
    }

    let cors = cors_layer(&app_state.config.cors_origins);

    router
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(app_state)
}

async fn greeting() -> &'static str {
    "Task server is running"
}

async fn route_not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "route not found", "status": 404 })))
}

async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "method not allowed", "status": 405 })),
    )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("[Router] Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
