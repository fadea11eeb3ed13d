//! Router assembly and shared application state.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use taskvault_core::DueTimeResolver;
use taskvault_store::TaskStore;

use crate::handlers;

/// Shared state injected into every handler: the process-wide store and the
/// due-time resolver, both created once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TaskStore>,
    pub resolver: Arc<dyn DueTimeResolver>,
}

impl AppState {
    pub fn new(store: Arc<TaskStore>, resolver: Arc<dyn DueTimeResolver>) -> Self {
        Self { store, resolver }
    }
}

/// Build the service router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/tasks",
            post(handlers::create_task).get(handlers::query_tasks),
        )
        .route("/tasks/bulk", post(handlers::create_tasks_bulk))
        .route(
            "/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
