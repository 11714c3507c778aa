mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::FeatureFlags;
use crate::db::Database;
use crate::ops::StrategySelector;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub operations: Arc<StrategySelector>,
}

impl AppState {
    pub fn new(db: Database, flags: FeatureFlags) -> Self {
        let operations = Arc::new(StrategySelector::from_database(db.clone(), flags));
        Self { db, operations }
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/streets", get(handlers::list_streets))
        .route("/streets", post(handlers::create_street))
        .route("/streets/{id}", get(handlers::get_street))
        .route("/streets/{id}", delete(handlers::delete_street))
        .route("/streets/{id}/points", post(handlers::add_point))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
