// Router for the power graph service
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    delete_file, health_check, list_files, power_graph_page, redirect_to_index, static_file,
    upload_file,
};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(redirect_to_index))
        .route("/index.html", get(power_graph_page))
        .route("/healthz", get(health_check))
        .route("/list", get(list_files))
        .route("/upload", post(upload_file))
        .route("/delete", delete(delete_file))
        .fallback(static_file)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
