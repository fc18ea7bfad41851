use super::files;
use super::AppState;
use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::time::Instant;

pub const FILES_BASE_PATH: &str = "/api/v1/files";

/// Build the HTTP router for the files API
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(
            FILES_BASE_PATH,
            get(files::list_files).post(files::create_file),
        )
        .route(&format!("{FILES_BASE_PATH}/{{id}}"), get(files::get_file))
        .route(&format!("{FILES_BASE_PATH}/{{id}}/png"), get(files::get_png))
        .route(
            &format!("{FILES_BASE_PATH}/{{id}}/attributes"),
            get(files::search_attributes),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        "{} {} -> {} in {:?}",
        method,
        path,
        response.status().as_u16(),
        started.elapsed()
    );
    response
}
