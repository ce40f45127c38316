use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::adapter::handler::AppState;

/// track_metrics はリクエスト件数とレイテンシを記録する。
/// path ラベルにはルート定義 (`/api/residents/{id}` など) を使い、未定義パスは `unmatched` にまとめる。
pub async fn track_metrics(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let duration_secs = started.elapsed().as_secs_f64();
    state
        .metrics
        .record_http_request(&method, &path, &status.to_string(), duration_secs);
    tracing::debug!(
        http.method = %method,
        http.path = %path,
        http.status_code = status,
        duration_secs,
        "request completed"
    );
    response
}
