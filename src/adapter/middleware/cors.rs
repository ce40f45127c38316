use std::time::Duration;

use anyhow::Context;
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::infrastructure::config::CorsConfig;

/// 設定からブラウザ向けの CORS レイヤーを組み立てる。
pub fn cors_layer(cfg: &CorsConfig) -> anyhow::Result<CorsLayer> {
    let origin = if cfg.mirrors_request_origin() {
        AllowOrigin::mirror_request()
    } else {
        let origins = cfg
            .allowed_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("invalid cors origin: {o}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT])
        .expose_headers([
            HeaderName::from_static("content-range"),
            HeaderName::from_static("x-content-range"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(cfg.max_age_secs)))
}
