use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header::RETRY_AFTER, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::adapter::handler::error::AppError;
use crate::adapter::handler::AppState;
use crate::infrastructure::config::RateLimitConfig;
use crate::infrastructure::rate_limiter::{FixedWindowLimiter, RateLimitDecision};

const API_PREFIX: &str = "/api/";
const AUTH_PREFIX: &str = "/api/auth";

/// RateLimiters は API 全体と認証エンドポイント用の制限器。
#[derive(Debug, Clone)]
pub struct RateLimiters {
    pub api: Arc<FixedWindowLimiter>,
    pub auth: Arc<FixedWindowLimiter>,
}

impl RateLimiters {
    pub fn from_config(cfg: &RateLimitConfig) -> Self {
        Self {
            api: Arc::new(FixedWindowLimiter::new(cfg.api.max_requests, cfg.api.window_secs)),
            auth: Arc::new(FixedWindowLimiter::new(cfg.auth.max_requests, cfg.auth.window_secs)),
        }
    }
}

fn request_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}

fn too_many_requests(decision: RateLimitDecision, message: &str) -> Response {
    let mut response =
        AppError::too_many_requests("BRGY_RATE_LIMITED", message).into_response();
    response
        .headers_mut()
        .insert(RETRY_AFTER, HeaderValue::from(decision.reset_after_secs));
    response
}

/// rate_limit は `/api/` 配下のリクエストをクライアント IP ごとに数える。
/// `/api/auth` 配下はさらに失敗したリクエストだけを別枠で数える。
/// 接続元 IP が分からない場合は制限しない。
pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (Some(limiters), Some(ip)) = (state.rate_limiters.clone(), request_ip(&req)) else {
        return next.run(req).await;
    };
    let path = req.uri().path();
    let (is_api, is_auth) = (path.starts_with(API_PREFIX), path.starts_with(AUTH_PREFIX));
    if !is_api {
        return next.run(req).await;
    }

    let decision = limiters.api.acquire(ip).await;
    if !decision.allowed {
        tracing::warn!(client_ip = %ip, "api rate limit exceeded");
        return too_many_requests(
            decision,
            "Too many requests from this IP, please try again later",
        );
    }
    if !is_auth {
        return next.run(req).await;
    }

    let decision = limiters.auth.acquire(ip).await;
    if !decision.allowed {
        tracing::warn!(client_ip = %ip, "auth rate limit exceeded");
        return too_many_requests(
            decision,
            "Too many login attempts from this IP, please try again later",
        );
    }
    let response = next.run(req).await;
    if response.status().as_u16() < 400 {
        limiters.auth.release(ip).await;
    }
    response
}
