use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::adapter::handler::error::AppError;
use crate::adapter::handler::AppState;
use crate::usecase::validate_token::ValidateTokenError;

pub fn missing_token() -> AppError {
    AppError::unauthorized("BRGY_AUTH_MISSING_TOKEN", "No token provided")
}

pub fn invalid_token() -> AppError {
    AppError::unauthorized("BRGY_AUTH_TOKEN_INVALID", "Invalid token")
}

/// `Authorization: Bearer <token>` からトークン部分を取り出す。
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// auth_middleware はトークンを検証し、ログイン中のユーザーを
/// リクエスト拡張 (`UserView`) に格納する。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or_else(missing_token)?
        .to_string();

    let user = state
        .validate_token_uc
        .execute(&token)
        .await
        .map_err(|e| match e {
            ValidateTokenError::InvalidToken => invalid_token(),
            ValidateTokenError::Internal(msg) => AppError::from(anyhow::anyhow!(msg)),
        })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token_valid() {
        assert_eq!(bearer_token(&headers("Bearer my-token")), Some("my-token"));
    }

    #[test]
    fn test_bearer_token_missing() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        assert_eq!(bearer_token(&headers("Basic abc123")), None);
    }

    #[test]
    fn test_bearer_token_empty() {
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
    }
}
