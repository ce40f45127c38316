use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde_json::json;

use super::AppState;
use crate::adapter::handler::error::AppError;
use crate::adapter::middleware::auth::{bearer_token, invalid_token, missing_token};
use crate::domain::entity::user::{UserRole, UserView};
use crate::usecase::login::{LoginError, LoginInput};
use crate::usecase::register_user::{AuthSession, RegisterInput, RegisterUserError};
use crate::usecase::validate_token::ValidateTokenError;

fn session_body(message: &str, session: AuthSession) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": message,
        "token": session.token,
        "user": session.user,
    }))
}

fn register_error(err: RegisterUserError) -> AppError {
    match err {
        RegisterUserError::Validation(errors) => AppError::validation(errors),
        RegisterUserError::InvalidAdminCode => AppError::forbidden(
            "BRGY_AUTH_INVALID_ADMIN_CODE",
            "Invalid admin registration code",
        ),
        RegisterUserError::UsernameTaken => {
            AppError::bad_request("BRGY_AUTH_USERNAME_TAKEN", "Username already exists")
        }
        RegisterUserError::Internal(msg) => {
            tracing::error!(error = %msg, "registration failed");
            AppError::internal("BRGY_AUTH_REGISTER_FAILED", "Error during registration")
        }
    }
}

async fn register(
    state: &AppState,
    body: Result<Json<RegisterInput>, JsonRejection>,
    role: UserRole,
    message: &str,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let Json(input) =
        body.map_err(|e| AppError::bad_request("BRGY_INVALID_BODY", &e.body_text()))?;
    let session = state
        .register_user_uc
        .execute(input, role)
        .await
        .map_err(register_error)?;
    Ok((StatusCode::CREATED, session_body(message, session)))
}

/// POST /api/auth/register-admin
pub async fn register_admin(
    State(state): State<AppState>,
    body: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    register(&state, body, UserRole::Admin, "Admin user created successfully").await
}

/// POST /api/auth/register-user
pub async fn register_user(
    State(state): State<AppState>,
    body: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    // 一般ユーザー登録では adminCode を無視する
    let body = body.map(|Json(input)| {
        Json(RegisterInput {
            admin_code: None,
            ..input
        })
    });
    register(&state, body, UserRole::User, "User registered successfully").await
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(input) =
        body.map_err(|e| AppError::bad_request("BRGY_INVALID_BODY", &e.body_text()))?;
    match state.login_uc.execute(input).await {
        Ok(session) => Ok(session_body("Login successful", session)),
        Err(LoginError::Validation(errors)) => Err(AppError::validation(errors)),
        Err(LoginError::InvalidCredentials) => Err(AppError::unauthorized(
            "BRGY_AUTH_INVALID_CREDENTIALS",
            "Invalid username or password",
        )),
        Err(LoginError::Internal(msg)) => {
            tracing::error!(error = %msg, "login failed");
            Err(AppError::internal("BRGY_AUTH_LOGIN_FAILED", "Error during login"))
        }
    }
}

/// GET /api/auth/verify
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = bearer_token(&headers).ok_or_else(missing_token)?;
    match state.validate_token_uc.execute(token).await {
        Ok(user) => Ok(Json(json!({ "success": true, "user": user }))),
        Err(ValidateTokenError::InvalidToken) => Err(invalid_token()),
        Err(ValidateTokenError::Internal(msg)) => Err(anyhow::anyhow!(msg).into()),
    }
}

/// POST /api/auth/logout
/// トークンはステートレスなので、クライアント側で破棄させるだけ。
pub async fn logout() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": "Logged out successfully" }))
}

/// GET /api/auth/me
pub async fn me(Extension(user): Extension<UserView>) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "user": user }))
}
