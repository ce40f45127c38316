use std::sync::Arc;

use serde::Deserialize;
use validator::Validate;

use crate::domain::repository::UserRepository;
use crate::domain::service::resident_validator::{field_errors, FieldError};
use crate::infrastructure::password::verify_password;
use crate::infrastructure::TokenService;
use crate::usecase::register_user::AuthSession;

/// LoginInput はログイン API のリクエストボディ。
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// LoginError はログインに関するエラーを表す。
/// ユーザー不在とパスワード不一致は区別しない。
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("internal error: {0}")]
    Internal(String),
}

/// LoginUseCase は資格情報を照合してアクセストークンを発行する。
pub struct LoginUseCase {
    user_repo: Arc<dyn UserRepository>,
    token_service: Arc<dyn TokenService>,
}

impl LoginUseCase {
    pub fn new(user_repo: Arc<dyn UserRepository>, token_service: Arc<dyn TokenService>) -> Self {
        Self {
            user_repo,
            token_service,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> Result<AuthSession, LoginError> {
        input
            .validate()
            .map_err(|e| LoginError::Validation(field_errors(&e)))?;

        let user = self
            .user_repo
            .find_by_username(&input.username)
            .await
            .map_err(|e| LoginError::Internal(e.to_string()))?
            .ok_or(LoginError::InvalidCredentials)?;

        let password = input.password;
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| LoginError::Internal(e.to_string()))?
            .map_err(|e| LoginError::Internal(e.to_string()))?;
        if !matches {
            tracing::warn!(username = %user.username, "login rejected: password mismatch");
            return Err(LoginError::InvalidCredentials);
        }

        let token = self
            .token_service
            .issue(&user)
            .map_err(|e| LoginError::Internal(e.to_string()))?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(AuthSession {
            token,
            user: user.view(),
        })
    }
}
