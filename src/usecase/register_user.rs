use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entity::user::{User, UserRole, UserView};
use crate::domain::repository::UserRepository;
use crate::domain::service::resident_validator::{field_errors, FieldError};
use crate::infrastructure::password::hash_password;
use crate::infrastructure::TokenService;

/// RegisterInput はアカウント登録 API のリクエストボディ。
/// adminCode は管理者登録時のみ必須。
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    pub admin_code: Option<String>,
}

fn validate_username(value: &str) -> Result<(), validator::ValidationError> {
    let message = match value.chars().count() {
        0 => "Username is required",
        1..=2 => "Username must be at least 3 characters long",
        31.. => "Username cannot exceed 30 characters",
        _ => return Ok(()),
    };
    Err(validator::ValidationError::new("username").with_message(message.into()))
}

fn validate_password(value: &str) -> Result<(), validator::ValidationError> {
    let message = match value.chars().count() {
        0 => "Password is required",
        1..=5 => "Password must be at least 6 characters long",
        _ => return Ok(()),
    };
    Err(validator::ValidationError::new("password").with_message(message.into()))
}

/// AuthSession は登録・ログイン成功時に返すトークンとユーザー情報。
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserView,
}

/// RegisterUserError はアカウント登録に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum RegisterUserError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Invalid admin registration code")]
    InvalidAdminCode,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("internal error: {0}")]
    Internal(String),
}

/// RegisterUserUseCase は一般ユーザーおよび管理者アカウントを登録する。
/// 管理者登録は設定された登録コードと一致した場合のみ許可する。
pub struct RegisterUserUseCase {
    user_repo: Arc<dyn UserRepository>,
    token_service: Arc<dyn TokenService>,
    admin_code: SecretString,
}

impl RegisterUserUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        token_service: Arc<dyn TokenService>,
        admin_code: SecretString,
    ) -> Self {
        Self {
            user_repo,
            token_service,
            admin_code,
        }
    }

    pub async fn execute(
        &self,
        input: RegisterInput,
        role: UserRole,
    ) -> Result<AuthSession, RegisterUserError> {
        let mut errors = match input.validate() {
            Ok(()) => Vec::new(),
            Err(e) => field_errors(&e),
        };
        let admin_code = input.admin_code.as_deref().unwrap_or_default();
        if role == UserRole::Admin && admin_code.is_empty() {
            errors.push(FieldError {
                field: "adminCode".to_string(),
                message: "Admin registration code is required".to_string(),
            });
        }
        if !errors.is_empty() {
            return Err(RegisterUserError::Validation(errors));
        }

        if role == UserRole::Admin && admin_code != self.admin_code.expose_secret().as_str() {
            tracing::warn!(username = %input.username, "admin registration rejected: invalid code");
            return Err(RegisterUserError::InvalidAdminCode);
        }

        let existing = self
            .user_repo
            .find_by_username(&input.username)
            .await
            .map_err(|e| RegisterUserError::Internal(e.to_string()))?;
        if existing.is_some() {
            return Err(RegisterUserError::UsernameTaken);
        }

        let password = input.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| RegisterUserError::Internal(e.to_string()))?
            .map_err(|e| RegisterUserError::Internal(e.to_string()))?;

        let user = User::new(input.username, password_hash, role);
        self.user_repo
            .create(&user)
            .await
            .map_err(|e| RegisterUserError::Internal(e.to_string()))?;

        let token = self
            .token_service
            .issue(&user)
            .map_err(|e| RegisterUserError::Internal(e.to_string()))?;

        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(AuthSession {
            token,
            user: user.view(),
        })
    }
}
