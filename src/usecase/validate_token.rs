use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entity::user::UserView;
use crate::domain::repository::UserRepository;
use crate::infrastructure::TokenService;

/// ValidateTokenError はトークン検証に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum ValidateTokenError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("internal error: {0}")]
    Internal(String),
}

/// ValidateTokenUseCase はアクセストークンを検証し、発行先のユーザーを返す。
/// 署名・有効期限が正しくてもユーザーが削除済みなら無効とする。
pub struct ValidateTokenUseCase {
    user_repo: Arc<dyn UserRepository>,
    token_service: Arc<dyn TokenService>,
}

impl ValidateTokenUseCase {
    pub fn new(user_repo: Arc<dyn UserRepository>, token_service: Arc<dyn TokenService>) -> Self {
        Self {
            user_repo,
            token_service,
        }
    }

    pub async fn execute(&self, token: &str) -> Result<UserView, ValidateTokenError> {
        let claims = self.token_service.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "token verification failed");
            ValidateTokenError::InvalidToken
        })?;
        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| ValidateTokenError::InvalidToken)?;

        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| ValidateTokenError::Internal(e.to_string()))?
            .map(|user| user.view())
            .ok_or(ValidateTokenError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::claims::Claims;
    use crate::domain::entity::user::{User, UserRole};
    use crate::domain::repository::user_repository::MockUserRepository;
    use crate::infrastructure::token_service::MockTokenService;

    fn claims_for(user: &User) -> Claims {
        Claims::for_user(user, 1_700_000_000, 3600)
    }

    #[tokio::test]
    async fn test_validate_returns_user() {
        let user = User::new("kagawad".to_string(), "hash".to_string(), UserRole::User);
        let claims = claims_for(&user);
        let found = user.clone();

        let mut tokens = MockTokenService::new();
        tokens
            .expect_verify()
            .returning(move |_| Ok(claims.clone()));
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .withf(move |id| *id == found.id)
            .returning(move |_| Ok(Some(user.clone())));

        let uc = ValidateTokenUseCase::new(Arc::new(users), Arc::new(tokens));
        let view = uc.execute("token").await.unwrap();
        assert_eq!(view.username, "kagawad");
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_signature() {
        let mut tokens = MockTokenService::new();
        tokens
            .expect_verify()
            .returning(|_| Err(anyhow::anyhow!("InvalidSignature")));
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().never();

        let uc = ValidateTokenUseCase::new(Arc::new(users), Arc::new(tokens));
        assert!(matches!(
            uc.execute("forged").await,
            Err(ValidateTokenError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_validate_rejects_deleted_user() {
        let user = User::new("former".to_string(), "hash".to_string(), UserRole::Admin);
        let claims = claims_for(&user);

        let mut tokens = MockTokenService::new();
        tokens
            .expect_verify()
            .returning(move |_| Ok(claims.clone()));
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let uc = ValidateTokenUseCase::new(Arc::new(users), Arc::new(tokens));
        let err = uc.execute("token").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid token");
    }
}
