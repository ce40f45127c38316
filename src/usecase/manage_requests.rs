use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entity::request::{RequestRecord, RequestStatus};
use crate::domain::entity::user::{UserRole, UserView};
use crate::domain::repository::RequestRepository;
use crate::domain::service::resident_validator::FieldError;

/// RequestError は申請の提出・審査に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Request not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

fn internal(err: anyhow::Error) -> RequestError {
    RequestError::Internal(err.to_string())
}

/// ListRequestsUseCase は閲覧者に見せる申請一覧を返す。
/// 管理者は全件、一般ユーザーは自分の申請のみ。
pub struct ListRequestsUseCase<T: RequestRecord> {
    repo: Arc<dyn RequestRepository<T>>,
}

impl<T: RequestRecord> ListRequestsUseCase<T> {
    pub fn new(repo: Arc<dyn RequestRepository<T>>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, viewer: &UserView) -> Result<Vec<T>, RequestError> {
        match viewer.role {
            UserRole::Admin => self.repo.find_all().await,
            UserRole::User => self.repo.find_by_user(viewer.id).await,
        }
        .map_err(internal)
    }
}

/// DecideRequestUseCase は申請を承認または却下する。
pub struct DecideRequestUseCase<T: RequestRecord> {
    repo: Arc<dyn RequestRepository<T>>,
}

impl<T: RequestRecord> DecideRequestUseCase<T> {
    pub fn new(repo: Arc<dyn RequestRepository<T>>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: Uuid, status: RequestStatus) -> Result<T, RequestError> {
        let request = self
            .repo
            .update_status(id, status)
            .await
            .map_err(internal)?
            .ok_or(RequestError::NotFound)?;
        tracing::info!(request_id = %id, status = %status, "request decided");
        Ok(request)
    }
}

/// DeleteRequestUseCase は申請を削除する。
pub struct DeleteRequestUseCase<T: RequestRecord> {
    repo: Arc<dyn RequestRepository<T>>,
}

impl<T: RequestRecord> DeleteRequestUseCase<T> {
    pub fn new(repo: Arc<dyn RequestRepository<T>>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: Uuid) -> Result<(), RequestError> {
        if !self.repo.delete(id).await.map_err(internal)? {
            return Err(RequestError::NotFound);
        }
        tracing::info!(request_id = %id, "request deleted");
        Ok(())
    }
}

/// RequestUseCases は申請種別ごとの一覧・審査・削除をまとめたもの。
pub struct RequestUseCases<T: RequestRecord> {
    pub list: Arc<ListRequestsUseCase<T>>,
    pub decide: Arc<DecideRequestUseCase<T>>,
    pub delete: Arc<DeleteRequestUseCase<T>>,
}

impl<T: RequestRecord> RequestUseCases<T> {
    pub fn new(repo: Arc<dyn RequestRepository<T>>) -> Self {
        Self {
            list: Arc::new(ListRequestsUseCase::new(repo.clone())),
            decide: Arc::new(DecideRequestUseCase::new(repo.clone())),
            delete: Arc::new(DeleteRequestUseCase::new(repo)),
        }
    }
}

impl<T: RequestRecord> Clone for RequestUseCases<T> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
            decide: self.decide.clone(),
            delete: self.delete.clone(),
        }
    }
}
