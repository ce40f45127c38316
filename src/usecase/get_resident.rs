use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entity::resident::Resident;
use crate::domain::repository::ResidentRepository;

/// GetResidentError は住民取得に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum GetResidentError {
    #[error("Resident not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

/// GetResidentUseCase は ID で住民を 1 件取得する。
pub struct GetResidentUseCase {
    resident_repo: Arc<dyn ResidentRepository>,
}

impl GetResidentUseCase {
    pub fn new(resident_repo: Arc<dyn ResidentRepository>) -> Self {
        Self { resident_repo }
    }

    pub async fn execute(&self, id: Uuid) -> Result<Resident, GetResidentError> {
        self.resident_repo
            .find_by_id(id)
            .await
            .map_err(|e| GetResidentError::Internal(e.to_string()))?
            .ok_or(GetResidentError::NotFound)
    }
}
