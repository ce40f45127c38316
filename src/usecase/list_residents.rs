use std::sync::Arc;

use crate::domain::entity::resident::Resident;
use crate::domain::repository::ResidentRepository;

/// ListResidentsUseCase は全住民を登録日時の新しい順に返す。
pub struct ListResidentsUseCase {
    resident_repo: Arc<dyn ResidentRepository>,
}

impl ListResidentsUseCase {
    pub fn new(resident_repo: Arc<dyn ResidentRepository>) -> Self {
        Self { resident_repo }
    }

    pub async fn execute(&self) -> anyhow::Result<Vec<Resident>> {
        self.resident_repo.find_all().await
    }
}
