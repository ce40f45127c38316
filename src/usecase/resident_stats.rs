use std::sync::Arc;

use crate::domain::entity::resident::ResidentStats;
use crate::domain::repository::ResidentRepository;

/// ResidentStatsUseCase は住民台帳の集計 (性別・有権者登録・プロク別) を返す。
pub struct ResidentStatsUseCase {
    resident_repo: Arc<dyn ResidentRepository>,
}

impl ResidentStatsUseCase {
    pub fn new(resident_repo: Arc<dyn ResidentRepository>) -> Self {
        Self { resident_repo }
    }

    pub async fn execute(&self) -> anyhow::Result<ResidentStats> {
        self.resident_repo.stats().await
    }
}
