use std::sync::Arc;

use crate::domain::repository::ResidentRepository;
use crate::infrastructure::resident_csv::write_residents;

/// ExportResidentsError は住民 CSV 出力に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum ExportResidentsError {
    #[error("No residents found to export")]
    Empty,

    #[error("internal error: {0}")]
    Internal(String),
}

/// ExportResidentsUseCase は全住民を取り込みと同じ列契約の CSV として出力する。
pub struct ExportResidentsUseCase {
    resident_repo: Arc<dyn ResidentRepository>,
}

impl ExportResidentsUseCase {
    pub fn new(resident_repo: Arc<dyn ResidentRepository>) -> Self {
        Self { resident_repo }
    }

    pub async fn execute(&self) -> Result<Vec<u8>, ExportResidentsError> {
        let residents = self
            .resident_repo
            .find_all()
            .await
            .map_err(|e| ExportResidentsError::Internal(e.to_string()))?;
        if residents.is_empty() {
            return Err(ExportResidentsError::Empty);
        }
        write_residents(&residents).map_err(|e| ExportResidentsError::Internal(e.to_string()))
    }
}
