use std::sync::Arc;

use crate::domain::entity::profile_image::ProfileImage;
use crate::domain::entity::resident::Resident;
use crate::domain::repository::{ProfileImageStorage, ResidentRepository};
use crate::domain::service::resident_validator::{FieldError, ResidentInput, ResidentValidator};

/// ResidentWriteError は住民の単票登録・更新に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum ResidentWriteError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Resident not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

/// 保存済み画像を削除する。失敗は警告ログのみ。
pub(crate) async fn discard_image(storage: &dyn ProfileImageStorage, name: &str) {
    if name.is_empty() {
        return;
    }
    if let Err(e) = storage.remove(name).await {
        tracing::warn!(profile_image = %name, error = %e, "failed to remove profile image");
    }
}

/// CreateResidentUseCase は住民を 1 件登録するユースケース。
/// 画像が添付されていれば先に保存し、登録に失敗したら削除する。
pub struct CreateResidentUseCase {
    resident_repo: Arc<dyn ResidentRepository>,
    image_storage: Arc<dyn ProfileImageStorage>,
}

impl CreateResidentUseCase {
    pub fn new(
        resident_repo: Arc<dyn ResidentRepository>,
        image_storage: Arc<dyn ProfileImageStorage>,
    ) -> Self {
        Self {
            resident_repo,
            image_storage,
        }
    }

    pub async fn execute(
        &self,
        input: ResidentInput,
        image: Option<ProfileImage>,
    ) -> Result<Resident, ResidentWriteError> {
        let record = ResidentValidator::validate(input).map_err(ResidentWriteError::Validation)?;
        let mut resident = Resident::new(record);
        if let Some(image) = image {
            resident.profile_image = self
                .image_storage
                .save(image)
                .await
                .map_err(|e| ResidentWriteError::Internal(e.to_string()))?;
        }

        if let Err(e) = self.resident_repo.create(&resident).await {
            discard_image(self.image_storage.as_ref(), &resident.profile_image).await;
            return Err(ResidentWriteError::Internal(e.to_string()));
        }
        tracing::info!(resident_id = %resident.id, "resident created");
        Ok(resident)
    }
}
