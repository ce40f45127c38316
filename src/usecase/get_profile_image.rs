use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entity::profile_image::content_type_for;
use crate::domain::repository::{ProfileImageStorage, ResidentRepository};

/// GetProfileImageError はプロフィール画像取得に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum GetProfileImageError {
    /// 住民が存在しないか、画像が未登録。
    #[error("Profile image not found")]
    NotFound,

    /// レコードには画像名があるがファイルが無い。
    #[error("Profile image file not found")]
    FileMissing,

    #[error("internal error: {0}")]
    Internal(String),
}

/// ProfileImageFile は配信する画像の中身。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImageFile {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// GetProfileImageUseCase は住民のプロフィール画像を読み出す。
pub struct GetProfileImageUseCase {
    resident_repo: Arc<dyn ResidentRepository>,
    image_storage: Arc<dyn ProfileImageStorage>,
}

impl GetProfileImageUseCase {
    pub fn new(
        resident_repo: Arc<dyn ResidentRepository>,
        image_storage: Arc<dyn ProfileImageStorage>,
    ) -> Self {
        Self {
            resident_repo,
            image_storage,
        }
    }

    pub async fn execute(&self, id: Uuid) -> Result<ProfileImageFile, GetProfileImageError> {
        let name = self
            .resident_repo
            .find_by_id(id)
            .await
            .map_err(|e| GetProfileImageError::Internal(e.to_string()))?
            .map(|resident| resident.profile_image)
            .filter(|name| !name.is_empty())
            .ok_or(GetProfileImageError::NotFound)?;

        let bytes = self
            .image_storage
            .load(&name)
            .await
            .map_err(|e| GetProfileImageError::Internal(e.to_string()))?
            .ok_or(GetProfileImageError::FileMissing)?;
        Ok(ProfileImageFile {
            content_type: content_type_for(&name),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::resident::{
        CivilStatus, Gender, NewResident, Resident, VotersStatus,
    };
    use crate::domain::repository::profile_image_storage::MockProfileImageStorage;
    use crate::domain::repository::resident_repository::MockResidentRepository;

    fn resident_with_image(profile_image: &str) -> Resident {
        let mut resident = Resident::new(NewResident {
            first_name: "Rosa".to_string(),
            middle_name: String::new(),
            last_name: "Santos".to_string(),
            alias: String::new(),
            birthplace: "Iloilo".to_string(),
            birthdate: None,
            age: 27,
            civil_status: CivilStatus::Single,
            gender: Gender::Female,
            purok: "Purok 2".to_string(),
            voters_status: VotersStatus::Registered,
            identified_as: String::new(),
            email: String::new(),
            contact_number: String::new(),
            occupation: String::new(),
            citizenship: "Filipino".to_string(),
            household_no: String::new(),
            address: "3 Burgos St".to_string(),
            precinct_no: String::new(),
        });
        resident.profile_image = profile_image.to_string();
        resident
    }

    fn repo_returning(resident: Option<Resident>) -> Arc<MockResidentRepository> {
        let mut mock = MockResidentRepository::new();
        mock.expect_find_by_id()
            .returning(move |_| Ok(resident.clone()));
        Arc::new(mock)
    }

    #[tokio::test]
    async fn test_returns_image_with_content_type() {
        let mut storage = MockProfileImageStorage::new();
        storage
            .expect_load()
            .withf(|name: &str| name == "profileImage-rosa.png")
            .returning(|_| Ok(Some(b"\x89PNG".to_vec())));

        let uc = GetProfileImageUseCase::new(
            repo_returning(Some(resident_with_image("profileImage-rosa.png"))),
            Arc::new(storage),
        );
        let file = uc.execute(Uuid::new_v4()).await.unwrap();
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.bytes, b"\x89PNG".to_vec());
    }

    #[tokio::test]
    async fn test_resident_without_image() {
        let mut storage = MockProfileImageStorage::new();
        storage.expect_load().never();

        let uc = GetProfileImageUseCase::new(
            repo_returning(Some(resident_with_image(""))),
            Arc::new(storage),
        );
        assert!(matches!(
            uc.execute(Uuid::new_v4()).await,
            Err(GetProfileImageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_missing_resident() {
        let uc = GetProfileImageUseCase::new(
            repo_returning(None),
            Arc::new(MockProfileImageStorage::new()),
        );
        assert!(matches!(
            uc.execute(Uuid::new_v4()).await,
            Err(GetProfileImageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_image_file_missing() {
        let mut storage = MockProfileImageStorage::new();
        storage.expect_load().returning(|_| Ok(None));

        let uc = GetProfileImageUseCase::new(
            repo_returning(Some(resident_with_image("profileImage-gone.jpg"))),
            Arc::new(storage),
        );
        assert!(matches!(
            uc.execute(Uuid::new_v4()).await,
            Err(GetProfileImageError::FileMissing)
        ));
    }
}
