use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entity::profile_image::ProfileImage;
use crate::domain::entity::resident::Resident;
use crate::domain::repository::{ProfileImageStorage, ResidentRepository};
use crate::domain::service::resident_validator::{ResidentInput, ResidentValidator};
use crate::usecase::create_resident::{discard_image, ResidentWriteError};

/// UpdateResidentUseCase は既存住民の内容を置き換えるユースケース。
/// ID と作成日時は維持され、更新日時のみ進む。
/// 新しい画像が添付された場合のみプロフィール画像を差し替え、旧画像は更新成功後に削除する。
pub struct UpdateResidentUseCase {
    resident_repo: Arc<dyn ResidentRepository>,
    image_storage: Arc<dyn ProfileImageStorage>,
}

impl UpdateResidentUseCase {
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
        id: Uuid,
        input: ResidentInput,
        image: Option<ProfileImage>,
    ) -> Result<Resident, ResidentWriteError> {
        let record = ResidentValidator::validate(input).map_err(ResidentWriteError::Validation)?;

        let mut resident = self
            .resident_repo
            .find_by_id(id)
            .await
            .map_err(|e| ResidentWriteError::Internal(e.to_string()))?
            .ok_or(ResidentWriteError::NotFound)?;
        resident.apply(record);

        let previous_image = match image {
            Some(image) => {
                let saved = self
                    .image_storage
                    .save(image)
                    .await
                    .map_err(|e| ResidentWriteError::Internal(e.to_string()))?;
                Some(std::mem::replace(&mut resident.profile_image, saved))
            }
            None => None,
        };

        let result = self.resident_repo.update(&resident).await;
        if !matches!(result, Ok(true)) && previous_image.is_some() {
            discard_image(self.image_storage.as_ref(), &resident.profile_image).await;
        }
        match result {
            Ok(true) => {}
            Ok(false) => return Err(ResidentWriteError::NotFound),
            Err(e) => return Err(ResidentWriteError::Internal(e.to_string())),
        }

        if let Some(previous) = previous_image {
            discard_image(self.image_storage.as_ref(), &previous).await;
        }
        Ok(resident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::resident::{CivilStatus, Gender, NewResident, VotersStatus};
    use crate::domain::repository::profile_image_storage::MockProfileImageStorage;
    use crate::domain::repository::resident_repository::MockResidentRepository;

    fn no_images() -> Arc<MockProfileImageStorage> {
        let mut storage = MockProfileImageStorage::new();
        storage.expect_save().never();
        storage.expect_remove().never();
        Arc::new(storage)
    }

    fn jpeg() -> ProfileImage {
        ProfileImage::from_upload("new.jpeg", b"\xff\xd8".to_vec()).unwrap()
    }

    fn existing() -> Resident {
        Resident::new(NewResident {
            first_name: "Ana".to_string(),
            middle_name: String::new(),
            last_name: "Reyes".to_string(),
            alias: String::new(),
            birthplace: "Davao".to_string(),
            birthdate: None,
            age: 39,
            civil_status: CivilStatus::Single,
            gender: Gender::Female,
            purok: "Purok 3".to_string(),
            voters_status: VotersStatus::NotRegistered,
            identified_as: String::new(),
            email: String::new(),
            contact_number: String::new(),
            occupation: String::new(),
            citizenship: "Filipino".to_string(),
            household_no: String::new(),
            address: "45 Mabini St".to_string(),
            precinct_no: String::new(),
        })
    }

    fn input() -> ResidentInput {
        ResidentInput {
            first_name: "Ana".to_string(),
            last_name: "Reyes-Cruz".to_string(),
            birthplace: "Davao".to_string(),
            birthdate: "1985-11-02".to_string(),
            age: Some(39),
            civil_status: "Married".to_string(),
            gender: "Female".to_string(),
            purok: "Purok 3".to_string(),
            voters_status: "Registered".to_string(),
            address: "45 Mabini St".to_string(),
            ..ResidentInput::default()
        }
    }

    #[tokio::test]
    async fn test_update_keeps_identity() {
        let current = existing();
        let id = current.id;
        let created_at = current.created_at;

        let mut mock = MockResidentRepository::new();
        mock.expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        mock.expect_update()
            .withf(move |r: &Resident| r.id == id && r.last_name == "Reyes-Cruz")
            .returning(|_| Ok(true));

        let uc = UpdateResidentUseCase::new(Arc::new(mock), no_images());
        let updated = uc.execute(id, input(), None).await.unwrap();
        assert_eq!(updated.created_at, created_at);
        assert_eq!(updated.civil_status, CivilStatus::Married);
        assert!(updated.updated_at >= created_at);
    }

    #[tokio::test]
    async fn test_update_without_image_keeps_current_image() {
        let mut current = existing();
        current.profile_image = "profileImage-old.png".to_string();
        let id = current.id;

        let mut mock = MockResidentRepository::new();
        mock.expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        mock.expect_update()
            .withf(|r: &Resident| r.profile_image == "profileImage-old.png")
            .returning(|_| Ok(true));

        let uc = UpdateResidentUseCase::new(Arc::new(mock), no_images());
        let updated = uc.execute(id, input(), None).await.unwrap();
        assert_eq!(updated.profile_image, "profileImage-old.png");
    }

    #[tokio::test]
    async fn test_update_replaces_image_and_removes_old_one() {
        let mut current = existing();
        current.profile_image = "profileImage-old.png".to_string();
        let id = current.id;

        let mut mock = MockResidentRepository::new();
        mock.expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        mock.expect_update()
            .withf(|r: &Resident| r.profile_image == "profileImage-new.jpeg")
            .returning(|_| Ok(true));
        let mut storage = MockProfileImageStorage::new();
        storage
            .expect_save()
            .times(1)
            .returning(|_| Ok("profileImage-new.jpeg".to_string()));
        storage
            .expect_remove()
            .withf(|name: &str| name == "profileImage-old.png")
            .times(1)
            .returning(|_| Ok(()));

        let uc = UpdateResidentUseCase::new(Arc::new(mock), Arc::new(storage));
        let updated = uc.execute(id, input(), Some(jpeg())).await.unwrap();
        assert_eq!(updated.profile_image, "profileImage-new.jpeg");
    }

    #[tokio::test]
    async fn test_update_failure_removes_new_image() {
        let current = existing();
        let id = current.id;

        let mut mock = MockResidentRepository::new();
        mock.expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        mock.expect_update()
            .returning(|_| Err(anyhow::anyhow!("deadlock detected")));
        let mut storage = MockProfileImageStorage::new();
        storage
            .expect_save()
            .returning(|_| Ok("profileImage-new.jpeg".to_string()));
        storage
            .expect_remove()
            .withf(|name: &str| name == "profileImage-new.jpeg")
            .times(1)
            .returning(|_| Ok(()));

        let uc = UpdateResidentUseCase::new(Arc::new(mock), Arc::new(storage));
        assert!(matches!(
            uc.execute(id, input(), Some(jpeg())).await,
            Err(ResidentWriteError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_resident() {
        let mut mock = MockResidentRepository::new();
        mock.expect_find_by_id().returning(|_| Ok(None));
        mock.expect_update().never();

        let uc = UpdateResidentUseCase::new(Arc::new(mock), no_images());
        assert!(matches!(
            uc.execute(Uuid::new_v4(), input(), Some(jpeg())).await,
            Err(ResidentWriteError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_validates_before_lookup() {
        let mut mock = MockResidentRepository::new();
        mock.expect_find_by_id().never();

        let uc = UpdateResidentUseCase::new(Arc::new(mock), no_images());
        let bad = ResidentInput {
            gender: "Unknown".to_string(),
            ..input()
        };
        assert!(matches!(
            uc.execute(Uuid::new_v4(), bad, None).await,
            Err(ResidentWriteError::Validation(_))
        ));
    }
}
