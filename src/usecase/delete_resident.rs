use std::sync::Arc;

use uuid::Uuid;

use crate::domain::repository::{ProfileImageStorage, ResidentRepository};
use crate::usecase::create_resident::discard_image;

/// DeleteResidentError は住民削除に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum DeleteResidentError {
    #[error("Resident not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

/// DeleteResidentUseCase は住民を 1 件削除し、プロフィール画像も併せて削除する。
pub struct DeleteResidentUseCase {
    resident_repo: Arc<dyn ResidentRepository>,
    image_storage: Arc<dyn ProfileImageStorage>,
}

impl DeleteResidentUseCase {
    pub fn new(
        resident_repo: Arc<dyn ResidentRepository>,
        image_storage: Arc<dyn ProfileImageStorage>,
    ) -> Self {
        Self {
            resident_repo,
            image_storage,
        }
    }

    pub async fn execute(&self, id: Uuid) -> Result<(), DeleteResidentError> {
        let resident = self
            .resident_repo
            .find_by_id(id)
            .await
            .map_err(|e| DeleteResidentError::Internal(e.to_string()))?
            .ok_or(DeleteResidentError::NotFound)?;

        let deleted = self
            .resident_repo
            .delete(id)
            .await
            .map_err(|e| DeleteResidentError::Internal(e.to_string()))?;
        if !deleted {
            return Err(DeleteResidentError::NotFound);
        }
        discard_image(self.image_storage.as_ref(), &resident.profile_image).await;
        tracing::info!(resident_id = %id, "resident deleted");
        Ok(())
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

    fn resident(profile_image: &str) -> Resident {
        let mut resident = Resident::new(NewResident {
            first_name: "Lito".to_string(),
            middle_name: String::new(),
            last_name: "Lapid".to_string(),
            alias: String::new(),
            birthplace: "Pampanga".to_string(),
            birthdate: None,
            age: 60,
            civil_status: CivilStatus::Married,
            gender: Gender::Male,
            purok: "Purok 4".to_string(),
            voters_status: VotersStatus::Registered,
            identified_as: String::new(),
            email: String::new(),
            contact_number: String::new(),
            occupation: String::new(),
            citizenship: "Filipino".to_string(),
            household_no: String::new(),
            address: "8 Luna St".to_string(),
            precinct_no: String::new(),
        });
        resident.profile_image = profile_image.to_string();
        resident
    }

    #[tokio::test]
    async fn test_delete_success_removes_image() {
        let target = resident("profileImage-lito.png");
        let id = target.id;
        let mut mock = MockResidentRepository::new();
        mock.expect_find_by_id()
            .returning(move |_| Ok(Some(target.clone())));
        mock.expect_delete()
            .withf(move |target| *target == id)
            .returning(|_| Ok(true));
        let mut storage = MockProfileImageStorage::new();
        storage
            .expect_remove()
            .withf(|name: &str| name == "profileImage-lito.png")
            .times(1)
            .returning(|_| Ok(()));

        let uc = DeleteResidentUseCase::new(Arc::new(mock), Arc::new(storage));
        assert!(uc.execute(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_without_image() {
        let target = resident("");
        let id = target.id;
        let mut mock = MockResidentRepository::new();
        mock.expect_find_by_id()
            .returning(move |_| Ok(Some(target.clone())));
        mock.expect_delete().returning(|_| Ok(true));
        let mut storage = MockProfileImageStorage::new();
        storage.expect_remove().never();

        let uc = DeleteResidentUseCase::new(Arc::new(mock), Arc::new(storage));
        assert!(uc.execute(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_image_removal_failure_does_not_fail_delete() {
        let target = resident("profileImage-lito.png");
        let id = target.id;
        let mut mock = MockResidentRepository::new();
        mock.expect_find_by_id()
            .returning(move |_| Ok(Some(target.clone())));
        mock.expect_delete().returning(|_| Ok(true));
        let mut storage = MockProfileImageStorage::new();
        storage
            .expect_remove()
            .returning(|_| Err(anyhow::anyhow!("permission denied")));

        let uc = DeleteResidentUseCase::new(Arc::new(mock), Arc::new(storage));
        assert!(uc.execute(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let mut mock = MockResidentRepository::new();
        mock.expect_find_by_id().returning(|_| Ok(None));
        mock.expect_delete().never();

        let storage = MockProfileImageStorage::new();
        let uc = DeleteResidentUseCase::new(Arc::new(mock), Arc::new(storage));
        assert!(matches!(
            uc.execute(Uuid::new_v4()).await,
            Err(DeleteResidentError::NotFound)
        ));
    }
}
