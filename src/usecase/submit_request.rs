use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entity::request::{BlotterRequest, ClearanceRequest};
use crate::domain::repository::RequestRepository;
use crate::domain::service::request_validator::{BlotterRequestInput, ClearanceRequestInput};
use crate::usecase::manage_requests::RequestError;

/// SubmitClearanceRequestUseCase はログイン中のユーザーとしてクリアランスを申請する。
pub struct SubmitClearanceRequestUseCase {
    repo: Arc<dyn RequestRepository<ClearanceRequest>>,
}

impl SubmitClearanceRequestUseCase {
    pub fn new(repo: Arc<dyn RequestRepository<ClearanceRequest>>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        user_id: Uuid,
        input: ClearanceRequestInput,
    ) -> Result<ClearanceRequest, RequestError> {
        let fields = input.validate_into().map_err(RequestError::Validation)?;
        let request = ClearanceRequest::new(user_id, fields);
        self.repo
            .create(&request)
            .await
            .map_err(|e| RequestError::Internal(e.to_string()))?;
        tracing::info!(request_id = %request.id, user_id = %user_id, "clearance request submitted");
        Ok(request)
    }
}

/// SubmitBlotterRequestUseCase はログイン中のユーザーとしてブロッター登録を申請する。
pub struct SubmitBlotterRequestUseCase {
    repo: Arc<dyn RequestRepository<BlotterRequest>>,
}

impl SubmitBlotterRequestUseCase {
    pub fn new(repo: Arc<dyn RequestRepository<BlotterRequest>>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        user_id: Uuid,
        input: BlotterRequestInput,
    ) -> Result<BlotterRequest, RequestError> {
        let fields = input.validate_into().map_err(RequestError::Validation)?;
        let request = BlotterRequest::new(user_id, fields);
        self.repo
            .create(&request)
            .await
            .map_err(|e| RequestError::Internal(e.to_string()))?;
        tracing::info!(request_id = %request.id, user_id = %user_id, "blotter request submitted");
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::request::RequestStatus;
    use crate::domain::repository::request_repository::MockRequestRepository;

    #[tokio::test]
    async fn test_submit_clearance_request() {
        let user_id = Uuid::new_v4();
        let mut mock = MockRequestRepository::<ClearanceRequest>::new();
        mock.expect_create()
            .withf(move |r: &ClearanceRequest| {
                r.user_id == user_id && r.status == RequestStatus::Pending
            })
            .times(1)
            .returning(|_| Ok(()));

        let uc = SubmitClearanceRequestUseCase::new(Arc::new(mock));
        let request = uc
            .execute(
                user_id,
                ClearanceRequestInput {
                    fullname: "Juan Dela Cruz".to_string(),
                    address: "12 Rizal St".to_string(),
                    purpose: "Employment".to_string(),
                    message: Some("Needed by Friday".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(request.message.as_deref(), Some("Needed by Friday"));
    }

    #[tokio::test]
    async fn test_invalid_clearance_request_not_stored() {
        let mut mock = MockRequestRepository::<ClearanceRequest>::new();
        mock.expect_create().never();

        let uc = SubmitClearanceRequestUseCase::new(Arc::new(mock));
        let result = uc
            .execute(Uuid::new_v4(), ClearanceRequestInput::default())
            .await;
        match result {
            Err(RequestError::Validation(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_blotter_request() {
        let mut mock = MockRequestRepository::<BlotterRequest>::new();
        mock.expect_create()
            .withf(|r: &BlotterRequest| r.date_time_reported == r.date_recorded)
            .times(1)
            .returning(|_| Ok(()));

        let uc = SubmitBlotterRequestUseCase::new(Arc::new(mock));
        let request = uc
            .execute(
                Uuid::new_v4(),
                BlotterRequestInput {
                    complainant: "Maria".to_string(),
                    respondent: "Pedro".to_string(),
                    complaint: "Noise at night".to_string(),
                    incident_type: "Disturbance".to_string(),
                    date_time_incident: "2024-03-09T21:30".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(request.incident_type, "Disturbance");
        assert_eq!(request.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_blotter_store_error() {
        let mut mock = MockRequestRepository::<BlotterRequest>::new();
        mock.expect_create()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let uc = SubmitBlotterRequestUseCase::new(Arc::new(mock));
        let result = uc
            .execute(
                Uuid::new_v4(),
                BlotterRequestInput {
                    complainant: "Maria".to_string(),
                    respondent: "Pedro".to_string(),
                    complaint: "Noise at night".to_string(),
                    incident_type: "Disturbance".to_string(),
                    date_time_incident: "2024-03-09T21:30:00Z".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(RequestError::Internal(_))));
    }
}
