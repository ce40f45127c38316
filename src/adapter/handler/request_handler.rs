use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use super::AppState;
use crate::adapter::handler::error::AppError;
use crate::domain::entity::request::{
    BlotterRequest, ClearanceRequest, RequestRecord, RequestStatus,
};
use crate::domain::entity::user::UserView;
use crate::domain::service::request_validator::{BlotterRequestInput, ClearanceRequestInput};
use crate::usecase::manage_requests::{RequestError, RequestUseCases};

/// RequestKind は申請種別から AppState 上のユースケースを引く。
pub trait RequestKind: RequestRecord {
    fn use_cases(state: &AppState) -> &RequestUseCases<Self>;
}

impl RequestKind for ClearanceRequest {
    fn use_cases(state: &AppState) -> &RequestUseCases<Self> {
        &state.clearance_requests
    }
}

impl RequestKind for BlotterRequest {
    fn use_cases(state: &AppState) -> &RequestUseCases<Self> {
        &state.blotter_requests
    }
}

fn request_not_found() -> AppError {
    AppError::not_found("BRGY_REQUEST_NOT_FOUND", "Request not found")
}

fn request_error(err: RequestError) -> AppError {
    match err {
        RequestError::Validation(errors) => AppError::validation(errors),
        RequestError::NotFound => request_not_found(),
        RequestError::Internal(msg) => anyhow::anyhow!(msg).into(),
    }
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| request_not_found())
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(input)| input)
        .map_err(|e| AppError::bad_request("BRGY_INVALID_BODY", &e.body_text()))
}

fn created<T: serde::Serialize>(request: T) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": request })),
    )
}

/// POST /api/clearance-requests
pub async fn submit_clearance_request(
    State(state): State<AppState>,
    Extension(user): Extension<UserView>,
    body: Result<Json<ClearanceRequestInput>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let input = json_body(body)?;
    let request = state
        .submit_clearance_request_uc
        .execute(user.id, input)
        .await
        .map_err(request_error)?;
    Ok(created(request))
}

/// POST /api/blotter-requests
pub async fn submit_blotter_request(
    State(state): State<AppState>,
    Extension(user): Extension<UserView>,
    body: Result<Json<BlotterRequestInput>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let input = json_body(body)?;
    let request = state
        .submit_blotter_request_uc
        .execute(user.id, input)
        .await
        .map_err(request_error)?;
    Ok(created(request))
}

/// GET /api/{kind}-requests
pub async fn list_requests<T: RequestKind>(
    State(state): State<AppState>,
    Extension(user): Extension<UserView>,
) -> Result<Json<serde_json::Value>, AppError> {
    let requests = T::use_cases(&state)
        .list
        .execute(&user)
        .await
        .map_err(request_error)?;
    Ok(Json(json!({ "success": true, "data": requests })))
}

async fn decide<T: RequestKind>(
    state: &AppState,
    raw_id: &str,
    status: RequestStatus,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(raw_id)?;
    let request = T::use_cases(state)
        .decide
        .execute(id, status)
        .await
        .map_err(request_error)?;
    Ok(Json(json!({ "success": true, "data": request })))
}

/// PATCH /api/{kind}-requests/{id}/approve
pub async fn approve_request<T: RequestKind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    decide::<T>(&state, &id, RequestStatus::Approved).await
}

/// PATCH /api/{kind}-requests/{id}/deny
pub async fn deny_request<T: RequestKind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    decide::<T>(&state, &id, RequestStatus::Denied).await
}

/// DELETE /api/{kind}-requests/{id}
pub async fn delete_request<T: RequestKind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id)?;
    T::use_cases(&state)
        .delete
        .execute(id)
        .await
        .map_err(request_error)?;
    Ok(Json(json!({ "success": true, "message": "Request deleted" })))
}
