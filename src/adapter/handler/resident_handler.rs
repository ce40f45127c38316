use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use super::upload::{file_too_large, multipart_error};
use super::AppState;
use crate::adapter::handler::error::AppError;
use crate::domain::entity::profile_image::ProfileImage;
use crate::domain::service::resident_validator::ResidentInput;
use crate::usecase::create_resident::ResidentWriteError;
use crate::usecase::delete_resident::DeleteResidentError;
use crate::usecase::get_profile_image::GetProfileImageError;
use crate::usecase::get_resident::GetResidentError;

/// multipart で画像を送るフィールド名。
pub const PROFILE_IMAGE_FIELD: &str = "profileImage";

fn resident_not_found() -> AppError {
    AppError::not_found("BRGY_RESIDENT_NOT_FOUND", "Resident not found")
}

/// UUID として解釈できない ID は存在しない住民と同じ扱いにする。
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| resident_not_found())
}

fn invalid_body(message: &str) -> AppError {
    AppError::bad_request("BRGY_INVALID_BODY", message)
}

/// ResidentForm は住民の登録・更新リクエスト。
/// JSON ボディか、画像を添付できる multipart/form-data のどちらでも受け付ける。
#[derive(Debug)]
pub struct ResidentForm {
    pub input: ResidentInput,
    pub image: Option<ProfileImage>,
}

impl FromRequest<AppState> for ResidentForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));
        if !is_multipart {
            let Json(input) = Json::<ResidentInput>::from_request(req, state)
                .await
                .map_err(|e| invalid_body(&e.body_text()))?;
            return Ok(Self { input, image: None });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| invalid_body(&e.body_text()))?;
        read_multipart_form(multipart, state.max_image_bytes).await
    }
}

/// テキスト項目は JSON と同じキーで ResidentInput に詰め替える。
/// 画像フィールドがファイルでない場合（既存画像名の文字列など）は無視する。
async fn read_multipart_form(
    mut multipart: Multipart,
    max_image_bytes: usize,
) -> Result<ResidentForm, AppError> {
    let mut fields = serde_json::Map::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, max_image_bytes))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == PROFILE_IMAGE_FIELD {
            let Some(filename) = field.file_name().map(str::to_string) else {
                continue;
            };
            let bytes = field
                .bytes()
                .await
                .map_err(|e| multipart_error(&e, max_image_bytes))?;
            // ファイル未選択の空パート
            if filename.is_empty() && bytes.is_empty() {
                continue;
            }
            if bytes.len() > max_image_bytes {
                return Err(file_too_large(max_image_bytes));
            }
            let accepted = ProfileImage::from_upload(&filename, bytes.to_vec())
                .map_err(|e| AppError::bad_request("BRGY_UPLOAD_NOT_AN_IMAGE", &e.to_string()))?;
            image = Some(accepted);
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| multipart_error(&e, max_image_bytes))?;
        fields.insert(name.clone(), form_value(&name, text));
    }

    let input = serde_json::from_value(Value::Object(fields))
        .map_err(|e| invalid_body(&e.to_string()))?;
    Ok(ResidentForm { input, image })
}

/// フォームでは数値も文字列で届くため age だけ数値に直す。空欄は未入力扱い。
fn form_value(name: &str, text: String) -> Value {
    if name == "age" {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if let Ok(age) = trimmed.parse::<i64>() {
            return Value::from(age);
        }
    }
    Value::String(text)
}

fn write_error(err: ResidentWriteError, action: &str) -> AppError {
    match err {
        ResidentWriteError::Validation(errors) => AppError::validation(errors),
        ResidentWriteError::NotFound => resident_not_found(),
        ResidentWriteError::Internal(msg) => {
            tracing::error!(error = %msg, action, "resident write failed");
            AppError::internal("BRGY_RESIDENT_WRITE_FAILED", &format!("Error {action} resident"))
        }
    }
}

/// GET /api/residents
pub async fn list_residents(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let residents = state.list_residents_uc.execute().await?;
    Ok(Json(json!({ "success": true, "data": residents })))
}

/// GET /api/residents/stats
pub async fn resident_stats(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let stats = state.resident_stats_uc.execute().await?;
    Ok(Json(json!({ "success": true, "data": stats })))
}

/// GET /api/residents/{id}
pub async fn get_resident(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id)?;
    match state.get_resident_uc.execute(id).await {
        Ok(resident) => Ok(Json(json!({ "success": true, "data": resident }))),
        Err(GetResidentError::NotFound) => Err(resident_not_found()),
        Err(GetResidentError::Internal(msg)) => Err(anyhow::anyhow!(msg).into()),
    }
}

/// POST /api/residents
pub async fn create_resident(
    State(state): State<AppState>,
    form: ResidentForm,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let resident = state
        .create_resident_uc
        .execute(form.input, form.image)
        .await
        .map_err(|e| write_error(e, "creating"))?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Resident created successfully",
            "data": resident,
        })),
    ))
}

/// PUT /api/residents/{id}
pub async fn update_resident(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: ResidentForm,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id)?;
    let resident = state
        .update_resident_uc
        .execute(id, form.input, form.image)
        .await
        .map_err(|e| write_error(e, "updating"))?;
    Ok(Json(json!({
        "success": true,
        "message": "Resident updated successfully",
        "data": resident,
    })))
}

/// DELETE /api/residents/{id}
pub async fn delete_resident(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id)?;
    match state.delete_resident_uc.execute(id).await {
        Ok(()) => Ok(Json(json!({
            "success": true,
            "message": "Resident deleted successfully",
        }))),
        Err(DeleteResidentError::NotFound) => Err(resident_not_found()),
        Err(DeleteResidentError::Internal(msg)) => Err(anyhow::anyhow!(msg).into()),
    }
}

/// GET /api/residents/{id}/profile-image
/// 画像は `<img>` から直接参照されるため認証不要。
pub async fn get_profile_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let not_found =
        || AppError::not_found("BRGY_PROFILE_IMAGE_NOT_FOUND", "Profile image not found");
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    match state.get_profile_image_uc.execute(id).await {
        Ok(file) => Ok(([(CONTENT_TYPE, file.content_type)], file.bytes).into_response()),
        Err(GetProfileImageError::NotFound) => Err(not_found()),
        Err(GetProfileImageError::FileMissing) => Err(AppError::not_found(
            "BRGY_PROFILE_IMAGE_FILE_MISSING",
            "Profile image file not found",
        )),
        Err(GetProfileImageError::Internal(msg)) => Err(anyhow::anyhow!(msg).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_value_age() {
        assert_eq!(form_value("age", " 34 ".to_string()), json!(34));
        assert_eq!(form_value("age", "".to_string()), Value::Null);
        assert_eq!(form_value("age", "thirty".to_string()), json!("thirty"));
        assert_eq!(form_value("purok", "7".to_string()), json!("7"));
    }
}
