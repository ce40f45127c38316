use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::upload::{file_too_large, multipart_error};
use super::AppState;
use crate::adapter::handler::error::AppError;
use crate::domain::entity::import::ImportSummary;
use crate::usecase::export_residents::ExportResidentsError;
use crate::usecase::import_residents::ImportResidentsError;

/// アップロードを受け付けるフォームフィールド名。
pub const UPLOAD_FIELD: &str = "file";

const ACCEPTED_CONTENT_TYPES: &[&str] = &["text/csv", "application/vnd.ms-excel"];

const EXPORT_FILENAME: &str = "residents_export.csv";

/// Content-Type のパラメータ (`; charset=...` など) を除いた部分で判定する。
fn is_csv_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    ACCEPTED_CONTENT_TYPES
        .iter()
        .any(|accepted| essence.eq_ignore_ascii_case(accepted))
}

fn summary_body(success: bool, message: &str, summary: &ImportSummary) -> serde_json::Value {
    let mut body = json!({
        "success": success,
        "message": message,
        "totalProcessed": summary.total_processed,
        "successCount": summary.success_count,
        "errorCount": summary.error_count,
    });
    if summary.error_count > 0 {
        body["errors"] = json!(summary.errors);
    }
    body
}

/// POST /api/residents/import-csv
pub async fn import_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "request is not multipart");
        AppError::bad_request("BRGY_IMPORT_NO_FILE", "No CSV file uploaded")
    })?;

    let max_bytes = state.max_upload_bytes;
    let bytes = loop {
        let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(&e, max_bytes))?
        else {
            return Err(AppError::bad_request(
                "BRGY_IMPORT_NO_FILE",
                "No CSV file uploaded",
            ));
        };
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        if !is_csv_content_type(field.content_type().unwrap_or_default()) {
            return Err(AppError::bad_request(
                "BRGY_IMPORT_UNSUPPORTED_MEDIA_TYPE",
                "Invalid file type. Only CSV files are allowed.",
            ));
        }
        break field
            .bytes()
            .await
            .map_err(|e| multipart_error(&e, max_bytes))?;
    };

    if bytes.len() > max_bytes {
        return Err(file_too_large(max_bytes));
    }

    let upload = state.upload_store.store(bytes).await?;
    match state.import_residents_uc.execute(upload).await {
        Ok(summary) => {
            state.metrics.record_import(&summary);
            Ok(Json(summary_body(true, &summary.message(), &summary)))
        }
        Err(ImportResidentsError::Stream { cause, partial }) => {
            state.metrics.record_import_failure(&partial);
            let message = format!("Error importing CSV file: {cause}");
            Err(AppError::internal("BRGY_IMPORT_FAILED", &message)
                .with_details(summary_body(false, &message, &partial)))
        }
    }
}

/// GET /api/residents/export-csv
pub async fn export_csv(State(state): State<AppState>) -> Result<Response, AppError> {
    match state.export_residents_uc.execute().await {
        Ok(csv) => Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{EXPORT_FILENAME}\""),
                ),
            ],
            csv,
        )
            .into_response()),
        Err(ExportResidentsError::Empty) => Err(AppError::not_found(
            "BRGY_EXPORT_EMPTY",
            "No residents found to export",
        )),
        Err(ExportResidentsError::Internal(msg)) => {
            tracing::error!(error = %msg, "resident csv export failed");
            Err(AppError::internal(
                "BRGY_EXPORT_FAILED",
                "Error exporting residents to CSV",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_content_types() {
        assert!(is_csv_content_type("text/csv"));
        assert!(is_csv_content_type("text/csv; charset=utf-8"));
        assert!(is_csv_content_type("application/vnd.ms-excel"));
        assert!(!is_csv_content_type("text/plain"));
        assert!(!is_csv_content_type(""));
    }

    #[test]
    fn test_summary_body_omits_errors_when_clean() {
        let summary = ImportSummary {
            total_processed: 2,
            success_count: 2,
            error_count: 0,
            errors: vec![],
        };
        let body = summary_body(true, &summary.message(), &summary);
        assert_eq!(body["totalProcessed"], 2);
        assert!(body.get("errors").is_none());
    }
}
