use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;

use crate::adapter::handler::error::AppError;

/// multipart の区切りやヘッダー分としてファイルサイズ上限に上乗せするバイト数。
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// アップロードがサイズ上限を超えたときのエラー。
pub fn file_too_large(max_bytes: usize) -> AppError {
    AppError::bad_request(
        "BRGY_UPLOAD_TOO_LARGE",
        &format!(
            "File is too large. Maximum size is {}MB",
            max_bytes / (1024 * 1024)
        ),
    )
}

/// multipart の読み取りエラーを変換する。ボディ上限超過はサイズ超過として扱う。
pub fn multipart_error(err: &MultipartError, max_bytes: usize) -> AppError {
    tracing::warn!(error = %err.body_text(), "failed to read multipart upload");
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return file_too_large(max_bytes);
    }
    AppError::bad_request("BRGY_UPLOAD_FAILED", "Error uploading file")
}
