//! テスト用の AppState 組み立てとリクエスト生成ヘルパー。
//! 統合テスト（tests/*.rs）から利用する。

use std::path::Path;
use std::sync::Arc;

use secrecy::SecretString;

use crate::adapter::handler::{AppDeps, AppState};
use crate::adapter::repository::{
    InMemoryRequestRepository, InMemoryResidentRepository, InMemoryUserRepository,
};
use crate::domain::entity::request::{BlotterRequest, ClearanceRequest};
use crate::domain::entity::user::{User, UserRole};
use crate::domain::repository::UserRepository;
use crate::infrastructure::metrics::Metrics;
use crate::infrastructure::{JwtTokenService, TokenService, UploadStore};

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-barangay-records-0001";
pub const TEST_ADMIN_CODE: &str = "test-admin-code";
pub const TEST_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const MULTIPART_BOUNDARY: &str = "----barangay-test-boundary";
/// プロフィール画像は upload_dir 配下のこのディレクトリに置く。
pub const TEST_PROFILE_DIR: &str = "profiles";

pub fn test_token_service() -> JwtTokenService {
    JwtTokenService::new(SecretString::new(TEST_JWT_SECRET.to_string()), 3600)
}

/// インメモリリポジトリと指定ディレクトリのアップロード置き場で AppState を作る。
/// レート制限は無効。
pub fn make_test_app_state(
    resident_repo: Arc<InMemoryResidentRepository>,
    user_repo: Arc<InMemoryUserRepository>,
    upload_dir: &Path,
) -> AppState {
    AppState::new(AppDeps {
        resident_repo,
        user_repo,
        clearance_repo: Arc::new(InMemoryRequestRepository::<ClearanceRequest>::new()),
        blotter_repo: Arc::new(InMemoryRequestRepository::<BlotterRequest>::new()),
        token_service: Arc::new(test_token_service()),
        admin_registration_code: SecretString::new(TEST_ADMIN_CODE.to_string()),
        upload_store: UploadStore::new(upload_dir),
        max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
        image_storage: Arc::new(UploadStore::new(upload_dir.join(TEST_PROFILE_DIR))),
        max_image_bytes: TEST_MAX_UPLOAD_BYTES,
        rate_limiters: None,
        metrics: Arc::new(Metrics::new("barangay-records-test")),
    })
}

/// ユーザーを直接登録し、そのユーザーの Bearer トークンを返す。
pub async fn seed_user_token(
    user_repo: &InMemoryUserRepository,
    username: &str,
    role: UserRole,
) -> anyhow::Result<String> {
    let user = User::new(username.to_string(), "unused-hash".to_string(), role);
    user_repo.create(&user).await?;
    test_token_service().issue(&user)
}

/// multipart/form-data の 1 パート。filename があればファイルとして送る。
pub struct FormPart<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: &'a str,
    pub content: &'a [u8],
}

impl<'a> FormPart<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            filename: None,
            content_type: "text/plain",
            content: value.as_bytes(),
        }
    }

    pub fn file(name: &'a str, filename: &'a str, content_type: &'a str, content: &'a [u8]) -> Self {
        Self {
            name,
            filename: Some(filename),
            content_type,
            content,
        }
    }
}

/// 複数パートの multipart/form-data ボディを組み立てる。
pub fn multipart_form(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        let disposition = match part.filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\n",
                part.name
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

/// 単一ファイルの multipart/form-data ボディを組み立てる。
pub fn multipart_body(field: &str, filename: &str, content_type: &str, content: &[u8]) -> Vec<u8> {
    multipart_form(&[FormPart::file(field, filename, content_type, content)])
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
}
