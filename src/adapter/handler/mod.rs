pub mod auth_handler;
pub mod error;
pub mod health;
pub mod import_export_handler;
pub mod request_handler;
pub mod resident_handler;
pub mod upload;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use secrecy::SecretString;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::adapter::middleware::auth::auth_middleware;
use crate::adapter::middleware::metrics::track_metrics;
use crate::adapter::middleware::rate_limit::{rate_limit, RateLimiters};
use crate::adapter::middleware::rbac::require_admin;
use crate::domain::entity::request::{BlotterRequest, ClearanceRequest};
use crate::domain::repository::{
    ProfileImageStorage, RequestRepository, ResidentRepository, UserRepository,
};
use crate::infrastructure::metrics::Metrics;
use crate::infrastructure::{TokenService, UploadStore};
use crate::usecase::{
    CreateResidentUseCase, DeleteResidentUseCase, ExportResidentsUseCase, GetProfileImageUseCase,
    GetResidentUseCase, ImportResidentsUseCase, ListResidentsUseCase, LoginUseCase,
    RegisterUserUseCase, RequestUseCases, ResidentStatsUseCase, SubmitBlotterRequestUseCase,
    SubmitClearanceRequestUseCase, UpdateResidentUseCase, ValidateTokenUseCase,
};
use upload::MULTIPART_OVERHEAD_BYTES;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub import_residents_uc: Arc<ImportResidentsUseCase>,
    pub export_residents_uc: Arc<ExportResidentsUseCase>,
    pub list_residents_uc: Arc<ListResidentsUseCase>,
    pub get_resident_uc: Arc<GetResidentUseCase>,
    pub create_resident_uc: Arc<CreateResidentUseCase>,
    pub update_resident_uc: Arc<UpdateResidentUseCase>,
    pub delete_resident_uc: Arc<DeleteResidentUseCase>,
    pub resident_stats_uc: Arc<ResidentStatsUseCase>,
    pub get_profile_image_uc: Arc<GetProfileImageUseCase>,
    pub register_user_uc: Arc<RegisterUserUseCase>,
    pub login_uc: Arc<LoginUseCase>,
    pub validate_token_uc: Arc<ValidateTokenUseCase>,
    pub submit_clearance_request_uc: Arc<SubmitClearanceRequestUseCase>,
    pub submit_blotter_request_uc: Arc<SubmitBlotterRequestUseCase>,
    pub clearance_requests: RequestUseCases<ClearanceRequest>,
    pub blotter_requests: RequestUseCases<BlotterRequest>,
    pub upload_store: UploadStore,
    pub max_upload_bytes: usize,
    pub max_image_bytes: usize,
    /// None のときはレート制限しない
    pub rate_limiters: Option<RateLimiters>,
    pub metrics: Arc<Metrics>,
    pub db_pool: Option<PgPool>,
}

/// AppState の組み立てに必要な依存。
pub struct AppDeps {
    pub resident_repo: Arc<dyn ResidentRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub clearance_repo: Arc<dyn RequestRepository<ClearanceRequest>>,
    pub blotter_repo: Arc<dyn RequestRepository<BlotterRequest>>,
    pub token_service: Arc<dyn TokenService>,
    pub admin_registration_code: SecretString,
    pub upload_store: UploadStore,
    pub max_upload_bytes: usize,
    pub image_storage: Arc<dyn ProfileImageStorage>,
    pub max_image_bytes: usize,
    pub rate_limiters: Option<RateLimiters>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(deps: AppDeps) -> Self {
        let residents = deps.resident_repo;
        let users = deps.user_repo;
        let tokens = deps.token_service;
        let images = deps.image_storage;
        Self {
            import_residents_uc: Arc::new(ImportResidentsUseCase::new(residents.clone())),
            export_residents_uc: Arc::new(ExportResidentsUseCase::new(residents.clone())),
            list_residents_uc: Arc::new(ListResidentsUseCase::new(residents.clone())),
            get_resident_uc: Arc::new(GetResidentUseCase::new(residents.clone())),
            create_resident_uc: Arc::new(CreateResidentUseCase::new(
                residents.clone(),
                images.clone(),
            )),
            update_resident_uc: Arc::new(UpdateResidentUseCase::new(
                residents.clone(),
                images.clone(),
            )),
            delete_resident_uc: Arc::new(DeleteResidentUseCase::new(
                residents.clone(),
                images.clone(),
            )),
            resident_stats_uc: Arc::new(ResidentStatsUseCase::new(residents.clone())),
            get_profile_image_uc: Arc::new(GetProfileImageUseCase::new(residents, images)),
            register_user_uc: Arc::new(RegisterUserUseCase::new(
                users.clone(),
                tokens.clone(),
                deps.admin_registration_code,
            )),
            login_uc: Arc::new(LoginUseCase::new(users.clone(), tokens.clone())),
            validate_token_uc: Arc::new(ValidateTokenUseCase::new(users, tokens)),
            submit_clearance_request_uc: Arc::new(SubmitClearanceRequestUseCase::new(
                deps.clearance_repo.clone(),
            )),
            submit_blotter_request_uc: Arc::new(SubmitBlotterRequestUseCase::new(
                deps.blotter_repo.clone(),
            )),
            clearance_requests: RequestUseCases::new(deps.clearance_repo),
            blotter_requests: RequestUseCases::new(deps.blotter_repo),
            upload_store: deps.upload_store,
            max_upload_bytes: deps.max_upload_bytes,
            max_image_bytes: deps.max_image_bytes,
            rate_limiters: deps.rate_limiters,
            metrics: deps.metrics,
            db_pool: None,
        }
    }

    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

/// Build the REST API router.
pub fn router(state: AppState) -> Router {
    // 認証不要のエンドポイント
    let public_routes = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics_handler))
        .route("/api/auth/register-admin", post(auth_handler::register_admin))
        .route("/api/auth/register-user", post(auth_handler::register_user))
        .route("/api/auth/login", post(auth_handler::login))
        .route("/api/auth/verify", get(auth_handler::verify))
        .route("/api/auth/logout", post(auth_handler::logout))
        .route(
            "/api/residents/{id}/profile-image",
            get(resident_handler::get_profile_image),
        );

    // 申請の審査と削除は管理者のみ
    let admin_routes = Router::new()
        .route(
            "/api/clearance-requests/{id}/approve",
            patch(request_handler::approve_request::<ClearanceRequest>),
        )
        .route(
            "/api/clearance-requests/{id}/deny",
            patch(request_handler::deny_request::<ClearanceRequest>),
        )
        .route(
            "/api/clearance-requests/{id}",
            delete(request_handler::delete_request::<ClearanceRequest>),
        )
        .route(
            "/api/blotter-requests/{id}/approve",
            patch(request_handler::approve_request::<BlotterRequest>),
        )
        .route(
            "/api/blotter-requests/{id}/deny",
            patch(request_handler::deny_request::<BlotterRequest>),
        )
        .route(
            "/api/blotter-requests/{id}",
            delete(request_handler::delete_request::<BlotterRequest>),
        )
        .route_layer(from_fn(require_admin));

    // ログイン済みであれば権限区分を問わない
    let api_routes = Router::new()
        .route("/api/auth/me", get(auth_handler::me))
        .route(
            "/api/residents",
            get(resident_handler::list_residents).post(resident_handler::create_resident),
        )
        .route("/api/residents/stats", get(resident_handler::resident_stats))
        .route(
            "/api/residents/import-csv",
            post(import_export_handler::import_csv),
        )
        .route(
            "/api/residents/export-csv",
            get(import_export_handler::export_csv),
        )
        .route(
            "/api/residents/{id}",
            get(resident_handler::get_resident)
                .put(resident_handler::update_resident)
                .delete(resident_handler::delete_resident),
        )
        .route(
            "/api/clearance-requests",
            get(request_handler::list_requests::<ClearanceRequest>)
                .post(request_handler::submit_clearance_request),
        )
        .route(
            "/api/blotter-requests",
            get(request_handler::list_requests::<BlotterRequest>)
                .post(request_handler::submit_blotter_request),
        )
        .merge(admin_routes)
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let body_limit = state
        .max_upload_bytes
        .max(state.max_image_bytes)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    public_routes
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn_with_state(state.clone(), rate_limit))
        .layer(from_fn_with_state(state.clone(), track_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
