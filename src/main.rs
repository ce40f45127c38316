use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use barangay_records_server::adapter::handler::{self, AppDeps, AppState};
use barangay_records_server::adapter::middleware::cors::cors_layer;
use barangay_records_server::adapter::middleware::rate_limit::RateLimiters;
use barangay_records_server::adapter::repository::{
    BlotterRequestPostgresRepository, ClearanceRequestPostgresRepository,
    InMemoryRequestRepository, InMemoryResidentRepository, InMemoryUserRepository,
    ResidentPostgresRepository, UserPostgresRepository,
};
use barangay_records_server::domain::entity::request::{BlotterRequest, ClearanceRequest};
use barangay_records_server::domain::repository::{
    RequestRepository, ResidentRepository, UserRepository,
};
use barangay_records_server::infrastructure::config::Config;
use barangay_records_server::infrastructure::metrics::Metrics;
use barangay_records_server::infrastructure::{database, telemetry, JwtTokenService, UploadStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/config.yaml".to_string());
    let cfg = Config::load(&config_path)?;

    telemetry::init_logger(&cfg.app.environment, &cfg.app.log_format)?;

    info!(
        app_name = %cfg.app.name,
        version = %cfg.app.version,
        environment = %cfg.app.environment,
        "starting barangay records server"
    );

    let db_pool = database::connect(cfg.database.as_ref()).await?;
    let repos = match &db_pool {
        Some(pool) => Repositories {
            residents: Arc::new(ResidentPostgresRepository::new(pool.clone())),
            users: Arc::new(UserPostgresRepository::new(pool.clone())),
            clearance: Arc::new(ClearanceRequestPostgresRepository::new(pool.clone())),
            blotter: Arc::new(BlotterRequestPostgresRepository::new(pool.clone())),
        },
        None => Repositories {
            residents: Arc::new(InMemoryResidentRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            clearance: Arc::new(InMemoryRequestRepository::<ClearanceRequest>::new()),
            blotter: Arc::new(InMemoryRequestRepository::<BlotterRequest>::new()),
        },
    };

    let token_service = Arc::new(JwtTokenService::new(
        cfg.auth.jwt_secret.clone(),
        cfg.auth.token_ttl_secs,
    ));
    let metrics = Arc::new(Metrics::new(&cfg.app.name));

    let rate_limiters = cfg
        .rate_limit_enabled()
        .then(|| RateLimiters::from_config(&cfg.rate_limit));
    info!(enabled = rate_limiters.is_some(), "rate limiting configured");

    let mut state = AppState::new(AppDeps {
        resident_repo: repos.residents,
        user_repo: repos.users,
        clearance_repo: repos.clearance,
        blotter_repo: repos.blotter,
        token_service,
        admin_registration_code: cfg.auth.admin_registration_code.clone(),
        upload_store: UploadStore::new(&cfg.import.upload_dir),
        max_upload_bytes: cfg.import.max_file_size_bytes(),
        image_storage: Arc::new(UploadStore::new(&cfg.profile_image.upload_dir)),
        max_image_bytes: cfg.profile_image.max_file_size_bytes(),
        rate_limiters,
        metrics,
    });
    if let Some(pool) = db_pool {
        state = state.with_db_pool(pool);
    }

    let app = handler::router(state).layer(cors_layer(&cfg.cors)?);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| format!("invalid listen address: {}:{}", cfg.server.host, cfg.server.port))?;
    info!("REST server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // レート制限がクライアント IP を参照できるよう接続情報を付ける
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("barangay records server exited");
    Ok(())
}

struct Repositories {
    residents: Arc<dyn ResidentRepository>,
    users: Arc<dyn UserRepository>,
    clearance: Arc<dyn RequestRepository<ClearanceRequest>>,
    blotter: Arc<dyn RequestRepository<BlotterRequest>>,
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
