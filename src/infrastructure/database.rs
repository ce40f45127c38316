use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::infrastructure::config::DatabaseConfig;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// 接続先を決定する。DATABASE_URL が設定されていれば設定ファイルより優先する。
/// どちらも無ければ None (インメモリリポジトリで動作する)。
pub fn resolve_database_url(
    config: Option<&DatabaseConfig>,
    env_url: Option<String>,
) -> Option<(String, u32)> {
    let max_connections = config.map_or(DEFAULT_MAX_CONNECTIONS, |c| c.max_connections);
    match (env_url.filter(|u| !u.is_empty()), config) {
        (Some(url), _) => Some((url, max_connections)),
        (None, Some(db)) => Some((db.connection_url(), max_connections)),
        (None, None) => None,
    }
}

/// 接続プールを作成し、スキーママイグレーションを適用する。
pub async fn connect(config: Option<&DatabaseConfig>) -> anyhow::Result<Option<PgPool>> {
    let Some((url, max_connections)) =
        resolve_database_url(config, std::env::var("DATABASE_URL").ok())
    else {
        info!("no database configured, using in-memory repositories");
        return Ok(None);
    };

    info!(max_connections, "connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&url)
        .await?;
    info!("database connection pool established");

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("database migrations applied");
    Ok(Some(pool))
}
