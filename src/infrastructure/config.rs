use std::path::Path;

use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// JWT 署名鍵の最小長 (バイト)。
pub const MIN_JWT_SECRET_LEN: usize = 32;

const ENVIRONMENTS: [&str; 3] = ["dev", "staging", "prod"];

/// Config は台帳サーバーの設定ファイル (YAML) を表す。
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub profile_image: ProfileImageConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    /// "json" または "text"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    pub name: String,
    pub user: String,
    #[serde(default = "empty_secret")]
    pub password: SecretString,
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn connection_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}?sslmode={}",
            self.user,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.name,
            self.ssl_mode
        )
    }
}

/// AuthConfig はトークン発行と管理者登録の設定。
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: SecretString,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
    pub admin_registration_code: SecretString,
}

/// ImportConfig は CSV 取り込みの設定。
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_file_size_mb: default_max_file_size(),
        }
    }
}

impl ImportConfig {
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }
}

/// ProfileImageConfig は住民のプロフィール画像の保存設定。
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileImageConfig {
    #[serde(default = "default_image_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: usize,
}

impl Default for ProfileImageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_image_dir(),
            max_file_size_mb: default_max_file_size(),
        }
    }
}

impl ProfileImageConfig {
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }
}

/// CorsConfig はブラウザからのクロスオリジン呼び出しの許可設定。
/// allowed_origins が空か `"*"` を含む場合はリクエストの Origin をそのまま許可する。
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_secs: default_cors_max_age(),
        }
    }
}

impl CorsConfig {
    pub fn mirrors_request_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// RateLimitConfig はクライアント IP ごとのレート制限設定。
/// enabled を省略すると prod 環境でのみ有効になる。
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub enabled: Option<bool>,
    /// `/api/` 配下の全リクエスト
    #[serde(default = "default_api_limit")]
    pub api: RateLimitRule,
    /// `/api/auth` 配下の失敗したリクエスト
    #[serde(default = "default_auth_limit")]
    pub auth: RateLimitRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: None,
            api: default_api_limit(),
            auth: default_auth_limit(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimitRule {
    pub max_requests: u32,
    pub window_secs: u64,
}

fn default_version() -> String { "0.1.0".to_string() }
fn default_environment() -> String { "dev".to_string() }
fn default_log_format() -> String { "json".to_string() }
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }
fn default_db_port() -> u16 { 5432 }
fn default_ssl_mode() -> String { "disable".to_string() }
fn default_max_connections() -> u32 { 10 }
fn default_token_ttl() -> i64 { 86_400 }
fn default_upload_dir() -> String { "uploads/csv".to_string() }
fn default_max_file_size() -> usize { 5 }
fn default_image_dir() -> String { "uploads/profiles".to_string() }
fn default_cors_max_age() -> u64 { 86_400 }
fn default_api_limit() -> RateLimitRule { RateLimitRule { max_requests: 100, window_secs: 900 } }
fn default_auth_limit() -> RateLimitRule { RateLimitRule { max_requests: 10, window_secs: 3600 } }
fn empty_secret() -> SecretString { SecretString::new(String::new()) }

impl Config {
    /// 設定ファイルを読み込み、環境変数で上書きしてから検証する。
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// JWT_SECRET / ADMIN_REGISTRATION_CODE を反映する。DATABASE_URL は接続時に参照する。
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = SecretString::new(secret);
        }
        if let Some(code) = lookup("ADMIN_REGISTRATION_CODE").filter(|s| !s.is_empty()) {
            self.auth.admin_registration_code = SecretString::new(code);
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be between 1 and 65535");
        }
        if !ENVIRONMENTS.contains(&self.app.environment.as_str()) {
            anyhow::bail!(
                "app.environment must be one of {:?}, got {:?}",
                ENVIRONMENTS,
                self.app.environment
            );
        }
        if self.auth.jwt_secret.expose_secret().len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!(
                "auth.jwt_secret must be at least {} characters",
                MIN_JWT_SECRET_LEN
            );
        }
        if self.auth.admin_registration_code.expose_secret().is_empty() {
            anyhow::bail!("auth.admin_registration_code must not be empty");
        }
        if self.auth.token_ttl_secs <= 0 {
            anyhow::bail!("auth.token_ttl_secs must be positive");
        }
        if self.import.max_file_size_mb == 0 {
            anyhow::bail!("import.max_file_size_mb must be positive");
        }
        if self.profile_image.max_file_size_mb == 0 {
            anyhow::bail!("profile_image.max_file_size_mb must be positive");
        }
        for (name, rule) in [("api", self.rate_limit.api), ("auth", self.rate_limit.auth)] {
            if rule.max_requests == 0 || rule.window_secs == 0 {
                anyhow::bail!("rate_limit.{name} must allow at least one request per window");
            }
        }
        Ok(())
    }

    pub fn rate_limit_enabled(&self) -> bool {
        self.rate_limit
            .enabled
            .unwrap_or(self.app.environment == "prod")
    }
}
