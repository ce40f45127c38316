//! 構造化ログの初期化。
//! tracing-subscriber で JSON またはテキスト形式のログを出力する。

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 環境ごとの既定ログレベル。
///
/// - dev: debug
/// - staging: info
/// - prod: warn
fn default_level(env: &str) -> &'static str {
    match env {
        "dev" => "debug",
        "staging" => "info",
        _ => "warn",
    }
}

/// init_logger は tracing-subscriber を初期化する。
/// RUST_LOG が設定されていればそちらを優先する。format が "text" ならプレーンテキスト、それ以外は JSON。
pub fn init_logger(env: &str, format: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(env)));
    let registry = tracing_subscriber::registry().with(filter);

    if format == "text" {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    } else {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()?;
    }
    Ok(())
}
