//! ロギング初期化
//!
//! 標準出力への人間向けログと、`FAAS_LOG_DIR` 指定時の日次ローテーションJSONログを設定する。

use crate::config::get_env_with_fallback;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// ログファイル名のプレフィックス
const LOG_FILE_PREFIX: &str = "faas.log";

/// ログレベルフィルタを構築
///
/// `FAAS_LOG_LEVEL`（旧: `LOG_LEVEL`）→ `RUST_LOG` → `info` の順に参照する。
fn build_filter() -> EnvFilter {
    if let Some(level) = get_env_with_fallback("FAAS_LOG_LEVEL", "LOG_LEVEL") {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// グローバルsubscriberを初期化する
///
/// ファイル出力が有効な場合は `WorkerGuard` を返す。呼び出し側はプロセス終了まで保持すること
/// （dropするとバッファ済みのログが書き出されずに失われる）。
pub fn init() -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let stdout_layer = fmt::layer().with_target(false).with_filter(build_filter());

    match std::env::var("FAAS_LOG_DIR").ok().filter(|dir| !dir.is_empty()) {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(build_filter());

            tracing_subscriber::registry()
                .with(stdout_layer)
                .with(file_layer)
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry().with(stdout_layer).try_init()?;
            Ok(None)
        }
    }
}
