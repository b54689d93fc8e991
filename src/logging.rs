// ログ初期化

use crate::config::LogConfig;
use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "callsight.log";

/// RUST_LOG → 設定のレベル → "info" の順でフィルターを決定
pub fn build_env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// ログを初期化
///
/// 標準エラーへのコンパクト出力に加え、ファイル出力が有効なら日次ローテーションの
/// JSONログを書き出す。戻り値のガードはプロセス終了まで保持すること。
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let log_dir = if config.enable_file_logging {
        Some(config.resolve_log_dir()?)
    } else {
        None
    };

    let (file_layer, guard) = if let Some(log_dir) = &log_dir {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(build_env_filter(config))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    if let Some(dir) = log_dir {
        tracing::debug!(log_dir = %dir.display(), "File logging enabled");
    }

    Ok(guard)
}
