//! dev サブコマンド
//!
//! 1つのハンドラーファイルを全パスで実行するローカル開発用サーバー。
//! ファイルはリクエストごとに読み直し、シークレットは空で渡す。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::Response,
    Router,
};
use clap::Args;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::api::dispatch::{build_request, error_response, sink_to_response};
use crate::common::error::{ExecutionFault, FaasError};
use crate::common::types::SecretMap;
use crate::config::ServerConfig;
use crate::runtime::{run_handler, BoaEngine};
use crate::server::shutdown_signal;
use crate::shutdown::ShutdownController;

/// dev サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct DevArgs {
    /// Handler source file
    pub file: PathBuf,

    /// Listen port
    #[arg(short, long, default_value_t = 1337)]
    pub port: u16,

    /// Bind address
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    pub host: String,

    /// Directory whose node_modules backs `require`
    #[arg(long, env = "FAAS_PACKAGES_DIR", default_value = "packages")]
    pub packages_dir: PathBuf,
}

#[derive(Debug)]
struct DevState {
    file: PathBuf,
    engine: BoaEngine,
}

/// 開発用サーバーのルーターを構築
pub fn router(file: PathBuf, packages_dir: &Path) -> Router {
    let state = Arc::new(DevState {
        file,
        engine: BoaEngine::new().with_packages_dir(packages_dir),
    });
    Router::new()
        .fallback(handle)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle(
    State(dev): State<Arc<DevState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = build_request(&method, &uri, &headers, &body);
    let name = dev.file.display().to_string();

    let code = match tokio::fs::read_to_string(&dev.file).await {
        Ok(code) => code,
        Err(e) => {
            error!(file = %name, error = %e, "Failed to read handler file");
            return error_response(FaasError::Internal(e.to_string()));
        }
    };

    let engine = dev.engine.clone();
    let task_name = name.clone();
    let result = tokio::task::spawn_blocking(move || {
        run_handler(&engine, &task_name, &code, &request, &SecretMap::new())
    })
    .await
    .unwrap_or_else(|e| Err(ExecutionFault::Aborted(e.to_string())));

    match result {
        Ok(sink) => sink_to_response(sink),
        Err(fault) => {
            error!(file = %name, error = %fault, "Error in handler");
            error_response(FaasError::Execution {
                endpoint: name,
                fault,
            })
        }
    }
}

/// Execute the dev command
pub async fn execute(args: &DevArgs) -> anyhow::Result<()> {
    if !args.file.is_file() {
        anyhow::bail!("Please provide the \"file\" to run.");
    }
    let config = ServerConfig::from_args(args.host.clone(), args.port);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(
        "Debug server listening on port {}! URL: {}",
        config.port,
        config.base_url()
    );
    axum::serve(listener, router(args.file.clone(), &args.packages_dir))
        .with_graceful_shutdown(shutdown_signal(ShutdownController::default()))
        .await?;
    Ok(())
}
