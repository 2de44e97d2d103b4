//! axumサーバー起動・シャットダウンハンドリング

use crate::config::ServerConfig;
use crate::shutdown::ShutdownController;
use crate::AppState;
use tokio::net::TcpListener;
use tracing::{error, info};

/// axumサーバーを起動し、シャットダウンシグナルを待機する
///
/// パッケージ同期ループもここで開始し、サーバー停止時に止める。
pub async fn run(state: AppState, config: &ServerConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!(
        "faas listening on port {}! URL: {}",
        config.port,
        config.base_url()
    );
    serve(listener, state).await
}

/// バインド済みのリスナーでサーバーを実行する
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let shutdown = state.shutdown.clone();
    let reconciler = state.reconciler.clone().start();

    let app = crate::api::create_app(state);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await;

    reconciler.abort();
    info!("Server shutdown complete");
    result
}

/// シャットダウンシグナルを待機
pub(crate) async fn shutdown_signal(shutdown: ShutdownController) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = shutdown.wait() => {
            info!("Shutdown requested, shutting down...");
        }
    }
}
