//! serve サブコマンド
//!
//! HTTPサーバーとパッケージ同期ループを起動します。

use clap::Args;
use tracing::info;

use crate::config::{get_database_url, ExecutionConfig, ReconcileConfig, ServerConfig};
use crate::db::migrations::initialize_database;
use crate::AppState;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen port (overrides FAAS_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address (overrides FAAS_HOST)
    #[arg(short = 'H', long)]
    pub host: Option<String>,
}

impl ServeArgs {
    /// 環境変数の設定にCLI引数を上書きした構成
    pub fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::from_env();
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs) -> anyhow::Result<()> {
    let server = args.server_config();
    let execution = ExecutionConfig::from_env();
    let reconcile = ReconcileConfig::from_env();
    let database_url = get_database_url();

    let pool = initialize_database(&database_url).await?;
    info!(
        database_url = %database_url,
        packages_dir = %reconcile.packages_dir.display(),
        "Storage initialized"
    );

    let state = AppState::with_npm(pool, execution, &reconcile);
    crate::server::run(state, &server).await?;
    Ok(())
}
