//! CLI module for faas
//!
//! Provides the command-line interface for serving and authoring endpoints.

pub mod dev;
pub mod endpoint;
pub mod info;
pub mod package;
pub mod secret;
pub mod serve;
pub mod status;

use clap::{Parser, Subcommand};
use sqlx::SqlitePool;

use crate::config::get_database_url;
use crate::db::migrations::initialize_database;

/// faas - host small request handlers behind one HTTP server
#[derive(Parser, Debug)]
#[command(name = "faas")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    FAAS_DATABASE_URL               Database URL (default: sqlite:faas.db)
    FAAS_HOST                       Bind address (default: 0.0.0.0)
    FAAS_PORT                       Listen port (default: 3000)
    FAAS_LOG_LEVEL                  Log level (default: info)
    FAAS_LOG_DIR                    Directory for JSON log files (disabled if unset)
    FAAS_PACKAGE_POLL_INTERVAL_MS   Package reconcile interval (default: 60000)
    FAAS_PACKAGES_DIR               Package directory (default: packages)
    FAAS_PACKAGE_MANAGER            Package manager command (default: npm)
    FAAS_HANDLER_TIMEOUT_MS         Handler deadline in ms (disabled if unset)
    FAAS_HANDLER_LOOP_LIMIT         Handler loop iteration limit (disabled if unset)
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server and the package reconciler
    Serve(serve::ServeArgs),
    /// Manage endpoints
    Endpoint(endpoint::EndpointArgs),
    /// Manage secrets
    Secret(secret::SecretArgs),
    /// Manage requested packages
    Package(package::PackageArgs),
    /// Run a single handler file locally
    Dev(dev::DevArgs),
    /// Show the effective configuration
    Info,
    /// Check whether a server answers on a port
    Status(status::StatusArgs),
}

/// 設定されたデータベースを開く（未作成なら作成してマイグレーション）
pub async fn open_database() -> anyhow::Result<SqlitePool> {
    let url = get_database_url();
    let pool = initialize_database(&url).await?;
    Ok(pool)
}
