//! faas - Function as a Service host
//!
//! 名前付きハンドラー（エンドポイント）をストアに保持し、HTTPリクエストを
//! 対応するハンドラーへディスパッチする。要求パッケージの同期ループも持つ。

#![warn(missing_docs)]

/// 共通型定義
pub mod common;

/// REST APIハンドラー
pub mod api;

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// データベースアクセス
pub mod db;

/// リクエストディスパッチャー
pub mod dispatcher;

/// ロギング初期化ユーティリティ
pub mod logging;

/// ランタイムパッケージ同期
pub mod packages;

/// エンドポイント・シークレット・パッケージのレジストリ
pub mod registry;

/// ハンドラー実行基盤
pub mod runtime;

/// axumサーバー起動
pub mod server;

/// Cooperative shutdown
pub mod shutdown;

use std::sync::Arc;

use sqlx::SqlitePool;

use config::{ExecutionConfig, ReconcileConfig};
use dispatcher::Dispatcher;
use packages::{NpmPackageManager, PackageManager, Reconciler};
use registry::{EndpointRegistry, PackageRegistry, SecretRegistry};

/// アプリケーション状態
///
/// 起動時に1度だけ構築し、ルーター・ディスパッチャー・同期ループに渡す。
#[derive(Clone)]
pub struct AppState {
    /// エンドポイントレジストリ
    pub endpoints: EndpointRegistry,
    /// シークレットレジストリ
    pub secrets: SecretRegistry,
    /// 要求パッケージレジストリ
    pub packages: PackageRegistry,
    /// ディスパッチャー
    pub dispatcher: Dispatcher,
    /// パッケージ同期ループ
    pub reconciler: Reconciler,
    /// Cooperative shutdown controller
    pub shutdown: shutdown::ShutdownController,
}

impl AppState {
    /// 任意のパッケージマネージャーで構築
    pub fn new(
        pool: SqlitePool,
        manager: Arc<dyn PackageManager>,
        execution: ExecutionConfig,
        reconcile: &ReconcileConfig,
    ) -> Self {
        let endpoints = EndpointRegistry::from_pool(pool.clone());
        let secrets = SecretRegistry::from_pool(pool.clone());
        let packages = PackageRegistry::from_pool(pool);
        let dispatcher = Dispatcher::with_boa(
            endpoints.clone(),
            secrets.clone(),
            execution,
            &reconcile.packages_dir,
        );
        let reconciler = Reconciler::new(packages.clone(), manager, reconcile.interval);

        Self {
            endpoints,
            secrets,
            packages,
            dispatcher,
            reconciler,
            shutdown: shutdown::ShutdownController::default(),
        }
    }

    /// 設定どおりのnpmアダプターで構築
    pub fn with_npm(pool: SqlitePool, execution: ExecutionConfig, reconcile: &ReconcileConfig) -> Self {
        let manager = NpmPackageManager::new(
            reconcile.package_manager.clone(),
            reconcile.packages_dir.clone(),
        );
        Self::new(pool, Arc::new(manager), execution, reconcile)
    }
}
