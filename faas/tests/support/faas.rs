use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use faas::common::error::ReconcileFault;
use faas::config::{ExecutionConfig, ReconcileConfig};
use faas::db::migrations::initialize_database;
use faas::packages::PackageManager;
use faas::{api, AppState};

use super::http::{spawn_router, TestServer};

/// メモリ上で動作するテスト用パッケージマネージャー
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryPackageManager {
    pub installed: Mutex<Vec<String>>,
    pub install_calls: Mutex<Vec<String>>,
    pub install_delay: Duration,
}

#[allow(dead_code)]
impl MemoryPackageManager {
    pub fn with_installed(names: &[&str]) -> Self {
        Self {
            installed: Mutex::new(names.iter().map(|s| s.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn install_calls(&self) -> Vec<String> {
        self.install_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PackageManager for MemoryPackageManager {
    async fn list(&self) -> Result<Vec<String>, ReconcileFault> {
        Ok(self.installed.lock().unwrap().clone())
    }

    async fn install(&self, name: &str) -> Result<(), ReconcileFault> {
        tokio::time::sleep(self.install_delay).await;
        self.install_calls.lock().unwrap().push(name.to_string());
        self.installed.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

/// テスト用のアプリケーション状態を作成する
#[allow(dead_code)]
pub async fn create_test_state(manager: Arc<MemoryPackageManager>) -> AppState {
    create_test_state_with(manager, ExecutionConfig::default()).await
}

/// 実行設定を指定してテスト用のアプリケーション状態を作成する
#[allow(dead_code)]
pub async fn create_test_state_with(
    manager: Arc<MemoryPackageManager>,
    execution: ExecutionConfig,
) -> AppState {
    create_test_state_with_reconcile(manager, execution, &ReconcileConfig::default()).await
}

/// 同期設定（パッケージディレクトリなど）も指定してテスト用のアプリケーション状態を作成する
#[allow(dead_code)]
pub async fn create_test_state_with_reconcile(
    manager: Arc<MemoryPackageManager>,
    execution: ExecutionConfig,
    reconcile: &ReconcileConfig,
) -> AppState {
    let pool = initialize_database("sqlite::memory:")
        .await
        .expect("Failed to initialize test database");
    AppState::new(pool, manager, execution, reconcile)
}

/// テスト用のルーターを作成する（.oneshot()スタイルのテスト用）
#[allow(dead_code)]
pub async fn create_test_app() -> (Router, AppState) {
    let state = create_test_state(Arc::new(MemoryPackageManager::default())).await;
    (api::create_app(state.clone()), state)
}

/// テスト用サーバーを実ポートで起動する
#[allow(dead_code)]
pub async fn spawn_test_faas() -> (TestServer, AppState) {
    let (app, state) = create_test_app().await;
    (spawn_router(app).await, state)
}
