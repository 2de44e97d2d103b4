//! パッケージ同期ループ
//!
//! 起動直後に1回、その後は一定間隔でパスを実行する。
//! パスは同時に1つしか実行されず（実行中に来たティック・手動トリガーはスキップ）、
//! パス内のインストールは1つずつ順に行う。

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::{is_satisfied, normalize_desired, PackageManager};
use crate::common::error::ReconcileFault;
use crate::registry::PackageRegistry;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// 1パス分の結果
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PassReport {
    /// 正規化後の要求パッケージ
    pub desired: Vec<String>,
    /// 既にインストール済みとみなされたもの
    pub satisfied: Vec<String>,
    /// このパスでインストールしたもの
    pub installed: Vec<String>,
    /// インストールに失敗したもの
    pub failed: Vec<String>,
}

/// パスの実行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// パスを実行した
    Completed(PassReport),
    /// 別のパスが実行中のためスキップした
    Skipped,
}

/// パッケージ同期ループ
#[derive(Clone)]
pub struct Reconciler {
    packages: PackageRegistry,
    manager: Arc<dyn PackageManager>,
    in_flight: Arc<Mutex<()>>,
    interval: Duration,
}

impl Reconciler {
    /// 新しい同期ループを作成
    ///
    /// `interval` は最短1msに切り上げる（`tokio::time::interval` はゼロでパニックする）。
    pub fn new(packages: PackageRegistry, manager: Arc<dyn PackageManager>, interval: Duration) -> Self {
        Self {
            packages,
            manager,
            in_flight: Arc::new(Mutex::new(())),
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// 実行間隔
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// バックグラウンドでループを開始
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.tick().await;
            self.monitor_loop().await;
        })
    }

    async fn monitor_loop(&self) {
        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Package reconciler started"
        );

        // 初回ティックは即時に発火するため、起動時のパス分を読み捨てる
        timer.tick().await;

        loop {
            timer.tick().await;
            self.tick().await;
        }
    }

    async fn tick(&self) {
        match self.run_pass().await {
            Ok(PassOutcome::Completed(_)) => {}
            Ok(PassOutcome::Skipped) => debug!("Package pass still in flight, skipping tick"),
            Err(e) => error!(error = %e, "Failed to reconcile packages"),
        }
    }

    /// 1パスを実行する
    ///
    /// 要求一覧・インストール済み一覧の取得に失敗した場合はパス全体を中止する。
    /// 個々のインストール失敗はログに記録し、残りのインストールを続ける。
    pub async fn run_pass(&self) -> Result<PassOutcome, ReconcileFault> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            return Ok(PassOutcome::Skipped);
        };

        let requested = self
            .packages
            .names()
            .await
            .map_err(|e| ReconcileFault::Registry(e.to_string()))?;
        let desired = normalize_desired(requested);
        if desired.is_empty() {
            debug!("No packages requested");
            return Ok(PassOutcome::Completed(PassReport::default()));
        }

        let installed_names = self.manager.list().await?;

        let mut report = PassReport {
            desired: desired.clone(),
            ..PassReport::default()
        };
        for name in desired {
            if is_satisfied(&name, &installed_names) {
                debug!(package = %name, "Already installed, skipping");
                report.satisfied.push(name);
                continue;
            }

            info!(package = %name, "Installing package");
            match self.manager.install(&name).await {
                Ok(()) => report.installed.push(name),
                Err(e) => {
                    warn!(package = %name, error = %e, "Package install failed");
                    report.failed.push(name);
                }
            }
        }

        info!(
            desired = report.desired.len(),
            satisfied = report.satisfied.len(),
            installed = report.installed.len(),
            failed = report.failed.len(),
            "Package pass completed"
        );
        Ok(PassOutcome::Completed(report))
    }
}
