//! 要求パッケージレジストリ
//!
//! 追記のみ。重複・前後空白の正規化は同期ループ側で扱う。

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use super::db_error;
use crate::common::error::{FaasError, FaasResult};
use crate::common::types::PackageRequest;
use crate::db::traits::PackageRepository;

/// 要求パッケージレジストリ
#[derive(Clone)]
pub struct PackageRegistry {
    repo: Arc<dyn PackageRepository>,
}

impl PackageRegistry {
    /// Repository実装から作成
    pub fn new(repo: Arc<dyn PackageRepository>) -> Self {
        Self { repo }
    }

    /// SQLiteプールから作成
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self::new(Arc::new(pool))
    }

    /// パッケージ要求を追加
    pub async fn add(&self, name: &str) -> FaasResult<i64> {
        if name.trim().is_empty() {
            return Err(FaasError::validation("Please give a package name."));
        }
        let id = self.repo.add_package(name).await.map_err(db_error)?;
        info!(package = %name, id, "Package requested");
        Ok(id)
    }

    /// 要求一覧を取得
    pub async fn list(&self) -> FaasResult<Vec<PackageRequest>> {
        self.repo.list_packages().await.map_err(db_error)
    }

    /// 要求されたパッケージ名を要求順に取得
    pub async fn names(&self) -> FaasResult<Vec<String>> {
        Ok(self.list().await?.into_iter().map(|p| p.name).collect())
    }
}
