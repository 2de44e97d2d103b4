//! シークレットレジストリ
//!
//! 全シークレットは呼び出しごとに1つのマップへ展開され、全エンドポイントに渡される。

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use super::db_error;
use crate::common::error::{FaasError, FaasResult};
use crate::common::types::SecretMap;
use crate::db::traits::SecretRepository;

/// シークレットレジストリ
#[derive(Clone)]
pub struct SecretRegistry {
    repo: Arc<dyn SecretRepository>,
}

impl SecretRegistry {
    /// Repository実装から作成
    pub fn new(repo: Arc<dyn SecretRepository>) -> Self {
        Self { repo }
    }

    /// SQLiteプールから作成
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self::new(Arc::new(pool))
    }

    /// シークレットを設定（既存の値は上書き）
    pub async fn set(&self, key: &str, value: &str) -> FaasResult<()> {
        if key.trim().is_empty() {
            return Err(FaasError::validation("Please give a key for the secret."));
        }
        self.repo.set_secret(key, value).await.map_err(db_error)?;
        info!(key = %key, "Secret set");
        Ok(())
    }

    /// シークレットを削除（存在しなくてもエラーにしない）
    pub async fn remove(&self, key: &str) -> FaasResult<bool> {
        let removed = self.repo.delete_secret(key).await.map_err(db_error)?;
        if removed {
            info!(key = %key, "Secret removed");
        }
        Ok(removed)
    }

    /// 呼び出し用のシークレットマップを取得
    pub async fn find_all(&self) -> FaasResult<SecretMap> {
        self.repo.find_all_secrets().await.map_err(db_error)
    }

    /// キー一覧を取得（値は返さない）
    pub async fn list_keys(&self) -> FaasResult<Vec<String>> {
        self.repo.list_secret_keys().await.map_err(db_error)
    }
}
