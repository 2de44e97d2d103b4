//! エンドポイントレジストリ
//!
//! 名前の一意性はストア側の主キー制約に任せ、違反を `Duplicate` に変換する。

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{db_error, is_unique_violation};
use crate::common::error::{FaasError, FaasResult};
use crate::common::types::{validate_endpoint_name, Endpoint};
use crate::db::traits::EndpointRepository;

/// エンドポイントレジストリ
#[derive(Clone)]
pub struct EndpointRegistry {
    repo: Arc<dyn EndpointRepository>,
}

impl EndpointRegistry {
    /// Repository実装から作成
    pub fn new(repo: Arc<dyn EndpointRepository>) -> Self {
        Self { repo }
    }

    /// SQLiteプールから作成
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self::new(Arc::new(pool))
    }

    /// エンドポイントを新規登録
    ///
    /// 同名が既に存在する場合は `FaasError::Duplicate` を返し、既存のコードは変更されない。
    pub async fn create(&self, name: &str, code: &str) -> FaasResult<Endpoint> {
        validate_endpoint_name(name).map_err(FaasError::validation)?;

        let endpoint = Endpoint::new(name, code);
        match self.repo.create_endpoint(&endpoint).await {
            Ok(()) => {
                info!(endpoint = %name, "Endpoint created");
                Ok(endpoint)
            }
            Err(err) if is_unique_violation(&err) => Err(FaasError::Duplicate(name.to_string())),
            Err(err) => Err(db_error(err)),
        }
    }

    /// エンドポイントを作成または置換
    pub async fn upsert(&self, name: &str, code: &str) -> FaasResult<()> {
        validate_endpoint_name(name).map_err(FaasError::validation)?;
        self.repo
            .upsert_endpoint(name, code)
            .await
            .map_err(db_error)?;
        info!(endpoint = %name, "Endpoint saved");
        Ok(())
    }

    /// 既存エンドポイントにコードをアップロード
    ///
    /// 対象が存在しない場合は `FaasError::NotFound`。
    pub async fn upload(&self, name: &str, code: &str) -> FaasResult<()> {
        let updated = self.repo.update_code(name, code).await.map_err(db_error)?;
        if !updated {
            return Err(FaasError::NotFound(format!("endpoint '{name}'")));
        }
        info!(endpoint = %name, bytes = code.len(), "Endpoint code uploaded");
        Ok(())
    }

    /// エンドポイントを削除（存在しなくてもエラーにしない）
    ///
    /// 実際に削除された場合は `true`。
    pub async fn remove(&self, name: &str) -> FaasResult<bool> {
        let removed = self.repo.delete_endpoint(name).await.map_err(db_error)?;
        if removed {
            info!(endpoint = %name, "Endpoint removed");
        } else {
            debug!(endpoint = %name, "Endpoint to remove was absent");
        }
        Ok(removed)
    }

    /// 名前で検索
    pub async fn find(&self, name: &str) -> FaasResult<Option<Endpoint>> {
        self.repo.find_by_name(name).await.map_err(db_error)
    }

    /// 全エンドポイントを取得
    pub async fn list(&self) -> FaasResult<Vec<Endpoint>> {
        self.repo.list_endpoints().await.map_err(db_error)
    }

    /// エンドポイント名の一覧を取得
    pub async fn list_names(&self) -> FaasResult<Vec<String>> {
        self.repo.list_names().await.map_err(db_error)
    }
}
