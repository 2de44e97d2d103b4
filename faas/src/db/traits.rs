//! Repository traitパターン定義
//!
//! DB操作を抽象化し、テスタビリティを向上させるためのtrait群。
//! 各traitは既存のフリー関数に対応する。

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::common::types::{Endpoint, PackageRequest, Secret, SecretMap};

// ---------------------------------------------------------------------------
// EndpointRepository
// ---------------------------------------------------------------------------

/// エンドポイントCRUD操作のRepository trait
#[async_trait]
pub trait EndpointRepository: Send + Sync {
    /// エンドポイントを登録
    async fn create_endpoint(&self, endpoint: &Endpoint) -> Result<(), sqlx::Error>;
    /// エンドポイントを作成または置換
    async fn upsert_endpoint(&self, name: &str, code: &str) -> Result<(), sqlx::Error>;
    /// 既存エンドポイントのコードを置換
    async fn update_code(&self, name: &str, code: &str) -> Result<bool, sqlx::Error>;
    /// エンドポイントを削除
    async fn delete_endpoint(&self, name: &str) -> Result<bool, sqlx::Error>;
    /// 名前でエンドポイントを検索
    async fn find_by_name(&self, name: &str) -> Result<Option<Endpoint>, sqlx::Error>;
    /// エンドポイント一覧を取得
    async fn list_endpoints(&self) -> Result<Vec<Endpoint>, sqlx::Error>;
    /// エンドポイント名一覧を取得
    async fn list_names(&self) -> Result<Vec<String>, sqlx::Error>;
}

// ---------------------------------------------------------------------------
// SecretRepository
// ---------------------------------------------------------------------------

/// シークレット操作のRepository trait
#[async_trait]
pub trait SecretRepository: Send + Sync {
    /// シークレットを設定
    async fn set_secret(&self, key: &str, value: &str) -> Result<(), sqlx::Error>;
    /// シークレットを削除
    async fn delete_secret(&self, key: &str) -> Result<bool, sqlx::Error>;
    /// キーでシークレットを取得
    async fn find_secret(&self, key: &str) -> Result<Option<Secret>, sqlx::Error>;
    /// 全シークレットを取得
    async fn find_all_secrets(&self) -> Result<SecretMap, sqlx::Error>;
    /// キー一覧を取得
    async fn list_secret_keys(&self) -> Result<Vec<String>, sqlx::Error>;
}

// ---------------------------------------------------------------------------
// PackageRepository
// ---------------------------------------------------------------------------

/// パッケージ要求操作のRepository trait
#[async_trait]
pub trait PackageRepository: Send + Sync {
    /// パッケージ要求を追加
    async fn add_package(&self, name: &str) -> Result<i64, sqlx::Error>;
    /// パッケージ要求一覧を取得
    async fn list_packages(&self) -> Result<Vec<PackageRequest>, sqlx::Error>;
}

// ---------------------------------------------------------------------------
// SqlitePool implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl EndpointRepository for SqlitePool {
    async fn create_endpoint(&self, endpoint: &Endpoint) -> Result<(), sqlx::Error> {
        super::endpoints::create_endpoint(self, endpoint).await
    }

    async fn upsert_endpoint(&self, name: &str, code: &str) -> Result<(), sqlx::Error> {
        super::endpoints::upsert_endpoint(self, name, code).await
    }

    async fn update_code(&self, name: &str, code: &str) -> Result<bool, sqlx::Error> {
        super::endpoints::update_code(self, name, code).await
    }

    async fn delete_endpoint(&self, name: &str) -> Result<bool, sqlx::Error> {
        super::endpoints::delete_endpoint(self, name).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Endpoint>, sqlx::Error> {
        super::endpoints::find_by_name(self, name).await
    }

    async fn list_endpoints(&self) -> Result<Vec<Endpoint>, sqlx::Error> {
        super::endpoints::list_endpoints(self).await
    }

    async fn list_names(&self) -> Result<Vec<String>, sqlx::Error> {
        super::endpoints::list_names(self).await
    }
}

#[async_trait]
impl SecretRepository for SqlitePool {
    async fn set_secret(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        super::secrets::set_secret(self, key, value).await
    }

    async fn delete_secret(&self, key: &str) -> Result<bool, sqlx::Error> {
        super::secrets::delete_secret(self, key).await
    }

    async fn find_secret(&self, key: &str) -> Result<Option<Secret>, sqlx::Error> {
        super::secrets::find_secret(self, key).await
    }

    async fn find_all_secrets(&self) -> Result<SecretMap, sqlx::Error> {
        super::secrets::find_all(self).await
    }

    async fn list_secret_keys(&self) -> Result<Vec<String>, sqlx::Error> {
        super::secrets::list_keys(self).await
    }
}

#[async_trait]
impl PackageRepository for SqlitePool {
    async fn add_package(&self, name: &str) -> Result<i64, sqlx::Error> {
        super::packages::add_package(self, name).await
    }

    async fn list_packages(&self) -> Result<Vec<PackageRequest>, sqlx::Error> {
        super::packages::list_packages(self).await
    }
}
