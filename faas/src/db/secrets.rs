//! シークレットデータベース操作

use crate::common::types::{Secret, SecretMap};
use chrono::Utc;
use sqlx::SqlitePool;

/// シークレットを設定（存在する場合は上書き）
pub async fn set_secret(pool: &SqlitePool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO secrets (key, value, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// シークレットを削除
pub async fn delete_secret(pool: &SqlitePool, key: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM secrets WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// キーでシークレットを取得
pub async fn find_secret(pool: &SqlitePool, key: &str) -> Result<Option<Secret>, sqlx::Error> {
    let row = sqlx::query_as::<_, (String, String)>("SELECT key, value FROM secrets WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(key, value)| Secret { key, value }))
}

/// 全シークレットをマップとして取得
pub async fn find_all(pool: &SqlitePool) -> Result<SecretMap, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, String)>("SELECT key, value FROM secrets")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().collect())
}

/// キー一覧を取得（値は含めない）
pub async fn list_keys(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT key FROM secrets ORDER BY key")
        .fetch_all(pool)
        .await
}
