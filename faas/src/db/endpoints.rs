//! エンドポイントデータベース操作
//!
//! `name` の一意性は主キー制約で保証する。

use crate::common::types::Endpoint;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// エンドポイントを登録（同名が存在する場合は一意制約違反）
pub async fn create_endpoint(pool: &SqlitePool, endpoint: &Endpoint) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO endpoints (name, code, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&endpoint.name)
    .bind(&endpoint.code)
    .bind(endpoint.created_at.to_rfc3339())
    .bind(endpoint.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// エンドポイントを作成または置換
pub async fn upsert_endpoint(pool: &SqlitePool, name: &str, code: &str) -> Result<(), sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO endpoints (name, code, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(name) DO UPDATE SET
            code = excluded.code,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(name)
    .bind(code)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

/// 既存エンドポイントのコードを置換
///
/// 対象が存在しない場合は `false` を返す。
pub async fn update_code(pool: &SqlitePool, name: &str, code: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE endpoints SET code = ?, updated_at = ? WHERE name = ?")
        .bind(code)
        .bind(Utc::now().to_rfc3339())
        .bind(name)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// エンドポイントを削除
pub async fn delete_endpoint(pool: &SqlitePool, name: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM endpoints WHERE name = ?")
        .bind(name)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 名前でエンドポイントを検索
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Endpoint>, sqlx::Error> {
    let row = sqlx::query_as::<_, EndpointRow>(
        r#"
        SELECT name, code, created_at, updated_at
        FROM endpoints
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// エンドポイント一覧を取得
pub async fn list_endpoints(pool: &SqlitePool) -> Result<Vec<Endpoint>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EndpointRow>(
        r#"
        SELECT name, code, created_at, updated_at
        FROM endpoints
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// エンドポイント名のみを取得
pub async fn list_names(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT name FROM endpoints ORDER BY name")
        .fetch_all(pool)
        .await
}

#[derive(sqlx::FromRow)]
struct EndpointRow {
    name: String,
    code: String,
    created_at: String,
    updated_at: String,
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl From<EndpointRow> for Endpoint {
    fn from(row: EndpointRow) -> Self {
        Endpoint {
            created_at: parse_timestamp(&row.created_at),
            updated_at: parse_timestamp(&row.updated_at),
            name: row.name,
            code: row.code,
        }
    }
}
