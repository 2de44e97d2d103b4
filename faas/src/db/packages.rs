//! インストール要求パッケージのデータベース操作
//!
//! 追記のみ。同名パッケージの重複登録は許容する。

use crate::common::types::PackageRequest;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// パッケージ要求を追加
pub async fn add_package(pool: &SqlitePool, name: &str) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO packages (name, requested_at) VALUES (?, ?)")
        .bind(name)
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// パッケージ要求一覧を登録順に取得
pub async fn list_packages(pool: &SqlitePool) -> Result<Vec<PackageRequest>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT id, name, requested_at FROM packages ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, requested_at)| PackageRequest {
            id,
            name,
            requested_at: DateTime::parse_from_rfc3339(&requested_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
        .collect())
}
