//! データモデル
//!
//! 永続化される3種類のレコード（エンドポイント・シークレット・要求パッケージ）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// ハンドラー呼び出しごとに注入されるシークレットの集合
pub type SecretMap = BTreeMap<String, String>;

/// 管理用ルートのプレフィックス（エンドポイント名として使用不可）
pub const RESERVED_PREFIX: &str = "_faas";

/// エンドポイント
///
/// `code` はハンドラー1つ分の完全なソース。更新時は丸ごと置き換える。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Endpoint {
    /// 一意な名前（URLパスの先頭セグメント）
    pub name: String,
    /// ハンドラーのソースコード
    pub code: String,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 最終更新日時
    pub updated_at: DateTime<Utc>,
}

impl Endpoint {
    /// 新しいエンドポイントを作成
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            code: code.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// `endpoint create` で登録されるデフォルトのハンドラー
    pub fn default_code(name: &str) -> String {
        format!(
            "module.exports = function (req, res) {{ res.send('Hello {}!') }}",
            name.replace('\\', "\\\\").replace('\'', "\\'")
        )
    }
}

/// シークレット
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Secret {
    /// 一意なキー
    pub key: String,
    /// 値
    pub value: String,
}

/// インストール要求パッケージ
///
/// 追記のみ。同名の要求も重複排除せずに保存する。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageRequest {
    /// 行ID
    pub id: i64,
    /// パッケージ名（前後の空白は同期時にトリムされる）
    pub name: String,
    /// 要求日時
    pub requested_at: DateTime<Utc>,
}

/// エンドポイント名を検証する
///
/// 空文字・`/` を含む名前・管理用プレフィックスで始まる名前は拒否する。
pub fn validate_endpoint_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Please give a name for the endpoint.".to_string());
    }
    if name.contains('/') {
        return Err(format!("Endpoint name must be a single path segment: {name}"));
    }
    if name.starts_with(RESERVED_PREFIX) {
        return Err(format!("Endpoint names starting with '{RESERVED_PREFIX}' are reserved"));
    }
    Ok(())
}
