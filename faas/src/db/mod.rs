//! データベースアクセス層
//!
//! SQLiteベースのデータ永続化

/// エンドポイント（ハンドラーソース）
pub mod endpoints;

/// シークレット
pub mod secrets;

/// インストール要求パッケージ
pub mod packages;

/// データベースマイグレーション
pub mod migrations;

/// Repository traitパターン（テスタビリティ向上）
pub mod traits;
