//! 共通型定義
//!
//! レジストリ・Dispatcher・同期ループで共有するデータ型とエラー型

/// エラー型
pub mod error;

/// データモデル
pub mod types;
