//! レジストリ
//!
//! エンドポイント・シークレット・要求パッケージの永続化層を
//! ドメインエラー（`FaasError`）で包んだ操作として公開する。
//! Dispatcher と同期ループは読み取りのみ行い、変更はオーサリング操作に限られる。

pub mod endpoints;
pub mod packages;
pub mod secrets;

pub use endpoints::EndpointRegistry;
pub use packages::PackageRegistry;
pub use secrets::SecretRegistry;

use crate::common::error::FaasError;

/// sqlxエラーを `FaasError` に変換
///
/// SQL文や制約名などの詳細は `Database` 側に保持し、外部には出さない。
pub(crate) fn db_error(err: sqlx::Error) -> FaasError {
    FaasError::Database(err.to_string())
}

/// 一意制約違反かどうか
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
