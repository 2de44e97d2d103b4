//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! 呼び出し元へ返すメッセージは `external_message()` を使い、
//! 詳細（ハンドラーの例外内容、SQLエラー等）はサーバーログにのみ出力する。

use axum::http::StatusCode;
use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation error (missing or malformed argument)
    #[error("Validation error: {0}")]
    Validation(String),
}

/// ハンドラーのコンパイル・実行時に発生した障害
///
/// Dispatcher の境界で一度だけ捕捉され、呼び出し元には汎用メッセージのみ返る。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecutionFault {
    /// ソースのパース・評価に失敗
    #[error("compile error: {0}")]
    Compile(String),

    /// `module.exports` が関数ではない
    #[error("handler does not export a function (got {0})")]
    NotAFunction(String),

    /// ハンドラー実行中の例外（Promise の reject を含む）
    #[error("runtime error: {0}")]
    Runtime(String),

    /// エンジン側のパニック・ワーカー異常終了
    #[error("handler worker aborted: {0}")]
    Aborted(String),

    /// レスポンスシンクの内容を読み取れない
    #[error("invalid response state: {0}")]
    InvalidResponse(String),

    /// リクエスト・シークレットをハンドラーへ渡す形に変換できない
    #[error("invalid handler input: {0}")]
    InvalidInput(String),
}

/// パッケージ同期ループの障害
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReconcileFault {
    /// 要求パッケージ一覧の読み取りに失敗
    #[error("failed to read desired packages: {0}")]
    Registry(String),

    /// インストール済みパッケージ一覧の取得に失敗
    #[error("failed to list installed packages: {0}")]
    List(String),

    /// 単一パッケージのインストールに失敗
    #[error("failed to install package {name}: {reason}")]
    Install {
        /// パッケージ名
        name: String,
        /// 失敗理由
        reason: String,
    },

    /// ホスト側ロックの取得に失敗
    #[error("failed to acquire install lock: {0}")]
    Lock(String),
}

/// faas error type
#[derive(Debug, Error)]
pub enum FaasError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Resource not found (endpoint/secret)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation on create
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// リクエストパスの先頭セグメントが空
    #[error("Empty endpoint")]
    EmptyEndpoint,

    /// 該当するエンドポイントが存在しない
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// ハンドラーのコンパイル・実行障害
    #[error("Execution fault in endpoint {endpoint}: {fault}")]
    Execution {
        /// エンドポイント名
        endpoint: String,
        /// 障害内容
        fault: ExecutionFault,
    },

    /// ハンドラーが期限内に完了しなかった
    #[error("Endpoint {0} timed out")]
    Timeout(String),

    /// パッケージ同期の障害
    #[error(transparent)]
    Reconcile(#[from] ReconcileFault),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FaasError {
    /// Returns a safe error message for external clients.
    ///
    /// Handler faults and database errors never reach the caller in detail;
    /// use the `Display` implementation in server logs instead.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Common(CommonError::Validation(_)) => "Invalid request.",
            Self::Common(_) => "Request error.",
            Self::NotFound(_) => "Not found.",
            Self::Duplicate(_) => "Names must be unique.",
            Self::EmptyEndpoint => "Empty endpoint.",
            Self::UnknownEndpoint(_) => "No such endpoint.",
            Self::Execution { .. } => "Internal server error.",
            Self::Timeout(_) => "Endpoint timed out.",
            Self::Reconcile(_) => "Package reconciliation failed.",
            Self::Database(_) => "Internal server error.",
            Self::Internal(_) => "Internal server error.",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Common(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Duplicate(_) => StatusCode::CONFLICT,
            Self::EmptyEndpoint => StatusCode::BAD_REQUEST,
            Self::UnknownEndpoint(_) => StatusCode::BAD_REQUEST,
            Self::Execution { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Reconcile(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Validation error shortcut
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Common(CommonError::Validation(message.into()))
    }
}

/// Result type alias (Common)
pub type CommonResult<T> = Result<T, CommonError>;

/// Result type alias (faas)
pub type FaasResult<T> = Result<T, FaasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_error_display() {
        let error = CommonError::Config("test config error".to_string());
        assert_eq!(error.to_string(), "Configuration error: test config error");
    }

    #[test]
    fn test_error_from_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let common_error: CommonError = json_error.into();
        assert!(matches!(common_error, CommonError::Serialization(_)));
    }

    #[test]
    fn test_dispatch_errors_map_to_bad_request() {
        assert_eq!(FaasError::EmptyEndpoint.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(FaasError::EmptyEndpoint.external_message(), "Empty endpoint.");

        let unknown = FaasError::UnknownEndpoint("nope".to_string());
        assert_eq!(unknown.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(unknown.external_message(), "No such endpoint.");
    }

    #[test]
    fn test_execution_fault_is_not_leaked() {
        let error = FaasError::Execution {
            endpoint: "hello".to_string(),
            fault: ExecutionFault::Runtime("TypeError: secret-token is undefined".to_string()),
        };
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.external_message(), "Internal server error.");
        // 詳細はDisplay（ログ用）にのみ含まれる
        assert!(error.to_string().contains("secret-token"));
        assert!(!error.external_message().contains("secret-token"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            FaasError::validation("name is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            FaasError::NotFound("endpoint".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            FaasError::Duplicate("endpoint".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            FaasError::Timeout("slow".to_string()).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            FaasError::Database("locked".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_reconcile_fault_display() {
        let fault = ReconcileFault::Install {
            name: "left-pad".to_string(),
            reason: "exit status 1".to_string(),
        };
        assert_eq!(
            fault.to_string(),
            "failed to install package left-pad: exit status 1"
        );
        let err: FaasError = fault.into();
        assert!(matches!(err, FaasError::Reconcile(_)));
    }
}
