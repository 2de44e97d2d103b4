//! パッケージ同期の手動トリガー

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::error::AppError;
use crate::common::error::FaasError;
use crate::packages::PassOutcome;
use crate::AppState;

/// POST /_faas/packages/reconcile - 同期パスを1回実行
///
/// 実行中のパスがある場合はキューに積まず 409 を返す。
pub async fn reconcile(State(state): State<AppState>) -> Result<Response, AppError> {
    match state.reconciler.run_pass().await {
        Ok(PassOutcome::Completed(report)) => Ok((StatusCode::ACCEPTED, Json(report)).into_response()),
        Ok(PassOutcome::Skipped) => Ok((
            StatusCode::CONFLICT,
            Json(json!({ "error": "Package reconciliation already in progress." })),
        )
            .into_response()),
        Err(fault) => Err(AppError(FaasError::Reconcile(fault))),
    }
}
