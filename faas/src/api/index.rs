//! フロントページ（エンドポイント一覧）

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::error::AppError;
use crate::AppState;

/// `GET /` のレスポンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointIndex {
    /// 登録済みエンドポイント名
    pub endpoints: Vec<String>,
}

/// GET / - エンドポイント名一覧
pub async fn list_endpoints(State(state): State<AppState>) -> Result<Json<EndpointIndex>, AppError> {
    let endpoints = state.endpoints.list_names().await?;
    Ok(Json(EndpointIndex { endpoints }))
}
