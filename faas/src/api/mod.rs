//! HTTPルーティング
//!
//! 管理用ルートは `/_faas` 配下に置き、それ以外はすべて Dispatcher に渡す。

pub mod dispatch;
pub mod error;
pub mod index;
pub mod packages;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// 管理用ルートのパス
pub const RECONCILE_PATH: &str = "/_faas/packages/reconcile";

/// アプリケーションのルーターを構築
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(index::list_endpoints).fallback(dispatch::dispatch_handler),
        )
        .route(RECONCILE_PATH, post(packages::reconcile))
        .fallback(dispatch::dispatch_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
