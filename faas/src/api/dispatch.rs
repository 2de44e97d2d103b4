//! エンドポイント呼び出しルート
//!
//! `ALL /{endpoint}[/*]` を Dispatcher に渡し、ハンドラーが書き込んだ内容をそのまま返す。

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::common::error::FaasError;
use crate::runtime::{HandlerRequest, ResponseSink};
use crate::AppState;

/// すべての未定義ルートを受けるディスパッチハンドラー
pub async fn dispatch_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = build_request(&method, &uri, &headers, &body);
    match state.dispatcher.dispatch(request).await {
        Ok(sink) => sink_to_response(sink),
        Err(err) => error_response(err),
    }
}

/// axumのリクエストを `HandlerRequest` に変換
pub fn build_request(method: &Method, uri: &Uri, headers: &HeaderMap, body: &[u8]) -> HandlerRequest {
    let original_url = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
        .fold(HandlerRequest::new(method.as_str(), original_url), |req, (name, value)| {
            req.with_header(name, value)
        })
        .with_body(String::from_utf8_lossy(body))
}

/// ディスパッチ失敗をプレーンテキストの応答に変換
///
/// 呼び出し元には汎用メッセージのみ返す。
pub fn error_response(err: FaasError) -> Response {
    if matches!(err, FaasError::Database(_) | FaasError::Internal(_)) {
        tracing::error!(error = %err, "Dispatch failed");
    }
    (err.status_code(), err.external_message()).into_response()
}

/// ハンドラーが書き込んだレスポンスをHTTPレスポンスに変換
///
/// ハンドラーが完了させなかった場合も、記録された状態をそのまま送る。
pub fn sink_to_response(sink: ResponseSink) -> Response {
    let status = StatusCode::from_u16(sink.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = Response::new(Body::from(sink.body().to_vec()));
    *response.status_mut() = status;

    for (name, value) in sink.headers() {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => warn!(header = %name, "Dropping invalid response header from handler"),
        }
    }
    response
}
