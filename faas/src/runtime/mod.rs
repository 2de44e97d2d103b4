//! ハンドラー実行基盤
//!
//! 保存されたハンドラーソースを `(request, response, secrets)` の3引数で呼び出す。
//! コンパイル方式は `HandlerEngine` として差し替え可能で、既定は埋め込みJavaScriptエンジン。

pub mod boa;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::error::ExecutionFault;
use crate::common::types::SecretMap;

pub use boa::BoaEngine;

/// ハンドラーへ渡されるリクエスト
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HandlerRequest {
    /// HTTPメソッド
    pub method: String,
    /// クエリを除いたパス
    pub path: String,
    /// クエリを含む元のURL
    pub original_url: String,
    /// クエリパラメータ（同名キーは後勝ち）
    pub query: BTreeMap<String, String>,
    /// ヘッダー（小文字キー）
    pub headers: BTreeMap<String, String>,
    /// リクエストボディ（UTF-8として解釈できない部分は置換される）
    pub body: String,
    /// ディスパッチ先のエンドポイント名
    pub endpoint: String,
}

impl HandlerRequest {
    /// メソッドとURL（パス＋クエリ）から作成
    pub fn new(method: impl Into<String>, original_url: impl Into<String>) -> Self {
        let original_url = original_url.into();
        let (path, query) = match original_url.split_once('?') {
            Some((path, query)) => (path.to_string(), parse_query(query)),
            None => (original_url.clone(), BTreeMap::new()),
        };
        let endpoint = endpoint_segment(&path).to_string();

        Self {
            method: method.into(),
            path,
            original_url,
            query,
            headers: BTreeMap::new(),
            body: String::new(),
            endpoint,
        }
    }

    /// ヘッダーを追加
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// ボディを設定
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// パスの先頭セグメントを返す（`/hello/x` → `hello`、`/` → 空）
pub fn endpoint_segment(path: &str) -> &str {
    path.split('/').nth(1).unwrap_or_default()
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(query)
        .map(|pairs| pairs.into_iter().collect())
        .unwrap_or_default()
}

/// ハンドラーが書き込むレスポンス
///
/// ステータス・ヘッダー・ボディをどう設定し、いつ完了させるかはハンドラーが決める。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSink {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    finished: bool,
}

impl Default for ResponseSink {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
            finished: false,
        }
    }
}

impl ResponseSink {
    /// ステータスコード
    pub fn status(&self) -> u16 {
        self.status
    }

    /// ステータスコードを設定
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// ヘッダーを設定（同名は大文字小文字を区別せず置換）
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    /// ヘッダーを取得
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// 全ヘッダー
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// ボディ
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// ボディを置換
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// レスポンスを完了済みにする
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// ハンドラーがレスポンスを完了させたか
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// ハンドラーのコンパイル方式
pub trait HandlerEngine: Send + Sync {
    /// ソースをコンパイルして呼び出し可能なハンドラーを返す
    fn compile(&self, name: &str, code: &str) -> Result<Box<dyn CompiledHandler>, ExecutionFault>;
}

/// コンパイル済みハンドラー
pub trait CompiledHandler {
    /// ハンドラーを1回呼び出す
    fn invoke(
        &mut self,
        request: &HandlerRequest,
        response: &mut ResponseSink,
        secrets: &SecretMap,
    ) -> Result<(), ExecutionFault>;
}

/// コンパイルから呼び出しまでを1回分実行する
///
/// 同期的に実行されるため、非同期コンテキストからは `spawn_blocking` 経由で呼ぶこと。
pub fn run_handler(
    engine: &dyn HandlerEngine,
    name: &str,
    code: &str,
    request: &HandlerRequest,
    secrets: &SecretMap,
) -> Result<ResponseSink, ExecutionFault> {
    let mut handler = engine.compile(name, code)?;
    let mut response = ResponseSink::default();
    handler.invoke(request, &mut response, secrets)?;
    Ok(response)
}
