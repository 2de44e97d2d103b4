//! 埋め込みJavaScriptエンジン（boa）によるハンドラー実行
//!
//! ディスパッチごとに新しい `Context` を作成し、CommonJS形式
//! （`module.exports = function (req, res, secrets) { ... }`）のソースを評価する。
//! リクエストとシークレットはJSONとして渡し、レスポンスはJSONスナップショットで読み戻す。
//! `require` はパッケージディレクトリの `node_modules` からCommonJSモジュールを読み込む。

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use boa_engine::{native_function::NativeFunction, Context, JsResult, JsString, JsValue, Source};
use serde::Deserialize;

use super::{CompiledHandler, HandlerEngine, HandlerRequest, ResponseSink};
use crate::common::error::ExecutionFault;
use crate::common::types::SecretMap;

const PRELUDE: &str = include_str!("prelude.js");

/// boaベースのハンドラーエンジン
#[derive(Debug, Clone, Default)]
pub struct BoaEngine {
    loop_iteration_limit: Option<u64>,
    module_root: Option<PathBuf>,
}

impl BoaEngine {
    /// 新しいエンジンを作成（ループ回数制限なし）
    pub fn new() -> Self {
        Self::default()
    }

    /// ループ回数制限を設定
    pub fn with_loop_iteration_limit(mut self, limit: Option<u64>) -> Self {
        self.loop_iteration_limit = limit;
        self
    }

    /// `require` の解決先となるパッケージディレクトリを設定
    ///
    /// パッケージ名は `<dir>/node_modules/<name>` として解決する。
    pub fn with_packages_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.module_root = Some(dir.as_ref().join("node_modules"));
        self
    }
}

impl HandlerEngine for BoaEngine {
    fn compile(&self, name: &str, code: &str) -> Result<Box<dyn CompiledHandler>, ExecutionFault> {
        let mut ctx = Context::default();
        if let Some(limit) = self.loop_iteration_limit {
            ctx.runtime_limits_mut().set_loop_iteration_limit(limit);
        }
        if let Some(root) = &self.module_root {
            ctx.register_global_callable(
                JsString::from("__faas_load"),
                2,
                NativeFunction::from_copy_closure_with_captures(load_module, root.clone()),
            )
            .map_err(|e| ExecutionFault::Aborted(format!("module loader registration failed: {e}")))?;
        }

        ctx.eval(Source::from_bytes(PRELUDE))
            .map_err(|e| ExecutionFault::Aborted(format!("prelude evaluation failed: {e}")))?;

        let wrapped = format!("(function (module, exports, require) {{\n{code}\n}})(module, exports, require);");
        ctx.eval(Source::from_bytes(&wrapped))
            .map_err(|e| ExecutionFault::Compile(e.to_string()))?;

        let kind = eval_string(&mut ctx, "typeof module.exports")
            .map_err(ExecutionFault::Compile)?;
        if kind != "function" {
            return Err(ExecutionFault::NotAFunction(kind));
        }

        tracing::trace!(endpoint = %name, "Handler compiled");
        Ok(Box::new(BoaHandler { ctx }))
    }
}

/// コンパイル済みのboaハンドラー
struct BoaHandler {
    ctx: Context,
}

/// prelude側のレスポンス状態
#[derive(Debug, Deserialize)]
struct Snapshot {
    status: Option<f64>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    body: Option<String>,
    #[serde(default)]
    finished: bool,
    fault: Option<String>,
}

impl CompiledHandler for BoaHandler {
    fn invoke(
        &mut self,
        request: &HandlerRequest,
        response: &mut ResponseSink,
        secrets: &SecretMap,
    ) -> Result<(), ExecutionFault> {
        let request_json = js_string_literal(request)?;
        let secrets_json = js_string_literal(secrets)?;
        let call = format!(
            "__faas.invoke(JSON.parse({request_json}), JSON.parse({secrets_json}));"
        );

        let invoked = self
            .ctx
            .eval(Source::from_bytes(&call))
            .map(|_| ())
            .map_err(|e| ExecutionFault::Runtime(e.to_string()));
        // 非同期ハンドラーのPromiseジョブを消化
        let _ = self.ctx.run_jobs();
        invoked?;

        let raw = eval_string(&mut self.ctx, "__faas.snapshot()")
            .map_err(ExecutionFault::InvalidResponse)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)
            .map_err(|e| ExecutionFault::InvalidResponse(e.to_string()))?;

        if let Some(fault) = snapshot.fault {
            return Err(ExecutionFault::Runtime(fault));
        }
        apply_snapshot(snapshot, response)
    }
}

fn apply_snapshot(snapshot: Snapshot, response: &mut ResponseSink) -> Result<(), ExecutionFault> {
    let status = match snapshot.status {
        None => 200,
        Some(code) if code.fract() == 0.0 && (100.0..=999.0).contains(&code) => code as u16,
        Some(code) => {
            return Err(ExecutionFault::InvalidResponse(format!(
                "invalid status code {code}"
            )))
        }
    };
    response.set_status(status);
    for (name, value) in snapshot.headers {
        response.set_header(&name, value);
    }
    if let Some(body) = snapshot.body {
        response.set_body(body);
    }
    if snapshot.finished {
        response.finish();
    }
    Ok(())
}

/// 値をJSON化し、さらにJavaScriptの文字列リテラルとして埋め込める形にする
fn js_string_literal<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, ExecutionFault> {
    serde_json::to_string(value)
        .and_then(|json| serde_json::to_string(&json))
        .map_err(|e| ExecutionFault::InvalidInput(e.to_string()))
}

/// `__faas_load(specifier, fromDir)`
///
/// 解決できたモジュールを `{filename, dirname, source, json}` のJSON文字列で返し、
/// 見つからなければ `undefined` を返す。
#[allow(clippy::ptr_arg)]
fn load_module(
    _this: &JsValue,
    args: &[JsValue],
    root: &PathBuf,
    _ctx: &mut Context,
) -> JsResult<JsValue> {
    let Some(specifier) = args
        .first()
        .and_then(JsValue::as_string)
        .map(|s| s.to_std_string_escaped())
    else {
        return Ok(JsValue::undefined());
    };
    let from = args
        .get(1)
        .and_then(JsValue::as_string)
        .map(|s| PathBuf::from(s.to_std_string_escaped()));

    let Some(filename) = resolve_module(root, &specifier, from.as_deref()) else {
        return Ok(JsValue::undefined());
    };
    let filename = std::fs::canonicalize(&filename).unwrap_or(filename);
    let source = match std::fs::read_to_string(&filename) {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!(module = %filename.display(), error = %e, "Failed to read module");
            return Ok(JsValue::undefined());
        }
    };

    let dirname = filename.parent().map(Path::to_path_buf).unwrap_or_default();
    let loaded = serde_json::json!({
        "filename": filename.to_string_lossy(),
        "dirname": dirname.to_string_lossy(),
        "source": source,
        "json": filename.extension().is_some_and(|ext| ext == "json"),
    });
    Ok(JsValue::from(JsString::from(loaded.to_string())))
}

/// `require` の指定子をファイルへ解決する
///
/// `./` `../` で始まる指定子は要求元モジュールのディレクトリから、それ以外は `root` から探す。
/// パッケージ名に `..` を含むものは解決しない。
pub(crate) fn resolve_module(root: &Path, specifier: &str, from: Option<&Path>) -> Option<PathBuf> {
    let relative = specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../");

    let base = if relative {
        from?.join(specifier)
    } else {
        let path = Path::new(specifier);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if specifier.is_empty() || escapes {
            return None;
        }
        root.join(path)
    };

    resolve_file(&base).or_else(|| resolve_directory(&base))
}

fn resolve_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    ["js", "json"].into_iter().find_map(|ext| {
        let mut candidate = path.as_os_str().to_owned();
        candidate.push(".");
        candidate.push(ext);
        let candidate = PathBuf::from(candidate);
        candidate.is_file().then_some(candidate)
    })
}

fn resolve_directory(dir: &Path) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }
    let main = std::fs::read_to_string(dir.join("package.json"))
        .ok()
        .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).ok())
        .and_then(|manifest| manifest.get("main")?.as_str().map(str::to_string));
    if let Some(main) = main {
        let entry = dir.join(main);
        if let Some(found) = resolve_file(&entry).or_else(|| index_file(&entry)) {
            return Some(found);
        }
    }
    index_file(dir)
}

fn index_file(dir: &Path) -> Option<PathBuf> {
    ["index.js", "index.json"]
        .into_iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

fn eval_string(ctx: &mut Context, source: &str) -> Result<String, String> {
    let value: JsValue = ctx
        .eval(Source::from_bytes(source))
        .map_err(|e| e.to_string())?;
    value
        .to_string(ctx)
        .map(|s| s.to_std_string_escaped())
        .map_err(|e| e.to_string())
}
