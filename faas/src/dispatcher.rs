//! リクエストディスパッチャー
//!
//! パスの先頭セグメントでエンドポイントを引き、シークレットを注入してハンドラーを実行する。
//! コンパイル・実行時の障害はここで1度だけ捕捉し、詳細はログにのみ出力する。

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::common::error::{ExecutionFault, FaasError, FaasResult};
use crate::config::ExecutionConfig;
use crate::registry::{EndpointRegistry, SecretRegistry};
use crate::runtime::{endpoint_segment, run_handler, BoaEngine, HandlerEngine, HandlerRequest, ResponseSink};

/// ディスパッチャー
#[derive(Clone)]
pub struct Dispatcher {
    endpoints: EndpointRegistry,
    secrets: SecretRegistry,
    engine: Arc<dyn HandlerEngine>,
    config: ExecutionConfig,
}

impl Dispatcher {
    /// 任意のエンジンで作成
    pub fn new(
        endpoints: EndpointRegistry,
        secrets: SecretRegistry,
        engine: Arc<dyn HandlerEngine>,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            endpoints,
            secrets,
            engine,
            config,
        }
    }

    /// 既定のJavaScriptエンジンで作成
    ///
    /// ハンドラーの `require` は `packages_dir` の `node_modules` から解決する。
    pub fn with_boa(
        endpoints: EndpointRegistry,
        secrets: SecretRegistry,
        config: ExecutionConfig,
        packages_dir: &Path,
    ) -> Self {
        let engine = BoaEngine::new()
            .with_loop_iteration_limit(config.loop_iteration_limit)
            .with_packages_dir(packages_dir);
        Self::new(endpoints, secrets, Arc::new(engine), config)
    }

    /// 実行設定
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// リクエストをエンドポイントへディスパッチする
    ///
    /// ハンドラーのソースはディスパッチごとにコンパイルし直す（キャッシュしない）。
    /// 期限が設定されている場合、超過した呼び出しは待つのをやめて `Timeout` を返すが、
    /// 実行中のハンドラー自体は止まらない。
    pub async fn dispatch(&self, mut request: HandlerRequest) -> FaasResult<ResponseSink> {
        let name = endpoint_segment(&request.path).to_string();
        if name.is_empty() {
            debug!(path = %request.path, "Empty endpoint");
            return Err(FaasError::EmptyEndpoint);
        }

        let Some(endpoint) = self.endpoints.find(&name).await? else {
            debug!(endpoint = %name, "No such endpoint");
            return Err(FaasError::UnknownEndpoint(name));
        };
        let secrets = self.secrets.find_all().await?;

        let request_id = Uuid::new_v4();
        info!(
            request_id = %request_id,
            endpoint = %name,
            path = %request.path,
            method = %request.method,
            "Running endpoint"
        );
        request.endpoint = name.clone();

        let engine = Arc::clone(&self.engine);
        let task = tokio::task::spawn_blocking(move || {
            run_handler(
                engine.as_ref(),
                &endpoint.name,
                &endpoint.code,
                &request,
                &secrets,
            )
        });

        let joined = match self.config.timeout {
            Some(deadline) => match tokio::time::timeout(deadline, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(
                        request_id = %request_id,
                        endpoint = %name,
                        timeout_ms = deadline.as_millis() as u64,
                        "Endpoint timed out"
                    );
                    return Err(FaasError::Timeout(name));
                }
            },
            None => task.await,
        };

        joined
            .unwrap_or_else(|join_err| Err(ExecutionFault::Aborted(join_err.to_string())))
            .map_err(|fault| {
                error!(request_id = %request_id, endpoint = %name, error = %fault, "Error in endpoint");
                FaasError::Execution {
                    endpoint: name,
                    fault,
                }
            })
    }
}
