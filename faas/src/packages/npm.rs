//! npmアダプター
//!
//! 設定されたコマンド（既定 `npm`）をパッケージディレクトリでサブプロセスとして実行する。
//! npmは `package.json` のある祖先ディレクトリまで遡ってプロジェクトを探すため、
//! パッケージディレクトリには専用の `package.json` を置く。

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::lock::InstallLock;
use super::PackageManager;
use crate::common::error::ReconcileFault;

/// パッケージディレクトリに置く `package.json`
const MANIFEST: &str = "{\n  \"name\": \"faas-packages\",\n  \"private\": true\n}\n";

/// npmによるパッケージマネージャー
#[derive(Debug, Clone)]
pub struct NpmPackageManager {
    command: String,
    dir: PathBuf,
}

impl NpmPackageManager {
    /// コマンド名とパッケージディレクトリを指定して作成
    pub fn new(command: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            dir: dir.into(),
        }
    }

    /// パッケージディレクトリ
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// パッケージディレクトリと `package.json` を用意する（既存の `package.json` は触らない）
    async fn prepare_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let manifest = self.dir.join("package.json");
        if !tokio::fs::try_exists(&manifest).await? {
            debug!(path = %manifest.display(), "Writing package manifest");
            tokio::fs::write(&manifest, MANIFEST).await?;
        }
        Ok(())
    }

    async fn run(&self, args: &[&str]) -> std::io::Result<Output> {
        self.prepare_dir().await?;
        debug!(command = %self.command, ?args, dir = %self.dir.display(), "Running package manager");
        Command::new(&self.command)
            .args(args)
            .current_dir(&self.dir)
            .kill_on_drop(true)
            .output()
            .await
    }
}

#[async_trait]
impl PackageManager for NpmPackageManager {
    async fn list(&self) -> Result<Vec<String>, ReconcileFault> {
        let output = self
            .run(&["ls", "--depth=0", "--json"])
            .await
            .map_err(|e| ReconcileFault::List(format!("{}: {}", self.command, e)))?;

        // `npm ls` は依存関係に問題があると非ゼロで終了するが、JSONは出力する
        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_ls_output(&stdout) {
            Ok(names) => Ok(names),
            Err(_) if !output.status.success() => Err(ReconcileFault::List(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
            Err(e) => Err(e),
        }
    }

    async fn install(&self, name: &str) -> Result<(), ReconcileFault> {
        let _lock = InstallLock::acquire(&self.dir).await?;

        let output = self
            .run(&["install", "--no-save", "--no-progress", "--silent", name])
            .await
            .map_err(|e| ReconcileFault::Install {
                name: name.to_string(),
                reason: format!("{}: {}", self.command, e),
            })?;

        if !output.status.success() {
            return Err(ReconcileFault::Install {
                name: name.to_string(),
                reason: format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        info!(package = %name, "Package installed");
        Ok(())
    }
}

/// `npm ls --depth=0 --json` の出力から直接依存の名前を取り出す
pub fn parse_ls_output(stdout: &str) -> Result<Vec<String>, ReconcileFault> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: serde_json::Value = serde_json::from_str(stdout)
        .map_err(|e| ReconcileFault::List(format!("invalid ls output: {e}")))?;

    Ok(value
        .get("dependencies")
        .and_then(|deps| deps.as_object())
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default())
}
