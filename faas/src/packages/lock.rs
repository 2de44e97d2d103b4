//! パッケージインストールのホスト間排他制御
//!
//! 同じパッケージディレクトリを共有する複数プロセスが
//! パッケージマネージャーを同時に実行しないよう、fs2のファイルロックを使う。

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::common::error::ReconcileFault;

/// ロックファイル名
pub const LOCK_FILE_NAME: &str = ".faas-install.lock";

/// インストールロック
///
/// RAIIパターンでロック解除を保証する。
pub struct InstallLock {
    file: File,
    path: PathBuf,
}

impl std::fmt::Debug for InstallLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallLock").field("path", &self.path).finish()
    }
}

impl InstallLock {
    /// ロックを取得する（他プロセスが保持中なら解放まで待つ）
    pub async fn acquire(dir: &Path) -> Result<Self, ReconcileFault> {
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || Self::acquire_blocking(&dir))
            .await
            .map_err(|e| ReconcileFault::Lock(e.to_string()))?
    }

    fn acquire_blocking(dir: &Path) -> Result<Self, ReconcileFault> {
        std::fs::create_dir_all(dir).map_err(|e| ReconcileFault::Lock(e.to_string()))?;

        let path = dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| ReconcileFault::Lock(format!("{}: {}", path.display(), e)))?;

        file.lock_exclusive()
            .map_err(|e| ReconcileFault::Lock(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Install lock acquired");

        Ok(Self { file, path })
    }

    /// ロックファイルのパス
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "Failed to release install lock");
        }
    }
}
