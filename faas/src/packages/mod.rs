//! ランタイムパッケージ同期
//!
//! 要求パッケージ一覧とホストにインストール済みのパッケージを比較し、
//! 不足分をホストのパッケージマネージャーでインストールする。

pub mod lock;
pub mod npm;
pub mod reconcile;

use async_trait::async_trait;

use crate::common::error::ReconcileFault;

pub use npm::NpmPackageManager;
pub use reconcile::{PassOutcome, PassReport, Reconciler};

/// ホストのパッケージマネージャー
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// インストール済みパッケージ名の一覧
    async fn list(&self) -> Result<Vec<String>, ReconcileFault>;

    /// パッケージを1つインストール
    async fn install(&self, name: &str) -> Result<(), ReconcileFault>;
}

/// 要求パッケージがインストール済みとみなせるか
///
/// インストール済みの名前のいずれかが要求名を部分文字列として含めば満たされる。
/// `pad` は `padding` でも満たされ、直接依存か推移的依存かも区別しない。
pub fn is_satisfied(desired: &str, installed: &[String]) -> bool {
    installed.iter().any(|name| name.contains(desired))
}

/// 要求名を正規化する
///
/// 前後の空白を除去し、空になった名前と同一パス内の重複を取り除く（順序は保持）。
pub fn normalize_desired<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .map(|name| name.as_ref().trim().to_string())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
