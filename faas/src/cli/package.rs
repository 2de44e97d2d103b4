//! package サブコマンド
//!
//! 要求パッケージを追加する。実際のインストールは稼働中サーバーの同期ループが行う。

use clap::{Args, Subcommand};

use crate::registry::PackageRegistry;

/// package サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct PackageArgs {
    /// Package operation
    #[command(subcommand)]
    pub command: PackageCommand,
}

/// パッケージ操作
#[derive(Subcommand, Debug, Clone)]
pub enum PackageCommand {
    /// Request a package to be installed on the host
    Install {
        /// Package name
        name: String,
    },
    /// List requested packages
    List,
}

/// Execute the package command
pub async fn execute(args: &PackageArgs) -> anyhow::Result<()> {
    let pool = super::open_database().await?;
    let registry = PackageRegistry::from_pool(pool);
    for line in run(&registry, &args.command).await? {
        println!("{line}");
    }
    Ok(())
}

/// コマンドを実行し、表示する行を返す
pub async fn run(registry: &PackageRegistry, command: &PackageCommand) -> anyhow::Result<Vec<String>> {
    match command {
        PackageCommand::Install { name } => {
            registry.add(name).await?;
            Ok(vec![format!(
                "Package \"{}\" requested. It will be installed on the next reconcile pass.",
                name.trim()
            )])
        }
        PackageCommand::List => Ok(registry
            .list()
            .await?
            .into_iter()
            .map(|p| format!("{}\t{}", p.name, p.requested_at.to_rfc3339()))
            .collect()),
    }
}
