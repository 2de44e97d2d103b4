//! secret サブコマンド

use anyhow::Context;
use clap::{Args, Subcommand};

use crate::registry::SecretRegistry;

/// secret サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct SecretArgs {
    /// Secret operation
    #[command(subcommand)]
    pub command: SecretCommand,
}

/// シークレット操作
#[derive(Subcommand, Debug, Clone)]
pub enum SecretCommand {
    /// Set a secret key value pair
    Set {
        /// Secret key
        key: String,
        /// Secret value
        value: String,
    },
    /// Remove a secret
    Remove {
        /// Secret key
        key: String,
    },
    /// List secret keys (values are not shown)
    List,
}

/// Execute the secret command
pub async fn execute(args: &SecretArgs) -> anyhow::Result<()> {
    let pool = super::open_database().await?;
    let registry = SecretRegistry::from_pool(pool);
    for line in run(&registry, &args.command).await? {
        println!("{line}");
    }
    Ok(())
}

/// コマンドを実行し、表示する行を返す
pub async fn run(registry: &SecretRegistry, command: &SecretCommand) -> anyhow::Result<Vec<String>> {
    match command {
        SecretCommand::Set { key, value } => {
            registry
                .set(key, value)
                .await
                .with_context(|| format!("Failed to set secret {key}!"))?;
            Ok(vec![format!("Secret \"{key}\" set successfully.")])
        }
        SecretCommand::Remove { key } => {
            registry
                .remove(key)
                .await
                .with_context(|| format!("Failed to remove secret {key}!"))?;
            Ok(vec![format!("Secret \"{key}\" removed.")])
        }
        SecretCommand::List => Ok(registry.list_keys().await?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db_pool;

    #[tokio::test]
    async fn test_list_never_prints_values() {
        let registry = SecretRegistry::from_pool(test_db_pool().await);
        run(
            &registry,
            &SecretCommand::Set {
                key: "API_KEY".into(),
                value: "hunter2".into(),
            },
        )
        .await
        .unwrap();

        let lines = run(&registry, &SecretCommand::List).await.unwrap();
        assert_eq!(lines, vec!["API_KEY"]);
        assert!(lines.iter().all(|line| !line.contains("hunter2")));
    }
}
