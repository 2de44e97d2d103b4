//! endpoint サブコマンド
//!
//! エンドポイントの作成・削除・一覧・コードのアップロード。

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};

use crate::common::error::FaasError;
use crate::common::types::Endpoint;
use crate::registry::EndpointRegistry;

/// endpoint サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct EndpointArgs {
    /// Endpoint operation
    #[command(subcommand)]
    pub command: EndpointCommand,
}

/// エンドポイント操作
#[derive(Subcommand, Debug, Clone)]
pub enum EndpointCommand {
    /// Create a new endpoint with a greeting handler
    Create {
        /// Endpoint name
        name: String,
    },
    /// Remove an endpoint
    Remove {
        /// Endpoint name
        name: String,
    },
    /// List all endpoints
    List,
    /// Upload a handler file to an existing endpoint
    Upload {
        /// Handler source file
        file: PathBuf,
        /// Endpoint name
        endpoint: String,
    },
}

/// Execute the endpoint command
pub async fn execute(args: &EndpointArgs) -> anyhow::Result<()> {
    let pool = super::open_database().await?;
    let registry = EndpointRegistry::from_pool(pool);
    for line in run(&registry, &args.command).await? {
        println!("{line}");
    }
    Ok(())
}

/// コマンドを実行し、表示する行を返す
pub async fn run(registry: &EndpointRegistry, command: &EndpointCommand) -> anyhow::Result<Vec<String>> {
    match command {
        EndpointCommand::Create { name } => {
            match registry.create(name, &Endpoint::default_code(name)).await {
                Ok(_) => Ok(vec![format!("Created endpoint {name}.")]),
                Err(FaasError::Duplicate(_)) => {
                    anyhow::bail!("Failed to create endpoint. Endpoint names must be unique.")
                }
                Err(e) => Err(e).context("Failed to create endpoint."),
            }
        }
        EndpointCommand::Remove { name } => {
            registry
                .remove(name)
                .await
                .with_context(|| format!("Failed to remove endpoint {name}!"))?;
            Ok(vec![format!("Removed endpoint {name}.")])
        }
        EndpointCommand::List => Ok(registry.list_names().await?),
        EndpointCommand::Upload { file, endpoint } => {
            let code = tokio::fs::read_to_string(file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            match registry.upload(endpoint, &code).await {
                Ok(()) => Ok(vec![format!(
                    "Uploaded function successfully to endpoint {endpoint}!"
                )]),
                Err(FaasError::NotFound(_)) => anyhow::bail!("Endpoint {endpoint} doesn't exist!"),
                Err(e) => Err(e).with_context(|| format!("Failed to upload to endpoint {endpoint}!")),
            }
        }
    }
}
