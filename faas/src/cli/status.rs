//! status subcommand
//!
//! Checks whether a server answers on the given port.

use clap::Args;
use reqwest::StatusCode;
use std::time::Duration;

use crate::config::ServerConfig;

/// Arguments for the status subcommand
#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// Port to check (defaults to FAAS_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Execute the status command
pub async fn execute(args: &StatusArgs) -> Result<(), anyhow::Error> {
    let port = args.port.unwrap_or_else(|| ServerConfig::from_env().port);
    let url = format!("http://127.0.0.1:{}/", port);
    let client = reqwest::Client::new();

    let status = check_http(&client, &url).await;
    println!("PORT\tURL\tHTTP");
    println!("{}\t{}\t{}", port, url, format_http_status(status));
    Ok(())
}

async fn check_http(client: &reqwest::Client, url: &str) -> Option<StatusCode> {
    client
        .get(url)
        .timeout(Duration::from_secs(2))
        .send()
        .await
        .map(|resp| resp.status())
        .ok()
}

fn format_http_status(status: Option<StatusCode>) -> String {
    match status {
        Some(code) if code.is_success() => "OK".to_string(),
        Some(code) => format!("HTTP {}", code),
        None => "UNREACHABLE".to_string(),
    }
}
