//! faas Entry Point

use clap::Parser;
use faas::cli::{Cli, Commands};
use faas::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // ログのWorkerGuardはプロセス終了まで保持する
    let _log_guard = match logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve(args)) => faas::cli::serve::execute(&args).await,
        Some(Commands::Endpoint(args)) => faas::cli::endpoint::execute(&args).await,
        Some(Commands::Secret(args)) => faas::cli::secret::execute(&args).await,
        Some(Commands::Package(args)) => faas::cli::package::execute(&args).await,
        Some(Commands::Dev(args)) => faas::cli::dev::execute(&args).await,
        Some(Commands::Info) => {
            faas::cli::info::execute();
            Ok(())
        }
        Some(Commands::Status(args)) => faas::cli::status::execute(&args).await,
        None => {
            // No subcommand - default to serve
            faas::cli::serve::execute(&faas::cli::serve::ServeArgs::default()).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
