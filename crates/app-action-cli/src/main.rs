mod commands;

use std::process::ExitCode;

use app_action_cloud::{CancelHandle, cancellation};
use app_action_core::{GitHubActions, ProcessEnv, Reporter};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "app-action",
    about = "Deploy and delete DigitalOcean App Platform apps from GitHub Actions"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update an app from its spec and wait until it is live
    Deploy(commands::DeployArgs),
    /// Delete an app by id, name or pull request preview
    Delete(commands::DeleteArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let reporter = GitHubActions::from_env(&ProcessEnv);

    let (handle, cancel) = cancellation();
    tokio::spawn(cancel_on_signal(handle));

    let result = match cli.command {
        Commands::Deploy(args) => commands::deploy(args, &reporter, cancel).await,
        Commands::Delete(args) => commands::delete(args, &reporter).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            reporter.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

/// Cancel polling when the runner stops the job.
async fn cancel_on_signal(handle: CancelHandle) {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {}
        () = terminate => {}
    }
    tracing::warn!("received shutdown signal, cancelling");
    handle.cancel();
}
