//! ReviveAI CLI and REST API entry point.
//!
//! Binary name: `reviveai`
//!
//! Parses CLI arguments, initializes services, then dispatches to the
//! appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Serve with --otel goes through the OTel-capable subscriber; everything
    // else gets a plain fmt subscriber driven by verbosity flags.
    let otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    if otel {
        reviveai_observe::tracing_setup::init_tracing(true)
            .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    } else {
        let filter = match cli.verbose {
            0 if cli.quiet => "error",
            0 => "warn",
            1 => "info,reviveai=debug",
            _ => "trace",
        };
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_target(false)
            .init();
    }

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "reviveai", &mut std::io::stdout());
        return Ok(());
    }

    match cli.command {
        Commands::Serve { host, port, .. } => {
            let state = AppState::init().await?;

            let host = host.unwrap_or_else(|| state.config.host.clone());
            let port = port.unwrap_or(state.config.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} ReviveAI API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if otel {
                reviveai_observe::tracing_setup::shutdown_tracing();
            }

            println!("\n  Server stopped.");
        }

        Commands::Ingest { csv } => {
            cli::ingest::ingest(&csv, cli.json).await?;
        }

        Commands::Carbon { query } => {
            let state = AppState::init().await?;
            cli::carbon::carbon(&state, &query, cli.json).await?;
        }

        Commands::Search { query } => {
            let state = AppState::init().await?;
            cli::search::search(&state, &query, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
