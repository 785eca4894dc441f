//! Parley CLI and REST API entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, loads configuration and the model, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use parley_infra::config::{load_config, resolve_config_path, ConfigSource};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref());
    let (mut config, config_source) = load_config(&config_path).await?;

    // Set up tracing based on verbosity; `debug = true` raises the floor to -v
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 if !config.debug => "warn",
        0 | 1 => "info,parley_core=debug,parley_infra=debug,parley_api=debug",
        _ => "trace",
    };
    parley_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!(e))?;

    match config_source {
        ConfigSource::File => tracing::debug!(
            path = %config_path.display(),
            model = %config.model_path.display(),
            history = %config.history_path.display(),
            history_mode = %config.history_mode,
            "Loaded config"
        ),
        ConfigSource::Defaults => tracing::debug!(
            path = %config_path.display(),
            "No config file, using defaults"
        ),
    }

    // The transcript can be read without loading the model
    if let Commands::History = cli.command {
        let result = cli::history::show_history(&config, cli.json).await;
        parley_observe::tracing_setup::shutdown_tracing();
        return result;
    }

    if let Commands::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }

    if !cli.quiet && !cli.json {
        println!(
            "  {} Loading model from {}",
            console::style("…").dim(),
            console::style(config.model_path.display()).cyan()
        );
    }
    let state = AppState::init(config).await?;

    let result = match cli.command {
        Commands::Serve { .. } => serve(state).await,
        Commands::Ask { sentence } => cli::ask::ask(&state, &sentence, cli.json).await,
        Commands::Chat => cli::chat::loop_runner::run_chat_loop(&state).await,
        Commands::History => unreachable!("handled above"),
    };

    parley_observe::tracing_setup::shutdown_tracing();
    result
}

/// Bind the listener and serve the REST API until Ctrl+C or SIGTERM.
async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        %addr,
        model = %state.chat_service.model_name(),
        history = %state.config.history_path.display(),
        "Server started"
    );
    println!(
        "  {} Parley API listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
