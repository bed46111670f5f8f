//! tolkroute binary
//!
//! `serve` (the default) starts the HTTP API. `detect` and `route` run the
//! decision layer once and print JSON. `config` writes a template file.

use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tolkroute::cli::{Cli, Command, generate_config_template, join_text};
use tolkroute::config::Config;
use tolkroute::handlers::{self, AppState};
use tolkroute::pipeline::DecisionEngine;
use tolkroute::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = &cli.command {
        let template = generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(path, template)?;
                eprintln!("Configuration template written to {}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    let config = load_config(&cli.config)?;
    telemetry::init(&config.observability.log_level);

    match cli.command {
        Some(Command::Detect { text }) => {
            let engine = DecisionEngine::new(&config)?;
            let result = engine.detect(&join_text(&text));
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Some(Command::Route { tier, text }) => {
            let engine = DecisionEngine::new(&config)?;
            let decision = engine.route(tier.as_deref(), &join_text(&text));
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
        Some(Command::Serve) | None => serve(config).await?,
        Some(Command::Config { .. }) => {}
    }

    Ok(())
}

/// Load the config file, or built-in defaults when it does not exist
fn load_config(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    if Path::new(path).exists() {
        return Ok(Config::from_file(path)?);
    }
    let config = Config::default();
    // The subscriber is not installed yet
    eprintln!(
        "Configuration file {} not found, using built-in defaults \
        (run `tolkroute config -o {}` to create one)",
        path, path
    );
    Ok(config)
}

async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let state = AppState::new(Arc::new(config))?;
    let app = handlers::app(state);

    tracing::info!("Starting tolkroute server on {}", addr);
    tracing::info!("Health check available at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
