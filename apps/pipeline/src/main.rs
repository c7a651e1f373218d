mod broadcast;
mod catalog;
mod cli;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod ocr;
mod pipeline;
mod routes;
mod state;
mod storage;
#[cfg(test)]
mod testing;
mod workers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::broadcast::invoke_channel;
use crate::cli::{read_input, Cli, Command, WorkerUnit};
use crate::config::Config;
use crate::models::response::InvocationResponse;
use crate::pipeline::InvocationHandler;
use crate::routes::build_router;
use crate::state::Services;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-pipeline v{}", env!("CARGO_PKG_VERSION"));

    let services = Services::build(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, &services).await,
        Command::Worker { unit, target } => {
            let (handler, configured) = match unit {
                WorkerUnit::Persister => (
                    services.persister.clone() as Arc<dyn InvocationHandler>,
                    &config.persister_target,
                ),
                WorkerUnit::Matcher => (
                    services.matcher.clone() as Arc<dyn InvocationHandler>,
                    &config.matcher_target,
                ),
            };
            let target = target
                .or_else(|| configured.clone())
                .unwrap_or_else(|| unit.name().to_string());
            workers::run_worker(services.redis.clone(), invoke_channel(&target), handler).await
        }
        Command::Extract { event } => {
            print_response(services.extractor.handle_raw(&read_input(&event)?).await)
        }
        Command::Persist { payload } => {
            print_response(services.persister.invoke(&read_input(&payload)?).await)
        }
        Command::Match { payload } => {
            let input = match payload {
                Some(path) => read_input(&path)?,
                None => "{}".to_string(),
            };
            print_response(services.matcher.invoke(&input).await)
        }
        Command::BatchMatch => {
            let Some(batch) = &services.batch else {
                bail!("Batch matching needs GEMINI_API_KEY");
            };
            match batch.run().await? {
                Some(response) => print_response(response),
                None => {
                    info!("Nothing to match");
                    Ok(())
                }
            }
        }
    }
}

async fn serve(config: &Config, services: &Services) -> Result<()> {
    let app = build_router(services.app_state()).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Prints the invocation result as JSON; non-2xx results become the exit error.
fn print_response(response: InvocationResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.is_success() {
        bail!("invocation failed with status {}", response.status_code);
    }
    Ok(())
}
