use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tdssolver::{
    answer::{AnswerGenerator, AnswerSettings},
    api, config, logging,
    oracle::OpenAiCompletionClient,
    service::SolverService,
};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "tds-solver",
    about = "Answer assignment questions about uploaded data files"
)]
struct Cli {
    /// Interface to bind (overrides `SERVER_HOST`).
    #[arg(long)]
    host: Option<String>,
    /// Port to bind (overrides `SERVER_PORT`).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    logging::init_tracing();
    let config = config::init_config().context("failed to load configuration")?;

    let client = OpenAiCompletionClient::from_config(config)
        .context("failed to construct completion client")?;
    let generator = AnswerGenerator::new(Arc::new(client), AnswerSettings::from(config));
    tracing::info!(
        model = %generator.settings().model,
        temperature = generator.settings().temperature,
        "Completion client ready"
    );
    let service = Arc::new(SolverService::new(generator, config.upload_dir.clone()));
    let app = api::create_router(service);

    let host = cli.host.unwrap_or_else(|| config.server_host.clone());
    let port = cli.port.unwrap_or(config.server_port);
    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("failed to bind {host}:{port}"))?;
    tracing::info!("Listening on http://{}:{}", host, port);

    axum::serve(listener, app)
        .await
        .context("server terminated unexpectedly")?;
    Ok(())
}
