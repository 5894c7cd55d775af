use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod labels;
mod model;
mod preprocess;
mod routes;
mod translations;
mod utils;

use config::Config;
use model::Model;
use routes::AppState;
use translations::Translations;
use utils::ensure_files_exist;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    ensure_files_exist(&config)
        .await
        .context("Failed to fetch model artifacts")?;

    let model = Model::new(
        &config.model_path,
        &config.model_input_op,
        &config.model_output_op,
    )
    .context("Failed to load model")?;
    tracing::info!("Model loaded from {}", config.model_path.display());

    let translations = Translations::load(&config.translations_path);

    let shared_state = Arc::new(AppState {
        classifier: Box::new(model),
        translations,
        labels: &labels::CLASS_LABELS,
    });

    let app = routes::router(shared_state, config.body_limit_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);
    axum::Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind {}", addr))?
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
