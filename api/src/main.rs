use cancellation_api::app::{self, AppState};
use cancellation_api::classifier::XgbClassifier;
use cancellation_api::config::Config;
use cancellation_api::model::BookingPrediction;
use clap::Parser;
use sqlx::SqlitePool;
use std::error::Error;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();

    // Refuse to serve without a usable model.
    let classifier = XgbClassifier::load(&config.model_path, config.model_name.clone())
        .map_err(|e| {
            tracing::error!(error = %e, "error loading model");
            e
        })?;

    let conn = SqlitePool::connect(&config.database_url).await?;
    BookingPrediction::create_table(&conn).await?;

    let state = AppState {
        db: conn,
        classifier: Arc::new(classifier),
        model_version: config.model_version,
    };

    let app = app::create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
