use clap::Parser;
use std::path::PathBuf;

/// Runtime settings, taken from flags or the matching environment variables.
#[derive(Parser, Debug, Clone)]
#[command(name = "cancellation-api", version, about = "Hotel booking cancellation predictor")]
pub struct Config {
    /// XGBoost model saved as JSON
    #[arg(long, env = "MODEL_PATH", default_value = "XGB_trained_model.json")]
    pub model_path: PathBuf,
    /// SQLite database recording predictions
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:predictions.db?mode=rwc")]
    pub database_url: String,
    /// Address the HTTP server listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: String,
    #[arg(long, env = "MODEL_NAME", default_value = "XGBoost")]
    pub model_name: String,
    #[arg(long, env = "MODEL_VERSION", default_value = "1")]
    pub model_version: String,
}
