use axum::{
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::classifier::Classifier;
use crate::handler::{
    arrival_days, create_prediction, encode_features, get_historic_predictions, get_prediction,
    show_form, submit_form,
};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub classifier: Arc<dyn Classifier>,
    pub model_version: String,
}

pub fn create_router(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/", get(get_historic_predictions).post(create_prediction))
        .route("/features", post(encode_features))
        .route("/:id", get(get_prediction));

    return Router::new()
        .route("/", get(show_form).post(submit_form))
        .route("/arrival-days/:month", get(arrival_days))
        .nest("/prediction", api_routes)
        .with_state(app_state);
}
