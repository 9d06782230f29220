use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::{
    extract::{Form, Json, Path, Query, State},
    response::{Html, IntoResponse, Response},
};
use chrono::Local;

use crate::app::AppState;
use crate::booking::{arrival_day_options, BookingInput};
use crate::classifier::Prediction;
use crate::error::AppError;
use crate::features::encode;
use crate::model::{BookingPrediction, NewBookingPrediction};
use crate::page::{self, Banner};
use crate::schema::{ArrivalDays, EncodedFeatures, HistoricPredictionOptions};

/// Validates, encodes and classifies a booking.
fn classify(state: &AppState, booking: &BookingInput) -> Result<Prediction, AppError> {
    booking.validate()?;
    let features = encode(booking);
    let prediction = state.classifier.predict(&features)?;
    tracing::info!(
        status = %prediction.status,
        probability = prediction.cancel_probability,
        "classified booking"
    );
    Ok(prediction)
}

async fn record_prediction(
    state: &AppState,
    booking: &BookingInput,
    prediction: Prediction,
) -> Result<BookingPrediction, sqlx::Error> {
    BookingPrediction::insert(
        &state.db,
        NewBookingPrediction {
            created_at: Local::now().naive_local(),
            booking,
            prediction,
            model_version: &state.model_version,
            model_name: state.classifier.name(),
        },
    )
    .await
}

pub async fn show_form() -> Html<String> {
    Html(page::render(&BookingInput::default(), None))
}

fn form_error(booking: &BookingInput, err: AppError) -> Response {
    if err.status().is_server_error() {
        tracing::error!(error = %err, "form prediction failed");
    }
    let html = page::render(booking, Some(&Banner::Error(err.to_string())));
    (err.status(), Html(html)).into_response()
}

pub async fn submit_form(
    State(state): State<AppState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    let pairs = match form {
        Ok(Form(pairs)) => pairs,
        Err(rejection) => return form_error(&BookingInput::default(), rejection.into()),
    };
    let (booking, parsed) = BookingInput::from_form_pairs(&pairs);
    if let Err(err) = parsed {
        return form_error(&booking, err.into());
    }

    let prediction = match classify(&state, &booking) {
        Ok(prediction) => prediction,
        Err(err) => return form_error(&booking, err),
    };
    // The page still shows the prediction when it could not be recorded.
    if let Err(err) = record_prediction(&state, &booking, prediction).await {
        tracing::warn!(error = %err, "failed to record form prediction");
    }
    Html(page::render(&booking, Some(&Banner::Success(prediction)))).into_response()
}

pub async fn arrival_days(
    month: Result<Path<u32>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(month) = month?;
    let days = arrival_day_options(month).map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(Json(ArrivalDays { month, days }))
}

pub async fn create_prediction(
    State(state): State<AppState>,
    payload: Result<Json<BookingInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(booking) = payload?;
    let prediction = classify(&state, &booking)?;
    let record = record_prediction(&state, &booking, prediction).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "data": record,
            "result": prediction.status,
            "success": true
        })),
    ))
}

pub async fn encode_features(
    payload: Result<Json<BookingInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(booking) = payload?;
    booking.validate()?;
    let features = encode(&booking);

    Ok(Json(EncodedFeatures {
        data: features.iter().collect(),
        success: true,
    }))
}

pub async fn get_prediction(
    id: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let record = BookingPrediction::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound(id))?;

    Ok(Json(serde_json::json!({
        "data": record,
        "result": record.status(),
        "success": true
    })))
}

pub async fn get_historic_predictions(
    State(state): State<AppState>,
    opts: Result<Query<HistoricPredictionOptions>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(opts) = opts?;
    if opts.start_date > opts.end_date {
        return Err(AppError::BadRequest(format!(
            "start_date {} is after end_date {}",
            opts.start_date, opts.end_date
        )));
    }
    let predictions = BookingPrediction::between(&state.db, opts.start_date, opts.end_date).await?;

    Ok(Json(serde_json::json!({"data": predictions, "success": true})))
}
