use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use cancellation_api::app::{create_router, AppState};
use cancellation_api::classifier::XgbClassifier;
use cancellation_api::model::BookingPrediction;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/booking_model.json")
}

async fn test_pool() -> SqlitePool {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    BookingPrediction::create_table(&db).await.expect("create table");
    db
}

fn app_with(db: SqlitePool) -> Router {
    let classifier = XgbClassifier::load(fixture_path(), "XGBoost").expect("fixture model loads");
    create_router(AppState {
        db,
        classifier: Arc::new(classifier),
        model_version: "test".to_string(),
    })
}

async fn test_app() -> Router {
    app_with(test_pool().await)
}

/// Long lead time, no special requests, booked online.
fn risky_booking() -> Value {
    json!({
        "no_of_adults": 2,
        "no_of_children": 0,
        "no_of_weekend_nights": 1,
        "no_of_week_nights": 3,
        "required_car_parking_space": "No",
        "lead_time": 224,
        "arrival_year": 2018,
        "arrival_month": 10,
        "arrival_date": 2,
        "repeated_guest": "No",
        "no_of_previous_cancellations": 0,
        "no_of_previous_bookings_not_canceled": 0,
        "avg_price_per_room": 115.5,
        "no_of_special_requests": 0,
        "meal_plan": "Meal Plan 1",
        "room_type": "Room_Type 1",
        "market_segment": "Online"
    })
}

/// Short lead time, cheap room, two special requests.
fn safe_booking() -> Value {
    let mut booking = risky_booking();
    booking["lead_time"] = json!(10);
    booking["avg_price_per_room"] = json!(65.0);
    booking["no_of_special_requests"] = json!(2);
    booking["market_segment"] = json!("Offline");
    booking
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<&Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn send_form(app: &Router, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

const FORM_BODY: &str = "no_of_adults=2&no_of_children=0&no_of_weekend_nights=1&no_of_week_nights=3\
&required_car_parking_space=No&lead_time=224&arrival_year=2018&arrival_month=10&arrival_date=2\
&repeated_guest=No&no_of_previous_cancellations=0&no_of_previous_bookings_not_canceled=0\
&avg_price_per_room=115.50&no_of_special_requests=0&meal_plan=Meal+Plan+1\
&room_type=Room_Type+1&market_segment=Online";

#[tokio::test]
async fn form_page_renders() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Hotel Booking Cancellation Predictor"));
    assert!(html.contains("Booking Information"));
    assert!(!html.contains("Prediction:"));
}

#[tokio::test]
async fn form_submission_shows_prediction() {
    let app = test_app().await;
    let (status, html) = send_form(&app, FORM_BODY).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Prediction: Canceled"), "{html}");
    assert!(html.contains(r#"<option value="Online" selected>Online</option>"#));

    let (status, history) = send_json(
        &app,
        "GET",
        "/prediction?start_date=2000-01-01&end_date=2999-12-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn form_submission_rejects_impossible_day() {
    let app = test_app().await;
    let body = FORM_BODY.replace("arrival_month=10&arrival_date=2", "arrival_month=2&arrival_date=30");
    let (status, html) = send_form(&app, &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("arrival day 30 is not offered for month 02"));
    assert!(!html.contains("Prediction:"));
}

#[tokio::test]
async fn form_submission_rejects_negative_counts() {
    let app = test_app().await;
    let body = FORM_BODY.replace("no_of_adults=2", "no_of_adults=-1");
    let (status, html) = send_form(&app, &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains(r#"class="error">no_of_adults:"#), "{html}");
    assert!(html.contains(r#"name="lead_time" min="0" step="1" value="224""#));
    assert!(html.contains(r#"<option value="Online" selected>Online</option>"#));
}

#[tokio::test]
async fn form_submission_keeps_typed_values_on_blank_field() {
    let app = test_app().await;
    let body = FORM_BODY
        .replace("no_of_adults=2", "no_of_adults=7")
        .replace("no_of_children=0", "no_of_children=");
    let (status, html) = send_form(&app, &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains(r#"class="error">no_of_children:"#), "{html}");
    assert!(html.contains(r#"name="no_of_adults" min="0" step="1" value="7""#));
    assert!(html.contains(r#"name="lead_time" min="0" step="1" value="224""#));
    assert!(!html.contains("Prediction:"));
}

#[tokio::test]
async fn form_submission_reports_missing_field() {
    let app = test_app().await;
    let body = FORM_BODY.replace("&repeated_guest=No", "");
    let (status, html) = send_form(&app, &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("repeated_guest is required"));
}

#[tokio::test]
async fn form_shows_prediction_when_recording_fails() {
    let db = test_pool().await;
    let app = app_with(db.clone());
    db.close().await;

    let (status, html) = send_form(&app, FORM_BODY).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Prediction: Canceled"), "{html}");

    let (status, body) = send_json(&app, "POST", "/prediction", Some(&risky_booking())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn api_predicts_and_records() {
    let app = test_app().await;

    let (status, body) = send_json(&app, "POST", "/prediction", Some(&risky_booking())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["result"], json!("Canceled"));
    assert_eq!(body["data"]["prediction"], json!(1));
    assert_eq!(body["data"]["model_name"], json!("XGBoost"));
    assert_eq!(body["data"]["model_version"], json!("test"));
    assert_eq!(body["data"]["booking"]["market_segment"], json!("Online"));
    let probability = body["data"]["cancel_probability"].as_f64().unwrap();
    assert!(probability > 0.5 && probability < 0.8);

    let (status, body) = send_json(&app, "POST", "/prediction", Some(&safe_booking())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["result"], json!("Not Canceled"));
    assert_eq!(body["data"]["prediction"], json!(0));

    let id = body["data"]["id"].as_i64().unwrap();
    let (status, body) = send_json(&app, "GET", &format!("/prediction/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], json!(id));
    assert_eq!(body["result"], json!("Not Canceled"));
}

#[tokio::test]
async fn api_rejects_invalid_bookings() {
    let app = test_app().await;

    let mut booking = risky_booking();
    booking["arrival_year"] = json!(1999);
    let (status, body) = send_json(&app, "POST", "/prediction", Some(&booking)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], json!(false));

    let mut booking = risky_booking();
    booking["meal_plan"] = json!("Meal Plan 4");
    let (status, body) = send_json(&app, "POST", "/prediction", Some(&booking)).await;
    assert!(status.is_client_error());
    assert_eq!(body["success"], json!(false));

    let (status, body) = send_json(
        &app,
        "GET",
        "/prediction?start_date=2000-01-01&end_date=2999-12-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_prediction_is_not_found() {
    let app = test_app().await;
    let (status, body) = send_json(&app, "GET", "/prediction/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("prediction 42 not found"));
}

#[tokio::test]
async fn malformed_path_parameters_return_json_errors() {
    let app = test_app().await;
    for uri in ["/prediction/abc", "/arrival-days/-1"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json",
            "{uri}"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], json!(false), "{uri}");
        assert!(body["error"].as_str().unwrap().contains("Cannot parse"), "{uri}");
    }
}

#[tokio::test]
async fn history_rejects_inverted_range() {
    let app = test_app().await;
    let (status, body) = send_json(
        &app,
        "GET",
        "/prediction?start_date=2026-02-01&end_date=2026-01-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn features_endpoint_returns_encoded_vector() {
    let app = test_app().await;
    let mut booking = safe_booking();
    booking["meal_plan"] = json!("No Need Meal");
    let (status, body) = send_json(&app, "POST", "/prediction/features", Some(&booking)).await;
    assert_eq!(status, StatusCode::OK);

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 30);
    assert_eq!(data[5], json!({"name": "lead_time", "value": 10.0}));
    assert_eq!(data[17], json!({"name": "type_of_meal_plan_Not Selected", "value": 1.0}));
    assert_eq!(data[28], json!({"name": "market_segment_type_Offline", "value": 1.0}));
    let flags: f64 = data[14..].iter().map(|f| f["value"].as_f64().unwrap()).sum();
    assert_eq!(flags, 3.0);
}

#[tokio::test]
async fn arrival_days_follow_month() {
    let app = test_app().await;
    let (status, body) = send_json(&app, "GET", "/arrival-days/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["days"].as_array().unwrap().len(), 28);

    let (status, body) = send_json(&app, "GET", "/arrival-days/13", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}
