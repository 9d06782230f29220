use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};

use crate::booking::BookingInput;
use crate::classifier::{BookingStatus, Prediction};

#[derive(Debug, Deserialize, FromRow, Serialize)]
pub struct BookingPrediction {
    pub id: i64,
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub booking: Json<BookingInput>,
    pub cancel_probability: f64,
    pub prediction: i64, // 1 = canceled, 0 = not canceled
    pub model_version: String,
    pub model_name: String,
}

/// Values recorded for one prediction; `id` is assigned by SQLite.
pub struct NewBookingPrediction<'a> {
    pub created_at: NaiveDateTime,
    pub booking: &'a BookingInput,
    pub prediction: Prediction,
    pub model_version: &'a str,
    pub model_name: &'a str,
}

impl BookingPrediction {
    pub fn status(&self) -> BookingStatus {
        BookingStatus::from_class(self.prediction)
    }

    pub async fn create_table(db: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS "predictions.booking_status" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date DATE NOT NULL,
                created_at DATETIME NOT NULL,
                booking TEXT NOT NULL,
                cancel_probability REAL NOT NULL,
                prediction INT NOT NULL,
                model_version TEXT NOT NULL,
                model_name TEXT NOT NULL
            );
            "#,
        )
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn insert(
        db: &SqlitePool,
        new: NewBookingPrediction<'_>,
    ) -> Result<BookingPrediction, sqlx::Error> {
        sqlx::query_as::<_, BookingPrediction>(
            r#"
            INSERT INTO "predictions.booking_status"
                (date, created_at, booking, cancel_probability, prediction, model_version, model_name)
            VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *
            "#,
        )
        .bind(new.created_at.date())
        .bind(new.created_at)
        .bind(Json(new.booking))
        .bind(new.prediction.cancel_probability)
        .bind(new.prediction.status.class())
        .bind(new.model_version)
        .bind(new.model_name)
        .fetch_one(db)
        .await
    }

    pub async fn find(db: &SqlitePool, id: i64) -> Result<Option<BookingPrediction>, sqlx::Error> {
        sqlx::query_as::<_, BookingPrediction>(
            r#"SELECT * FROM "predictions.booking_status" WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn between(
        db: &SqlitePool,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<BookingPrediction>, sqlx::Error> {
        sqlx::query_as::<_, BookingPrediction>(
            r#"
            SELECT * FROM "predictions.booking_status" WHERE date >= ? AND date <= ? ORDER BY id
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(db)
        .await
    }
}
