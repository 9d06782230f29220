use ::serde::{Deserialize, Serialize};
use chrono::NaiveDate;

use crate::features::NamedFeature;

#[derive(Serialize, Deserialize)]
pub struct HistoricPredictionOptions {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Serialize)]
pub struct EncodedFeatures {
    pub data: Vec<NamedFeature>,
    pub success: bool,
}

#[derive(Serialize, Deserialize)]
pub struct ArrivalDays {
    pub month: u32,
    pub days: Vec<u32>,
}
