mod xgboost;

pub use xgboost::XgbClassifier;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::FeatureVector;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported booster type: gblinear models cannot classify bookings")]
    UnsupportedBooster,
    #[error("unsupported objective {0:?}, expected a binary classifier")]
    UnsupportedObjective(String),
    #[error("model expects {actual} features but bookings are encoded into {expected}")]
    FeatureCount { expected: usize, actual: usize },
    #[error("model feature {index} is named {actual:?}, expected {expected:?}")]
    FeatureName {
        index: usize,
        expected: &'static str,
        actual: String,
    },
    #[error("tree {0} has no nodes")]
    EmptyTree(usize),
    #[error("tree {tree} is malformed: {reason}")]
    MalformedTree { tree: usize, reason: String },
    #[error("tree {tree} node {node} uses a categorical split, which is not supported")]
    CategoricalSplit { tree: usize, node: usize },
    #[error("model produced a non-finite margin")]
    NonFiniteMargin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum BookingStatus {
    #[serde(rename = "Not Canceled")]
    NotCanceled,
    Canceled,
}

impl BookingStatus {
    pub fn from_class(class: i64) -> Self {
        if class == 1 {
            BookingStatus::Canceled
        } else {
            BookingStatus::NotCanceled
        }
    }

    pub fn class(self) -> i64 {
        match self {
            BookingStatus::NotCanceled => 0,
            BookingStatus::Canceled => 1,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::NotCanceled => f.write_str("Not Canceled"),
            BookingStatus::Canceled => f.write_str("Canceled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub status: BookingStatus,
    pub cancel_probability: f64,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.status, f)
    }
}

/// A pre-trained binary model deciding whether a booking gets canceled.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError>;

    fn name(&self) -> &str;
}
