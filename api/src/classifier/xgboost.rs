//! Tree-ensemble classifier loaded from an XGBoost JSON model
//! (`Booster.save_model("model.json")`).
//!
//! Only the parts of the format needed for binary classification are read;
//! unknown keys are ignored.

use serde::{Deserialize, Deserializer};
use serde_with::{serde_as, DisplayFromStr};
use std::fs;
use std::path::Path;

use super::{BookingStatus, Classifier, ModelError, Prediction};
use crate::features::{FeatureVector, NUM_FEATURES};

// --- JSON layout ---------------------------------------------------------------------

/// `base_score` is written as a number, a numeric string, an array, or a
/// bracketed string such as `"[5E-1]"` depending on the XGBoost version.
fn deserialize_base_score<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;
    use serde_json::Value;

    let mut cur = Value::deserialize(deserializer)?;
    loop {
        match cur {
            Value::Number(n) => {
                return n
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| SerdeError::custom("invalid number"));
            }
            Value::String(s) => {
                let t = s.trim();
                if let Ok(f) = t.parse::<f32>() {
                    return Ok(f);
                }
                if let Some(inner) = t.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
                    if let Ok(f) = inner.trim().parse::<f32>() {
                        return Ok(f);
                    }
                }
                return Err(SerdeError::custom(format!(
                    "cannot parse base_score from string: {s}"
                )));
            }
            Value::Array(arr) => match arr.into_iter().next() {
                Some(first) => cur = first,
                None => return Err(SerdeError::custom("empty base_score array")),
            },
            _ => {
                return Err(SerdeError::custom(
                    "base_score must be number, string, or array",
                ))
            }
        }
    }
}

/// `default_left` is an int array in current models and a bool array in older ones.
fn deserialize_flags<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    let flags = Vec::<Flag>::deserialize(deserializer)?;
    Ok(flags
        .into_iter()
        .map(|f| match f {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        })
        .collect())
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct TreeParam {
    #[serde_as(as = "DisplayFromStr")]
    num_nodes: i64,
}

#[derive(Debug, Deserialize)]
struct Tree {
    tree_param: TreeParam,
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f32>,
    #[serde(deserialize_with = "deserialize_flags")]
    default_left: Vec<bool>,
    #[serde(default)]
    split_type: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct ModelTrees {
    trees: Vec<Tree>,
}

#[derive(Debug, Deserialize)]
struct GbTreeDefinition {
    model: ModelTrees,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
enum GradientBooster {
    Gbtree {
        model: ModelTrees,
    },
    Dart {
        gbtree: GbTreeDefinition,
        weight_drop: Vec<f32>,
    },
    Gblinear {},
}

#[derive(Debug, Deserialize)]
struct Objective {
    name: String,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct LearnerModelParam {
    #[serde(deserialize_with = "deserialize_base_score")]
    base_score: f32,
    #[serde_as(as = "DisplayFromStr")]
    num_feature: i64,
}

#[derive(Debug, Deserialize)]
struct Learner {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: GradientBooster,
    objective: Objective,
    learner_model_param: LearnerModelParam,
}

#[derive(Debug, Deserialize)]
struct XgbModel {
    learner: Learner,
}

// --- Compiled ensemble ---------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf(f32),
    Split {
        feature: usize,
        threshold: f32,
        default_left: bool,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct CompiledTree {
    nodes: Vec<Node>,
}

impl CompiledTree {
    fn compile(tree: &Tree, tree_idx: usize) -> Result<Self, ModelError> {
        let num_nodes = tree.tree_param.num_nodes.max(0) as usize;
        if num_nodes == 0 {
            return Err(ModelError::EmptyTree(tree_idx));
        }
        let malformed = |reason: String| ModelError::MalformedTree {
            tree: tree_idx,
            reason,
        };

        let columns = [
            ("left_children", tree.left_children.len()),
            ("right_children", tree.right_children.len()),
            ("split_indices", tree.split_indices.len()),
            ("split_conditions", tree.split_conditions.len()),
            ("default_left", tree.default_left.len()),
        ];
        for (column, len) in columns {
            if len < num_nodes {
                return Err(malformed(format!(
                    "{column} has {len} entries for {num_nodes} nodes"
                )));
            }
        }

        let child = |node: usize, idx: i32| -> Result<usize, ModelError> {
            if idx <= 0 || idx as usize >= num_nodes || idx as usize == node {
                return Err(malformed(format!(
                    "node {node} references child {idx} but tree has {num_nodes} nodes"
                )));
            }
            Ok(idx as usize)
        };

        let mut nodes = Vec::with_capacity(num_nodes);
        for node in 0..num_nodes {
            let left = tree.left_children[node];
            if left == -1 {
                nodes.push(Node::Leaf(tree.split_conditions[node]));
                continue;
            }
            if tree.split_type.get(node).copied().unwrap_or(0) != 0 {
                return Err(ModelError::CategoricalSplit {
                    tree: tree_idx,
                    node,
                });
            }
            let feature = tree.split_indices[node];
            if feature < 0 || feature as usize >= NUM_FEATURES {
                return Err(malformed(format!(
                    "node {node} splits on feature {feature}"
                )));
            }
            nodes.push(Node::Split {
                feature: feature as usize,
                threshold: tree.split_conditions[node],
                default_left: tree.default_left[node],
                left: child(node, left)?,
                right: child(node, tree.right_children[node])?,
            });
        }
        Ok(Self { nodes })
    }

    /// Walks from the root to a leaf. The walk is bounded by the node count so a
    /// cyclic tree surfaces as an error instead of hanging.
    fn leaf_value(&self, row: &[f32], tree_idx: usize) -> Result<f32, ModelError> {
        let mut idx = 0;
        for _ in 0..self.nodes.len() {
            match self.nodes[idx] {
                Node::Leaf(value) => return Ok(value),
                Node::Split {
                    feature,
                    threshold,
                    default_left,
                    left,
                    right,
                } => {
                    let x = row[feature];
                    let go_left = if x.is_nan() { default_left } else { x < threshold };
                    idx = if go_left { left } else { right };
                }
            }
        }
        Err(ModelError::MalformedTree {
            tree: tree_idx,
            reason: "traversal did not reach a leaf".to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Link {
    Logistic,
    LogitRaw,
}

/// Logistic objectives store `base_score` as a probability; the ensemble adds
/// leaf values in margin space.
fn prob_to_margin(base_score: f32) -> f32 {
    let p = base_score.clamp(1e-7, 1.0 - 1e-7);
    (p / (1.0 - p)).ln()
}

fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

#[derive(Debug, Clone)]
pub struct XgbClassifier {
    name: String,
    link: Link,
    base_margin: f32,
    trees: Vec<CompiledTree>,
    tree_weights: Vec<f32>,
}

impl XgbClassifier {
    pub fn load(path: impl AsRef<Path>, name: impl Into<String>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let classifier = Self::from_json_str(&json, name)?;
        tracing::info!(
            path = %path.display(),
            trees = classifier.num_trees(),
            "loaded booking classifier"
        );
        Ok(classifier)
    }

    pub fn from_json_str(json: &str, name: impl Into<String>) -> Result<Self, ModelError> {
        let model: XgbModel = serde_json::from_str(json)?;
        Self::from_model(model, name.into())
    }

    fn from_model(model: XgbModel, name: String) -> Result<Self, ModelError> {
        let learner = model.learner;

        let link = match learner.objective.name.as_str() {
            "binary:logistic" => Link::Logistic,
            "binary:logitraw" => Link::LogitRaw,
            other => return Err(ModelError::UnsupportedObjective(other.to_string())),
        };

        let num_feature = learner.learner_model_param.num_feature.max(0) as usize;
        if num_feature != NUM_FEATURES {
            return Err(ModelError::FeatureCount {
                expected: NUM_FEATURES,
                actual: num_feature,
            });
        }
        if !learner.feature_names.is_empty() {
            if learner.feature_names.len() != NUM_FEATURES {
                return Err(ModelError::FeatureCount {
                    expected: NUM_FEATURES,
                    actual: learner.feature_names.len(),
                });
            }
            let mismatch = FeatureVector::names()
                .iter()
                .copied()
                .zip(&learner.feature_names)
                .enumerate()
                .find(|(_, (expected, actual))| *expected != actual.as_str());
            if let Some((index, (expected, actual))) = mismatch {
                return Err(ModelError::FeatureName {
                    index,
                    expected,
                    actual: actual.clone(),
                });
            }
        }

        let (model_trees, weight_drop) = match learner.gradient_booster {
            GradientBooster::Gbtree { model } => (model, None),
            GradientBooster::Dart { gbtree, weight_drop } => (gbtree.model, Some(weight_drop)),
            GradientBooster::Gblinear {} => return Err(ModelError::UnsupportedBooster),
        };

        let trees = model_trees
            .trees
            .iter()
            .enumerate()
            .map(|(idx, tree)| CompiledTree::compile(tree, idx))
            .collect::<Result<Vec<_>, _>>()?;
        let tree_weights = match weight_drop {
            Some(weights) if weights.len() == trees.len() => weights,
            Some(weights) => {
                return Err(ModelError::MalformedTree {
                    tree: weights.len().min(trees.len()),
                    reason: format!(
                        "dart model has {} tree weights for {} trees",
                        weights.len(),
                        trees.len()
                    ),
                })
            }
            None => vec![1.0; trees.len()],
        };

        let base_score = learner.learner_model_param.base_score;
        let base_margin = match link {
            Link::Logistic => prob_to_margin(base_score),
            Link::LogitRaw => base_score,
        };

        Ok(Self {
            name,
            link,
            base_margin,
            trees,
            tree_weights,
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn margin(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let row = features.values();
        let mut margin = self.base_margin as f64;
        for (idx, (tree, weight)) in self.trees.iter().zip(&self.tree_weights).enumerate() {
            margin += (*weight as f64) * (tree.leaf_value(row, idx)? as f64);
        }
        if !margin.is_finite() {
            return Err(ModelError::NonFiniteMargin);
        }
        Ok(margin)
    }
}

impl Classifier for XgbClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        let margin = self.margin(features)?;
        let cancel_probability = sigmoid(margin);
        // logitraw boosters are thresholded on the raw margin, like XGBClassifier.predict.
        let canceled = match self.link {
            Link::Logistic => cancel_probability > 0.5,
            Link::LogitRaw => margin > 0.5,
        };
        let status = BookingStatus::from_class(i64::from(canceled));
        Ok(Prediction {
            status,
            cancel_probability,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
