use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;

/// Reasons a prediction attempt can fail. None of these reach the caller of
/// the engine; they are logged and collapsed into a placeholder result.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("student {0} not present in the feature table")]
    StudentNotInFeatures(i64),
    #[error("missing or unparseable engagement_classification for student {0}")]
    MissingEngagement(i64),
    #[error("feature column {column} holds non-numeric value {value:?}")]
    BadFeatureValue { column: String, value: String },
    #[error("model evaluation failed: {0}")]
    Model(String),
}

/// One student's predictor vector, keyed by sanitized column name.
/// Absent features are legal; the model routes them to a split's left child.
#[derive(Debug, Default, Clone)]
pub struct ModelInput {
    values: HashMap<String, f64>,
}

impl ModelInput {
    pub fn insert(&mut self, name: String, value: f64) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Inference seam. The engine only ever asks for a single label, so stubs
/// in tests can count invocations and return a fixed class.
pub trait Classifier: Send + Sync {
    fn predict_label(&self, input: &ModelInput) -> Result<i32, PredictionError>;
}

/// A multiclass gradient-boosted ensemble exported as a JSON dump. Tree `i`
/// contributes its margin to class `i % num_classes`; the prediction is the
/// argmax of the summed margins, ties resolving to the lowest class id.
#[derive(Debug, Deserialize)]
pub struct BoostedTreesModel {
    pub num_classes: usize,
    pub feature_names: Vec<String>,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

/// A node is either a split (feature, threshold, left, right set) or a
/// leaf (leaf set). Values below the threshold go left, as does a missing
/// feature value.
#[derive(Debug, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub feature: Option<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub left: Option<usize>,
    #[serde(default)]
    pub right: Option<usize>,
    #[serde(default)]
    pub leaf: Option<f64>,
}

impl BoostedTreesModel {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read model file {}", path.display()))?;
        let model: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse model file {}", path.display()))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.num_classes > 0, "model declares zero classes");
        anyhow::ensure!(!self.trees.is_empty(), "model holds no trees");
        for (i, tree) in self.trees.iter().enumerate() {
            for node in &tree.nodes {
                if let Some(feature) = &node.feature {
                    anyhow::ensure!(
                        self.feature_names.iter().any(|name| name == feature),
                        "tree {i} splits on undeclared feature {feature:?}"
                    );
                }
            }
        }
        Ok(())
    }

    fn eval_tree(&self, tree: &Tree, input: &ModelInput) -> Result<f64, PredictionError> {
        let mut idx = 0usize;
        // A well-formed tree reaches a leaf in at most nodes.len() hops.
        for _ in 0..=tree.nodes.len() {
            let node = tree.nodes.get(idx).ok_or_else(|| {
                PredictionError::Model(format!("node index {idx} out of range"))
            })?;
            if let Some(margin) = node.leaf {
                return Ok(margin);
            }
            let (feature, threshold, left, right) =
                match (&node.feature, node.threshold, node.left, node.right) {
                    (Some(f), Some(t), Some(l), Some(r)) => (f, t, l, r),
                    _ => {
                        return Err(PredictionError::Model(format!(
                            "malformed split node {idx}"
                        )))
                    }
                };
            idx = match input.get(feature) {
                Some(value) if value >= threshold => right,
                _ => left,
            };
        }
        Err(PredictionError::Model("tree walk did not terminate".to_string()))
    }
}

impl Classifier for BoostedTreesModel {
    fn predict_label(&self, input: &ModelInput) -> Result<i32, PredictionError> {
        if self.num_classes == 0 || self.trees.is_empty() {
            return Err(PredictionError::Model(
                "model holds no trees or classes".to_string(),
            ));
        }

        let mut margins = vec![0.0f64; self.num_classes];
        for (i, tree) in self.trees.iter().enumerate() {
            margins[i % self.num_classes] += self.eval_tree(tree, input)?;
        }

        let mut best = 0usize;
        for (class, margin) in margins.iter().enumerate() {
            if *margin > margins[best] {
                best = class;
            }
        }
        Ok(best as i32)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn two_class_model() -> BoostedTreesModel {
        // Tree 0 scores class 0, tree 1 scores class 1. Students with
        // clicks_per_week >= 4 land in class 1.
        serde_json::from_str(
            r#"{
                "num_classes": 2,
                "feature_names": ["clicks_per_week"],
                "trees": [
                    {"nodes": [
                        {"feature": "clicks_per_week", "threshold": 4.0, "left": 1, "right": 2},
                        {"leaf": 0.9},
                        {"leaf": 0.1}
                    ]},
                    {"nodes": [
                        {"feature": "clicks_per_week", "threshold": 4.0, "left": 1, "right": 2},
                        {"leaf": 0.2},
                        {"leaf": 0.8}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    fn input_with_clicks(clicks: f64) -> ModelInput {
        let mut input = ModelInput::default();
        input.insert("clicks_per_week".to_string(), clicks);
        input
    }

    #[test]
    fn predicts_argmax_class() {
        let model = two_class_model();
        assert_eq!(model.predict_label(&input_with_clicks(1.0)).unwrap(), 0);
        assert_eq!(model.predict_label(&input_with_clicks(7.0)).unwrap(), 1);
    }

    #[test]
    fn missing_feature_routes_left() {
        let model = two_class_model();
        let label = model.predict_label(&ModelInput::default()).unwrap();
        assert_eq!(label, 0);
    }

    #[test]
    fn margin_tie_resolves_to_lowest_class() {
        let model: BoostedTreesModel = serde_json::from_str(
            r#"{
                "num_classes": 2,
                "feature_names": [],
                "trees": [
                    {"nodes": [{"leaf": 0.5}]},
                    {"nodes": [{"leaf": 0.5}]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(model.predict_label(&ModelInput::default()).unwrap(), 0);
    }

    #[test]
    fn malformed_split_is_a_model_error() {
        let model: BoostedTreesModel = serde_json::from_str(
            r#"{
                "num_classes": 1,
                "feature_names": ["x"],
                "trees": [{"nodes": [{"feature": "x", "threshold": 1.0, "left": 1}]}]
            }"#,
        )
        .unwrap();
        let err = model.predict_label(&ModelInput::default()).unwrap_err();
        assert!(matches!(err, PredictionError::Model(_)));
    }

    #[test]
    fn loads_from_disk_and_rejects_undeclared_features() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "num_classes": 2,
                "feature_names": ["clicks_per_week"],
                "trees": [{{"nodes": [{{"leaf": 0.1}}]}}]
            }}"#
        )
        .unwrap();
        let model = BoostedTreesModel::from_path(file.path()).unwrap();
        assert_eq!(model.num_classes, 2);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(
            bad,
            r#"{{
                "num_classes": 2,
                "feature_names": [],
                "trees": [{{"nodes": [
                    {{"feature": "ghost", "threshold": 1.0, "left": 1, "right": 2}},
                    {{"leaf": 0.0}},
                    {{"leaf": 1.0}}
                ]}}]
            }}"#
        )
        .unwrap();
        assert!(BoostedTreesModel::from_path(bad.path()).is_err());
    }

    #[test]
    fn missing_model_file_is_an_error() {
        let err = BoostedTreesModel::from_path(Path::new("/nonexistent/model.json"));
        assert!(err.is_err());
    }
}
