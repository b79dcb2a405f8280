//! Model bundles: a fitted tree, its feature schema, and records to explain.
//!
//! A bundle is a single JSON document exported from the training side:
//!
//! ```json
//! {
//!   "tree": { "children_left": [...], "children_right": [...], "feature": [...],
//!             "threshold": [...], "n_features": 4, "value": [...], "classes": [...] },
//!   "feature_names": ["odor_foul", "odor_none", "stalk-height", "cap-diameter"],
//!   "original_feature_names": ["odor", "stalk-height", "cap-diameter"],
//!   "categorical_columns": ["odor"],
//!   "feature_descriptions": { "odor": "smell of the mushroom" },
//!   "labels": ["edible", "poisonous"],
//!   "records": [ { "values": [1, 0, 4, 8], "original": { "odor": "foul" }, "label": "poisonous" } ]
//! }
//! ```

use crate::error::{ExplainError, Result};
use crate::features::{FeatureSchema, Record};
use crate::tree::DecisionTree;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub tree: DecisionTree,
    #[serde(flatten)]
    pub schema: FeatureSchema,
    /// Label names used in explanations. Defaults to the tree's classes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl ModelBundle {
    /// Parse a bundle from JSON and check the schema against the tree.
    pub fn from_json(json: &str) -> Result<Self> {
        let bundle: Self = serde_json::from_str(json)?;
        bundle.schema.check_width(bundle.tree.n_features())?;
        Ok(bundle)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let bundle = Self::from_json(&json)?;
        debug!(
            path = %path.display(),
            nodes = bundle.tree.node_count(),
            records = bundle.records.len(),
            "Loaded model bundle"
        );
        Ok(bundle)
    }

    pub fn record(&self, index: usize) -> Result<&Record> {
        self.records
            .get(index)
            .ok_or(ExplainError::RecordNotFound {
                index,
                available: self.records.len(),
            })
    }

    pub fn labels(&self) -> Vec<String> {
        if self.labels.is_empty() {
            self.tree.classes().to_vec()
        } else {
            self.labels.clone()
        }
    }
}
