//! Root-to-leaf traversal of a decision tree for a single record.

use crate::error::TreeError;
use crate::features::FeatureSchema;
use crate::tree::DecisionTree;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Which child a split sent the record to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// `value <= threshold`
    Left,
    /// `value > threshold`
    Right,
}

impl Direction {
    pub fn comparator(self) -> &'static str {
        match self {
            Direction::Left => "<=",
            Direction::Right => ">",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => f.write_str("LEFT"),
            Direction::Right => f.write_str("RIGHT"),
        }
    }
}

/// One split visited on the way to a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub node: usize,
    pub feature: usize,
    pub threshold: f64,
    /// The record's encoded value for `feature`.
    pub value: f64,
    pub direction: Direction,
}

impl PathStep {
    /// `Feature {name} <= 2.45 -> LEFT`
    pub fn describe(&self, name: &str) -> String {
        format!(
            "Feature {} {} {:.2} -> {}",
            name,
            self.direction.comparator(),
            self.threshold,
            self.direction
        )
    }

    /// `Feature 2 (petal_length) <= 2.45 -> LEFT`
    pub fn describe_indexed(&self, name: &str) -> String {
        format!(
            "Feature {} ({}) {} {:.2} -> {}",
            self.feature,
            name,
            self.direction.comparator(),
            self.threshold,
            self.direction
        )
    }
}

/// The ordered nodes a record visits from the root to its leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPath {
    nodes: Vec<usize>,
    steps: Vec<PathStep>,
}

impl DecisionPath {
    /// Node ids from root to leaf, inclusive.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// The splits taken, one per internal node.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// The leaf the record landed in.
    pub fn leaf(&self) -> usize {
        // A path always holds at least the root.
        self.nodes[self.nodes.len() - 1]
    }

    /// `Step 1: ...` lines, each terminated by a newline.
    pub fn render_steps(&self, schema: &FeatureSchema) -> String {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                format!(
                    "Step {}: {}\n",
                    i + 1,
                    step.describe(schema.encoded_name(step.feature))
                )
            })
            .collect()
    }
}

/// Walk `tree` from the root to the leaf reached by `values`.
///
/// At each internal node the record goes left when its value for the split
/// feature is `<=` the threshold and right otherwise.
pub fn trace_path(tree: &DecisionTree, values: &[f64]) -> Result<DecisionPath, TreeError> {
    if values.len() != tree.n_features() {
        return Err(TreeError::RecordWidthMismatch {
            expected: tree.n_features(),
            actual: values.len(),
        });
    }

    let mut node = 0;
    let mut nodes = vec![node];
    let mut steps = Vec::new();

    while let Some(feature) = tree.feature(node) {
        let threshold = tree.threshold(node);
        let value = values[feature];
        let (direction, next) = if value <= threshold {
            (Direction::Left, tree.left(node))
        } else {
            (Direction::Right, tree.right(node))
        };
        steps.push(PathStep {
            node,
            feature,
            threshold,
            value,
            direction,
        });
        node = next;
        nodes.push(node);
    }

    Ok(DecisionPath { nodes, steps })
}

/// Log every step of `path` at debug level.
pub fn log_path(path: &DecisionPath, schema: &FeatureSchema) {
    for (i, step) in path.steps().iter().enumerate() {
        debug!(
            step = i + 1,
            node = step.node,
            "Step {}: {}",
            i + 1,
            step.describe_indexed(schema.encoded_name(step.feature))
        );
    }
}
