//! Array-backed binary decision tree.
//!
//! The layout mirrors the `tree_` attribute of a fitted scikit-learn
//! classifier: parallel arrays indexed by node id, with `children_left`,
//! `children_right`, `feature`, and `threshold` per node. A node is a leaf
//! when its left and right child indices are equal (sklearn stores `-1` for
//! both), and leaves carry a negative feature sentinel.
//!
//! [`DecisionTree`] is always validated on construction, so traversal code can
//! index the arrays directly.

use crate::error::TreeError;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Default depth for [`DecisionTree::export_text`], matching sklearn.
pub const DEFAULT_EXPORT_DEPTH: usize = 10;

/// Serialized form of a decision tree (struct of arrays).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeArrays {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Number of encoded input features the tree was fitted on.
    pub n_features: usize,
    /// Per-node class counts, one row per node. Optional.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value: Vec<Vec<f64>>,
    /// Class labels in the column order of `value`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
}

/// A validated, array-backed binary decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TreeArrays", into = "TreeArrays")]
pub struct DecisionTree {
    arrays: TreeArrays,
}

impl TryFrom<TreeArrays> for DecisionTree {
    type Error = TreeError;

    fn try_from(arrays: TreeArrays) -> Result<Self, Self::Error> {
        Self::new(arrays)
    }
}

impl From<DecisionTree> for TreeArrays {
    fn from(tree: DecisionTree) -> Self {
        tree.arrays
    }
}

impl DecisionTree {
    /// Build a tree from its arrays, validating the structure.
    pub fn new(arrays: TreeArrays) -> Result<Self, TreeError> {
        validate(&arrays)?;
        Ok(Self { arrays })
    }

    pub fn node_count(&self) -> usize {
        self.arrays.children_left.len()
    }

    pub fn n_features(&self) -> usize {
        self.arrays.n_features
    }

    pub fn classes(&self) -> &[String] {
        &self.arrays.classes
    }

    /// A node is a leaf when both child links are equal.
    pub fn is_leaf(&self, node: usize) -> bool {
        self.arrays.children_left[node] == self.arrays.children_right[node]
    }

    /// Feature tested at `node`, or `None` for leaves.
    pub fn feature(&self, node: usize) -> Option<usize> {
        if self.is_leaf(node) {
            None
        } else {
            Some(self.arrays.feature[node] as usize)
        }
    }

    pub fn threshold(&self, node: usize) -> f64 {
        self.arrays.threshold[node]
    }

    /// Left child of an internal node.
    pub fn left(&self, node: usize) -> usize {
        self.arrays.children_left[node] as usize
    }

    /// Right child of an internal node.
    pub fn right(&self, node: usize) -> usize {
        self.arrays.children_right[node] as usize
    }

    /// The majority class at `node`. First class wins on ties.
    ///
    /// Returns `None` when the tree carries no class counts.
    pub fn predict_class(&self, node: usize) -> Option<&str> {
        let counts = self.arrays.value.get(node)?;
        let mut best: Option<(usize, f64)> = None;
        for (i, &count) in counts.iter().enumerate() {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((i, count)),
            }
        }
        best.and_then(|(i, _)| self.arrays.classes.get(i))
            .map(String::as_str)
    }

    /// Depth of the subtree rooted at `node`, counting the node itself.
    pub fn subtree_depth(&self, node: usize) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(node, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            if self.is_leaf(node) {
                deepest = deepest.max(depth);
            } else {
                stack.push((self.right(node), depth + 1));
                stack.push((self.left(node), depth + 1));
            }
        }
        deepest
    }

    /// Render the tree as indented text in the sklearn `export_text` format.
    ///
    /// Branches deeper than `max_depth` collapse into a
    /// `truncated branch of depth N` line. Missing feature names fall back
    /// to `feature_{index}`.
    pub fn export_text(&self, feature_names: &[String], max_depth: usize) -> String {
        enum Frame {
            Node { node: usize, depth: usize },
            Line(String),
        }

        let mut report = String::new();
        let mut stack = vec![Frame::Node { node: 0, depth: 1 }];
        while let Some(frame) = stack.pop() {
            let (node, depth) = match frame {
                Frame::Line(line) => {
                    report.push_str(&line);
                    continue;
                }
                Frame::Node { node, depth } => (node, depth),
            };
            let indent = format!("{}|---", "|   ".repeat(depth - 1));

            if depth > max_depth + 1 {
                let subtree_depth = self.subtree_depth(node);
                if subtree_depth == 1 {
                    self.export_leaf(node, &indent, &mut report);
                } else {
                    let _ = writeln!(report, "{indent} truncated branch of depth {subtree_depth}");
                }
                continue;
            }

            match self.feature(node) {
                Some(feature) => {
                    let name = feature_names
                        .get(feature)
                        .cloned()
                        .unwrap_or_else(|| format!("feature_{feature}"));
                    let threshold = self.threshold(node);
                    let _ = writeln!(report, "{indent} {name} <= {threshold:.2}");
                    // The left subtree pops first, then the `>` header.
                    stack.push(Frame::Node {
                        node: self.right(node),
                        depth: depth + 1,
                    });
                    stack.push(Frame::Line(format!("{indent} {name} >  {threshold:.2}\n")));
                    stack.push(Frame::Node {
                        node: self.left(node),
                        depth: depth + 1,
                    });
                }
                None => self.export_leaf(node, &indent, &mut report),
            }
        }
        report
    }

    fn export_leaf(&self, node: usize, indent: &str, report: &mut String) {
        match self.predict_class(node) {
            Some(class) => {
                let _ = writeln!(report, "{indent} class: {class}");
            }
            None => {
                let _ = writeln!(report, "{indent} leaf {node}");
            }
        }
    }
}

fn validate(arrays: &TreeArrays) -> Result<(), TreeError> {
    let node_count = arrays.children_left.len();
    if node_count == 0 {
        return Err(TreeError::Empty);
    }

    let check_len = |array: &'static str, actual: usize| {
        if actual == node_count {
            Ok(())
        } else {
            Err(TreeError::LengthMismatch {
                array,
                expected: node_count,
                actual,
            })
        }
    };
    check_len("children_right", arrays.children_right.len())?;
    check_len("feature", arrays.feature.len())?;
    check_len("threshold", arrays.threshold.len())?;
    if !arrays.value.is_empty() {
        check_len("value", arrays.value.len())?;
        for (node, counts) in arrays.value.iter().enumerate() {
            if counts.len() != arrays.classes.len() {
                return Err(TreeError::ClassCountMismatch {
                    node,
                    expected: arrays.classes.len(),
                    actual: counts.len(),
                });
            }
        }
    }

    for node in 0..node_count {
        let (left, right) = (arrays.children_left[node], arrays.children_right[node]);
        if left == right {
            continue;
        }
        for child in [left, right] {
            if child < 0 || child as usize >= node_count {
                return Err(TreeError::ChildOutOfRange {
                    node,
                    child,
                    node_count,
                });
            }
        }
        let feature = arrays.feature[node];
        if feature < 0 || feature as usize >= arrays.n_features {
            return Err(TreeError::FeatureOutOfRange {
                node,
                feature,
                n_features: arrays.n_features,
            });
        }
    }

    // Every node reachable from the root must be reached exactly once.
    let mut seen = vec![false; node_count];
    let mut stack = vec![0usize];
    while let Some(node) = stack.pop() {
        if std::mem::replace(&mut seen[node], true) {
            return Err(TreeError::NotATree { node });
        }
        let (left, right) = (arrays.children_left[node], arrays.children_right[node]);
        if left != right {
            stack.push(right as usize);
            stack.push(left as usize);
        }
    }

    Ok(())
}
