//! Per-feature value ranges implied by a decision path.
//!
//! Every split on the path constrains one feature: going left means
//! `value <= threshold`, going right means `value > threshold`. Intersecting
//! those constraints gives, for each feature, the interval `(lower, upper]`
//! of values that would follow the same path. Features the path never tests
//! stay at `(-inf, +inf)`.

use crate::path::DecisionPath;
use crate::tree::DecisionTree;
use std::fmt;

/// Half-open interval `(lower, upper]` of values consistent with a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRange {
    pub lower: f64,
    pub upper: f64,
}

impl Default for FeatureRange {
    fn default() -> Self {
        Self {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        }
    }
}

impl FeatureRange {
    /// True when neither bound has been tightened.
    pub fn is_unbounded(&self) -> bool {
        self.lower == f64::NEG_INFINITY && self.upper == f64::INFINITY
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower < value && value <= self.upper
    }

    fn tighten_upper(&mut self, threshold: f64) {
        self.upper = self.upper.min(threshold);
    }

    fn tighten_lower(&mut self, threshold: f64) {
        self.lower = self.lower.max(threshold);
    }
}

impl fmt::Display for FeatureRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}]", self.lower, self.upper)
    }
}

/// One [`FeatureRange`] per encoded feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRanges(Vec<FeatureRange>);

impl FeatureRanges {
    pub fn unbounded(n_features: usize) -> Self {
        Self(vec![FeatureRange::default(); n_features])
    }

    pub fn get(&self, feature: usize) -> Option<&FeatureRange> {
        self.0.get(feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureRange> {
        self.0.iter()
    }

    /// `(feature, range)` pairs with at least one finite bound.
    pub fn bounded(&self) -> impl Iterator<Item = (usize, &FeatureRange)> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, range)| !range.is_unbounded())
    }
}

/// Derive the tightest range for every feature from the splits on `path`.
///
/// Each internal node on the path tightens the upper bound of its feature
/// when the next node is its left child, and the lower bound otherwise.
pub fn feature_ranges_for_path(tree: &DecisionTree, path: &DecisionPath) -> FeatureRanges {
    let mut ranges = FeatureRanges::unbounded(tree.n_features());

    for pair in path.nodes().windows(2) {
        let (node, next) = (pair[0], pair[1]);
        let Some(feature) = tree.feature(node) else {
            continue;
        };
        let threshold = tree.threshold(node);
        let range = &mut ranges.0[feature];
        if next == tree.left(node) {
            range.tighten_upper(threshold);
        } else {
            range.tighten_lower(threshold);
        }
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::trace_path;
    use crate::test_support::{iris_tree, mushroom_tree};

    #[test]
    fn test_ranges_for_versicolor_path() {
        let tree = iris_tree();
        let values = [6.0, 2.9, 4.5, 1.5];
        let path = trace_path(&tree, &values).unwrap();
        let ranges = feature_ranges_for_path(&tree, &path);

        assert_eq!(ranges.iter().count(), 4);
        assert!(ranges.get(0).unwrap().is_unbounded());
        assert!(ranges.get(1).unwrap().is_unbounded());
        // petal_length: > 2.45 at the root, <= 4.95 at node 3.
        assert_eq!(
            *ranges.get(2).unwrap(),
            FeatureRange {
                lower: 2.45,
                upper: 4.95
            }
        );
        // petal_width: <= 1.75 at node 2.
        assert_eq!(
            *ranges.get(3).unwrap(),
            FeatureRange {
                lower: f64::NEG_INFINITY,
                upper: 1.75
            }
        );
        for (feature, range) in ranges.iter().enumerate() {
            assert!(range.contains(values[feature]));
        }
    }

    #[test]
    fn test_ranges_for_root_leaf_path() {
        let tree = iris_tree();
        let path = trace_path(&tree, &[5.1, 3.5, 1.4, 0.2]).unwrap();
        let ranges = feature_ranges_for_path(&tree, &path);
        let bounded: Vec<_> = ranges.bounded().map(|(i, _)| i).collect();
        assert_eq!(bounded, vec![2]);
        assert_eq!(ranges.get(2).unwrap().upper, 2.45);
        assert_eq!(ranges.get(2).unwrap().lower, f64::NEG_INFINITY);
    }

    #[test]
    fn test_ranges_keep_tightest_bound() {
        use crate::tree::{DecisionTree, TreeArrays};
        // x <= 10 ? (x <= 4 ? leaf : leaf) : leaf
        let tree = DecisionTree::new(TreeArrays {
            children_left: vec![1, 2, -1, -1, -1],
            children_right: vec![4, 3, -1, -1, -1],
            feature: vec![0, 0, -2, -2, -2],
            threshold: vec![10.0, 4.0, -2.0, -2.0, -2.0],
            n_features: 1,
            value: vec![],
            classes: vec![],
        })
        .unwrap();
        let path = trace_path(&tree, &[3.0]).unwrap();
        let ranges = feature_ranges_for_path(&tree, &path);
        assert_eq!(ranges.get(0).unwrap().upper, 4.0);

        let path = trace_path(&tree, &[7.0]).unwrap();
        let ranges = feature_ranges_for_path(&tree, &path);
        assert_eq!(
            *ranges.get(0).unwrap(),
            FeatureRange {
                lower: 4.0,
                upper: 10.0
            }
        );
    }

    #[test]
    fn test_ranges_for_mushroom_path() {
        let tree = mushroom_tree();
        let path = trace_path(&tree, &[0.0, 1.0, 3.0, 14.0]).unwrap();
        assert_eq!(path.nodes(), &[0, 4, 6]);
        let ranges = feature_ranges_for_path(&tree, &path);
        assert_eq!(ranges.get(1).unwrap().lower, 0.5);
        assert_eq!(ranges.get(3).unwrap().lower, 12.5);
        assert!(ranges.get(2).unwrap().is_unbounded());
    }

    #[test]
    fn test_range_display() {
        let range = FeatureRange {
            lower: 2.45,
            upper: f64::INFINITY,
        };
        assert_eq!(range.to_string(), "(2.45, inf]");
    }
}
