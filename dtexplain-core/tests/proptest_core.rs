//! Property-based tests for path tracing and range derivation using proptest.

use proptest::prelude::*;

use dtexplain_core::features::FeatureSchema;
use dtexplain_core::path::Direction;
use dtexplain_core::questions::{QuestionKind, generate_questions};
use dtexplain_core::{DecisionTree, TreeArrays, feature_ranges_for_path, trace_path};
use rand::SeedableRng;
use rand::rngs::StdRng;

const N_FEATURES: usize = 4;
const MAX_DEPTH: u32 = 4;

/// Build a complete tree of `depth` levels, numbering nodes depth-first the
/// way sklearn does. `splits` supplies `(feature, threshold)` in pre-order.
fn build_tree(depth: u32, splits: &[(usize, f64)]) -> DecisionTree {
    fn grow(
        depth: u32,
        splits: &mut std::slice::Iter<'_, (usize, f64)>,
        arrays: &mut TreeArrays,
    ) -> usize {
        let id = arrays.children_left.len();
        arrays.children_left.push(-1);
        arrays.children_right.push(-1);
        arrays.feature.push(-2);
        arrays.threshold.push(-2.0);
        if depth > 0
            && let Some(&(feature, threshold)) = splits.next()
        {
            arrays.feature[id] = feature as i64;
            arrays.threshold[id] = threshold;
            let left = grow(depth - 1, splits, arrays);
            let right = grow(depth - 1, splits, arrays);
            arrays.children_left[id] = left as i64;
            arrays.children_right[id] = right as i64;
        }
        id
    }

    let mut arrays = TreeArrays {
        children_left: Vec::new(),
        children_right: Vec::new(),
        feature: Vec::new(),
        threshold: Vec::new(),
        n_features: N_FEATURES,
        value: Vec::new(),
        classes: Vec::new(),
    };
    grow(depth, &mut splits.iter(), &mut arrays);
    DecisionTree::new(arrays).unwrap()
}

fn schema() -> FeatureSchema {
    FeatureSchema {
        feature_names: vec![
            "bytes".to_string(),
            "flag_s0".to_string(),
            "flag_sf".to_string(),
            "duration".to_string(),
        ],
        categorical_columns: vec!["flag".to_string()],
        ..FeatureSchema::default()
    }
}

/// Thresholds on a coarse grid so records regularly land on a boundary.
fn threshold() -> impl Strategy<Value = f64> {
    (-8i32..=8).prop_map(|t| t as f64 * 0.5)
}

fn tree_strategy() -> impl Strategy<Value = DecisionTree> {
    (
        1..=MAX_DEPTH,
        prop::collection::vec((0..N_FEATURES, threshold()), (1usize << MAX_DEPTH) - 1),
    )
        .prop_map(|(depth, splits)| build_tree(depth, &splits))
}

fn record_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(prop_oneof![threshold(), -6.0f64..6.0], N_FEATURES)
}

proptest! {
    #[test]
    fn path_runs_from_root_to_leaf(tree in tree_strategy(), values in record_strategy()) {
        let path = trace_path(&tree, &values).unwrap();
        prop_assert_eq!(path.nodes()[0], 0);
        prop_assert!(tree.is_leaf(path.leaf()));
        prop_assert_eq!(path.nodes().len(), path.steps().len() + 1);
        for step in path.steps() {
            match step.direction {
                Direction::Left => prop_assert!(step.value <= step.threshold),
                Direction::Right => prop_assert!(step.value > step.threshold),
            }
        }
    }

    #[test]
    fn record_lies_inside_its_ranges(tree in tree_strategy(), values in record_strategy()) {
        let path = trace_path(&tree, &values).unwrap();
        let ranges = feature_ranges_for_path(&tree, &path);
        prop_assert_eq!(ranges.iter().count(), N_FEATURES);
        for (feature, value) in values.iter().enumerate() {
            let range = ranges.get(feature).unwrap();
            prop_assert!(range.contains(*value), "feature {} value {} outside {}", feature, value, range);
        }
    }

    #[test]
    fn ranges_are_the_tightest_path_bounds(tree in tree_strategy(), values in record_strategy()) {
        let path = trace_path(&tree, &values).unwrap();
        let ranges = feature_ranges_for_path(&tree, &path);
        for (feature, range) in ranges.iter().enumerate() {
            let uppers = path.steps().iter()
                .filter(|s| s.feature == feature && s.direction == Direction::Left)
                .map(|s| s.threshold);
            let lowers = path.steps().iter()
                .filter(|s| s.feature == feature && s.direction == Direction::Right)
                .map(|s| s.threshold);
            prop_assert_eq!(range.upper, uppers.fold(f64::INFINITY, f64::min));
            prop_assert_eq!(range.lower, lowers.fold(f64::NEG_INFINITY, f64::max));
        }
    }

    #[test]
    fn any_point_in_the_ranges_follows_the_same_path(
        tree in tree_strategy(),
        values in record_strategy(),
    ) {
        let path = trace_path(&tree, &values).unwrap();
        let ranges = feature_ranges_for_path(&tree, &path);
        // The upper bound itself is inside `(lower, upper]`.
        let moved: Vec<f64> = ranges
            .iter()
            .zip(&values)
            .map(|(range, &v)| if range.upper.is_finite() { range.upper } else { v })
            .collect();
        let moved_path = trace_path(&tree, &moved).unwrap();
        prop_assert_eq!(moved_path.nodes(), path.nodes());
    }

    #[test]
    fn question_answers_follow_range_bounds(
        tree in tree_strategy(),
        values in record_strategy(),
        seed in any::<u64>(),
    ) {
        let schema = schema();
        let path = trace_path(&tree, &values).unwrap();
        let ranges = feature_ranges_for_path(&tree, &path);
        let mut rng = StdRng::seed_from_u64(seed);
        let questions = generate_questions(&values, &ranges, &schema, true, &mut rng);

        let index_of = |name: &str| schema.feature_names.iter().position(|n| n == name);
        let mut different = 0;
        for q in &questions {
            match q.kind {
                QuestionKind::Larger => {
                    let range = ranges.get(index_of(&q.feature).unwrap()).unwrap();
                    prop_assert_eq!(q.answer, range.upper == f64::INFINITY);
                }
                QuestionKind::Smaller => {
                    let range = ranges.get(index_of(&q.feature).unwrap()).unwrap();
                    prop_assert_eq!(q.answer, range.lower == f64::NEG_INFINITY);
                }
                QuestionKind::Different => {
                    prop_assert_eq!(q.feature.as_str(), "flag");
                    prop_assert!(!q.answer);
                    different += 1;
                }
                QuestionKind::Considered => {}
            }
        }
        prop_assert!(different <= 1);
        let sanity = questions.iter().filter(|q| q.kind == QuestionKind::Considered).count();
        prop_assert_eq!(sanity, 2);
    }
}
