//! Shared fixtures for unit tests.

use crate::features::{FeatureSchema, RawValue, Record};
use crate::tree::{DecisionTree, TreeArrays};
use std::collections::BTreeMap;

/// A hand-built iris tree:
///
/// ```text
/// 0: petal_length <= 2.45 ? 1 : 2
/// 1: setosa
/// 2: petal_width <= 1.75 ? 3 : 6
/// 3: petal_length <= 4.95 ? 4 : 5
/// 4: versicolor   5: virginica   6: virginica
/// ```
pub(crate) fn iris_arrays() -> TreeArrays {
    TreeArrays {
        children_left: vec![1, -1, 3, 4, -1, -1, -1],
        children_right: vec![2, -1, 6, 5, -1, -1, -1],
        feature: vec![2, -2, 3, 2, -2, -2, -2],
        threshold: vec![2.45, -2.0, 1.75, 4.95, -2.0, -2.0, -2.0],
        n_features: 4,
        value: vec![
            vec![50.0, 50.0, 50.0],
            vec![50.0, 0.0, 0.0],
            vec![0.0, 50.0, 50.0],
            vec![0.0, 49.0, 5.0],
            vec![0.0, 47.0, 1.0],
            vec![0.0, 2.0, 4.0],
            vec![0.0, 1.0, 45.0],
        ],
        classes: vec![
            "setosa".to_string(),
            "versicolor".to_string(),
            "virginica".to_string(),
        ],
    }
}

pub(crate) fn iris_tree() -> DecisionTree {
    DecisionTree::new(iris_arrays()).unwrap()
}

pub(crate) fn iris_feature_names() -> Vec<String> {
    ["sepal_length", "sepal_width", "petal_length", "petal_width"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub(crate) fn iris_schema() -> FeatureSchema {
    FeatureSchema {
        feature_names: iris_feature_names(),
        original_feature_names: iris_feature_names(),
        categorical_columns: Vec::new(),
        feature_descriptions: BTreeMap::new(),
    }
}

/// A mushroom tree mixing a one-hot encoded `odor` column with two
/// continuous measurements:
///
/// ```text
/// 0: odor_none <= 0.5 ? 1 : 4
/// 1: stalk-height <= 6.0 ? 2 : 3
/// 2: poisonous   3: edible
/// 4: cap-diameter <= 12.5 ? 5 : 6
/// 5: edible      6: poisonous
/// ```
pub(crate) fn mushroom_tree() -> DecisionTree {
    DecisionTree::new(TreeArrays {
        children_left: vec![1, 2, -1, -1, 5, -1, -1],
        children_right: vec![4, 3, -1, -1, 6, -1, -1],
        feature: vec![1, 2, -2, -2, 3, -2, -2],
        threshold: vec![0.5, 6.0, -2.0, -2.0, 12.5, -2.0, -2.0],
        n_features: 4,
        value: vec![
            vec![60.0, 40.0],
            vec![20.0, 35.0],
            vec![5.0, 30.0],
            vec![15.0, 5.0],
            vec![40.0, 5.0],
            vec![38.0, 1.0],
            vec![2.0, 4.0],
        ],
        classes: vec!["edible".to_string(), "poisonous".to_string()],
    })
    .unwrap()
}

pub(crate) fn mushroom_schema() -> FeatureSchema {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let mut feature_descriptions = BTreeMap::new();
    feature_descriptions.insert("odor".to_string(), "smell of the mushroom".to_string());
    feature_descriptions.insert(
        "stalk-height".to_string(),
        "height of the stalk in cm".to_string(),
    );
    FeatureSchema {
        feature_names: strings(&["odor_foul", "odor_none", "stalk-height", "cap-diameter"]),
        original_feature_names: strings(&["odor", "stalk-height", "cap-diameter"]),
        categorical_columns: strings(&["odor"]),
        feature_descriptions,
    }
}

/// A foul-smelling mushroom with a short stalk: path `0 -> 1 -> 2`.
pub(crate) fn foul_mushroom() -> Record {
    let mut original = BTreeMap::new();
    original.insert("odor".to_string(), RawValue::Text("foul".to_string()));
    original.insert("stalk-height".to_string(), RawValue::Number(4.0));
    original.insert("cap-diameter".to_string(), RawValue::Number(8.0));
    Record {
        values: vec![1.0, 0.0, 4.0, 8.0],
        original,
        label: None,
    }
}
