//! Feature naming and input records.
//!
//! Models are fitted on *encoded* features: categorical dataset columns are
//! one-hot expanded into `{column}_{category}` columns. Explanations and
//! questions talk about the *original* columns, so every encoded name maps
//! back through [`original_feature_name`].

use crate::error::TreeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Map an encoded feature name back to its dataset column.
///
/// `odor_foul` becomes `odor` when `odor` is a categorical column. The split
/// happens on the last underscore, so `stalk_color_above_ring_w` maps to
/// `stalk_color_above_ring`. Names that are not one-hot columns pass through.
pub fn original_feature_name<'a>(encoded: &'a str, categorical_columns: &[String]) -> &'a str {
    match encoded.rsplit_once('_') {
        Some((prefix, _)) if categorical_columns.iter().any(|c| c == prefix) => prefix,
        _ => encoded,
    }
}

/// Names and descriptions of the features a tree was fitted on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    /// Encoded feature names, indexed like the tree's feature ids.
    pub feature_names: Vec<String>,
    /// Dataset columns before encoding. Derived from `feature_names` when empty.
    #[serde(default)]
    pub original_feature_names: Vec<String>,
    /// Dataset columns that were one-hot encoded.
    #[serde(default)]
    pub categorical_columns: Vec<String>,
    /// Free-text description per original column.
    #[serde(default)]
    pub feature_descriptions: BTreeMap<String, String>,
}

impl FeatureSchema {
    /// Check that the schema names every feature the tree can split on.
    pub fn check_width(&self, n_features: usize) -> Result<(), TreeError> {
        if self.feature_names.len() == n_features {
            Ok(())
        } else {
            Err(TreeError::FeatureNameMismatch {
                expected: n_features,
                actual: self.feature_names.len(),
            })
        }
    }

    /// Encoded name of feature `index`.
    pub fn encoded_name(&self, index: usize) -> &str {
        self.feature_names
            .get(index)
            .map(String::as_str)
            .unwrap_or("<unnamed>")
    }

    /// Original column name of feature `index`.
    pub fn original_name(&self, index: usize) -> &str {
        original_feature_name(self.encoded_name(index), &self.categorical_columns)
    }

    pub fn is_categorical(&self, original_name: &str) -> bool {
        self.categorical_columns.iter().any(|c| c == original_name)
    }

    /// Original column names, in dataset order.
    pub fn original_names(&self) -> Vec<&str> {
        if !self.original_feature_names.is_empty() {
            return self
                .original_feature_names
                .iter()
                .map(String::as_str)
                .collect();
        }
        let mut names: Vec<&str> = Vec::new();
        for index in 0..self.feature_names.len() {
            let name = self.original_name(index);
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Original columns that are not categorical.
    pub fn continuous_names(&self) -> Vec<&str> {
        self.original_names()
            .into_iter()
            .filter(|name| !self.is_categorical(name))
            .collect()
    }

    /// One line per original column, joined by `",\n"`.
    ///
    /// With descriptions each line reads `{feature} represents the
    /// {description}`; columns missing from the map repeat their own name.
    pub fn describe(&self) -> String {
        let names = self.original_names();
        let lines: Vec<String> = if self.feature_descriptions.is_empty() {
            names.iter().map(|name| name.to_string()).collect()
        } else {
            names
                .iter()
                .map(|&name| {
                    let description = self
                        .feature_descriptions
                        .get(name)
                        .map(String::as_str)
                        .unwrap_or(name);
                    format!("{name} represents the {description}")
                })
                .collect()
        };
        lines.join(",\n")
    }
}

/// A dataset value before encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Flag(b) => write!(f, "{b}"),
            RawValue::Number(n) => write!(f, "{n}"),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

/// One input to explain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Encoded feature values, indexed like the tree's feature ids.
    pub values: Vec<f64>,
    /// Original column values, keyed by column name.
    #[serde(default)]
    pub original: BTreeMap<String, RawValue>,
    /// Known label for this record, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Record {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            ..Default::default()
        }
    }

    /// Display value for an original column, falling back to the encoded
    /// value of feature `index` when the column is absent.
    pub fn display_value(&self, original_name: &str, index: usize) -> String {
        match self.original.get(original_name) {
            Some(value) => value.to_string(),
            None => self
                .values
                .get(index)
                .map(|v| v.to_string())
                .unwrap_or_default(),
        }
    }
}
