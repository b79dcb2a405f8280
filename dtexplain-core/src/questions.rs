//! Counterfactual probing questions with heuristic answers.
//!
//! For every feature the path bounds, the generator asks whether moving the
//! value would have changed the outcome. A direction whose bound is infinite
//! cannot leave the leaf's region, so the outcome stays the same (`true`);
//! a finite bound means a large enough move crosses a split (`false`).
//! Two "was this feature considered" questions are appended as a sanity
//! check for whoever reads the explanation.

use crate::features::FeatureSchema;
use crate::ranges::{FeatureRange, FeatureRanges};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What a [`ProbeQuestion`] asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// A categorical feature taking a different category.
    Different,
    /// A continuous feature being significantly larger.
    Larger,
    /// A continuous feature being significantly smaller.
    Smaller,
    /// Whether a feature was used on the path at all.
    Considered,
}

/// A yes/no question about the prediction, with its expected answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeQuestion {
    pub kind: QuestionKind,
    /// Original (dataset) feature name the question is about.
    pub feature: String,
    pub question: String,
    pub answer: bool,
}

impl ProbeQuestion {
    pub fn new(kind: QuestionKind, feature: &str, question: impl Into<String>, answer: bool) -> Self {
        Self {
            kind,
            feature: feature.to_string(),
            question: question.into(),
            answer,
        }
    }
}

/// Question for a categorical feature. Any other category is assumed to
/// change the outcome.
pub fn categorical_questions(feature: &str) -> Vec<ProbeQuestion> {
    vec![ProbeQuestion::new(
        QuestionKind::Different,
        feature,
        format!("If {feature} had been different, would the outcome have been the same?"),
        false,
    )]
}

/// Questions for a continuous feature inside `range`.
///
/// A "larger" question is asked when there is room above the value and a
/// "smaller" one when there is room below it.
pub fn continuous_questions(feature: &str, value: f64, range: &FeatureRange) -> Vec<ProbeQuestion> {
    let mut questions = Vec::new();
    if value < range.upper {
        questions.push(ProbeQuestion::new(
            QuestionKind::Larger,
            feature,
            format!(
                "If {feature} had been significantly larger than {value:.2}, \
                 would the outcome have been the same?"
            ),
            range.upper == f64::INFINITY,
        ));
    }
    if value > range.lower {
        questions.push(ProbeQuestion::new(
            QuestionKind::Smaller,
            feature,
            format!(
                "If {feature} had been significantly smaller than {value:.2}, \
                 would the outcome have been the same?"
            ),
            range.lower == f64::NEG_INFINITY,
        ));
    }
    questions
}

/// Generate probing questions for one record.
///
/// Features whose value sits exactly on a bound, or whose range is
/// unbounded on both sides, are skipped. Every other feature counts as
/// *considered*. Categorical features are asked about once, however many
/// of their one-hot columns the path tests.
///
/// When `sanity_questions` is set, one random continuous feature and one
/// random categorical column are drawn from `rng` and asked about with
/// `Was {feature} considered?`. A draw from an empty pool is skipped.
pub fn generate_questions<R: Rng + ?Sized>(
    values: &[f64],
    ranges: &FeatureRanges,
    schema: &FeatureSchema,
    sanity_questions: bool,
    rng: &mut R,
) -> Vec<ProbeQuestion> {
    let mut questions = Vec::new();
    let mut considered: Vec<&str> = Vec::new();

    for (index, range) in ranges.iter().enumerate() {
        let Some(&value) = values.get(index) else {
            break;
        };
        if value == range.lower || value == range.upper {
            debug!(feature = index, value, "Skipping feature on a range boundary");
            continue;
        }
        if range.is_unbounded() {
            continue;
        }

        let name = schema.original_name(index);
        if schema.is_categorical(name) {
            if considered.contains(&name) {
                continue;
            }
            questions.extend(categorical_questions(name));
        } else {
            questions.extend(continuous_questions(name, value, range));
        }
        if !considered.contains(&name) {
            considered.push(name);
        }
    }

    if sanity_questions {
        let continuous = schema.continuous_names();
        let categorical: Vec<&str> = schema
            .categorical_columns
            .iter()
            .map(String::as_str)
            .collect();
        for (pool, kind) in [(&continuous, "continuous"), (&categorical, "categorical")] {
            match pool.choose(&mut *rng) {
                Some(&feature) => questions.push(ProbeQuestion::new(
                    QuestionKind::Considered,
                    feature,
                    format!("Was {feature} considered?"),
                    considered.contains(&feature),
                )),
                None => warn!(kind, "No features to draw a sanity question from"),
            }
        }
    }

    questions
}
