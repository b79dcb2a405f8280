//! Rule-based explanations and LLM prompts built from a decision path.

use crate::config::PromptConfig;
use crate::features::{FeatureSchema, Record};
use crate::path::DecisionPath;
use crate::tree::DecisionTree;

/// An original feature tested on the path, with the record's value for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevantFeature {
    pub name: String,
    pub value: String,
}

/// One entry per split on `path`, in path order.
///
/// Values come from the record's original (pre-encoding) columns, falling
/// back to the encoded value when a column is absent.
pub fn relevant_features(
    path: &DecisionPath,
    schema: &FeatureSchema,
    record: &Record,
) -> Vec<RelevantFeature> {
    path.steps()
        .iter()
        .map(|step| {
            let name = schema.original_name(step.feature);
            RelevantFeature {
                name: name.to_string(),
                value: record.display_value(name, step.feature),
            }
        })
        .collect()
}

/// `name = value` lines without a trailing newline.
pub fn render_relevant_features(features: &[RelevantFeature]) -> String {
    features
        .iter()
        .map(|f| format!("{} = {}", f.name, f.value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders explanations for a fixed tree, schema, and label set.
pub struct PromptBuilder<'a> {
    tree: &'a DecisionTree,
    schema: &'a FeatureSchema,
    labels: &'a [String],
    config: &'a PromptConfig,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(
        tree: &'a DecisionTree,
        schema: &'a FeatureSchema,
        labels: &'a [String],
        config: &'a PromptConfig,
    ) -> Self {
        Self {
            tree,
            schema,
            labels,
            config,
        }
    }

    fn preamble(&self) -> String {
        format!(
            "Suppose a dataset for {} has the following features:\n{}\n\n\
             The labels are {}.\n\n",
            self.config.dataset,
            self.schema.describe(),
            self.labels.join(" and ")
        )
    }

    /// The template explanation: feature descriptions, labels, the record's
    /// relevant features, and the path verbatim.
    pub fn rule_based(&self, path: &DecisionPath, record: &Record) -> String {
        let relevant = render_relevant_features(&relevant_features(path, self.schema, record));
        format!(
            "{}A new test example has the following relevant features:\n\
             ({})\n\n\
             The new test example took the following path through the tree:\n\
             {}",
            self.preamble(),
            relevant,
            path.render_steps(self.schema)
        )
    }

    /// The prompt asking an LLM to explain, in plain language, why the tree
    /// classified the record as `label`.
    pub fn llm_prompt(&self, path: &DecisionPath, record: &Record, label: &str) -> String {
        let tree_text = self
            .tree
            .export_text(&self.schema.feature_names, self.config.tree_max_depth);
        let relevant = render_relevant_features(&relevant_features(path, self.schema, record));
        format!(
            "{}The following decision tree was build using the above features:\n\
             {}\n\n\
             A new test example has the following relevant features:\n\
             {}\n\n\
             The new test example took the following path through the tree:\n\
             {}\n\n\
             Using inferred background knowledge of the features and {}, explain in simple terms \
             why the decision tree came to the conclusion that the given example is {}.\n\
             Do not refer to the underlying mechanics of the decision tree in any way, and only \
             refer to the features using natural language. Please refer to the feature values in \
             context using parenthesis.",
            self.preamble(),
            tree_text,
            relevant,
            path.render_steps(self.schema),
            self.config.domain,
            label
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::trace_path;
    use crate::test_support::{foul_mushroom, iris_schema, iris_tree, mushroom_schema, mushroom_tree};
    use pretty_assertions::assert_eq;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_relevant_features_use_original_values() {
        let tree = mushroom_tree();
        let record = foul_mushroom();
        let path = trace_path(&tree, &record.values).unwrap();
        let features = relevant_features(&path, &mushroom_schema(), &record);
        assert_eq!(
            render_relevant_features(&features),
            "odor = foul\nstalk-height = 4"
        );
    }

    #[test]
    fn test_relevant_features_fall_back_to_encoded_values() {
        let tree = iris_tree();
        let record = Record::new(vec![6.0, 2.9, 4.5, 1.5]);
        let path = trace_path(&tree, &record.values).unwrap();
        let features = relevant_features(&path, &iris_schema(), &record);
        assert_eq!(
            render_relevant_features(&features),
            "petal_length = 4.5\npetal_width = 1.5\npetal_length = 4.5"
        );
    }

    #[test]
    fn test_rule_based_explanation() {
        let tree = mushroom_tree();
        let schema = mushroom_schema();
        let record = foul_mushroom();
        let labels = labels(&["edible", "poisonous"]);
        let config = PromptConfig::default();
        let builder = PromptBuilder::new(&tree, &schema, &labels, &config);
        let path = trace_path(&tree, &record.values).unwrap();

        let expected = "\
Suppose a dataset for network intrusion detection has the following features:
odor represents the smell of the mushroom,
stalk-height represents the height of the stalk in cm,
cap-diameter represents the cap-diameter

The labels are edible and poisonous.

A new test example has the following relevant features:
(odor = foul
stalk-height = 4)

The new test example took the following path through the tree:
Step 1: Feature odor_none <= 0.50 -> LEFT
Step 2: Feature stalk-height <= 6.00 -> LEFT
";
        assert_eq!(builder.rule_based(&path, &record), expected);
    }

    #[test]
    fn test_llm_prompt() {
        let tree = iris_tree();
        let schema = iris_schema();
        let record = Record::new(vec![5.1, 3.5, 1.4, 0.2]);
        let labels = labels(&["setosa", "versicolor", "virginica"]);
        let config = PromptConfig {
            dataset: "iris species classification".to_string(),
            domain: "botany".to_string(),
            tree_max_depth: 1,
        };
        let builder = PromptBuilder::new(&tree, &schema, &labels, &config);
        let path = trace_path(&tree, &record.values).unwrap();

        let expected = "\
Suppose a dataset for iris species classification has the following features:
sepal_length,
sepal_width,
petal_length,
petal_width

The labels are setosa and versicolor and virginica.

The following decision tree was build using the above features:
|--- petal_length <= 2.45
|   |--- class: setosa
|--- petal_length >  2.45
|   |--- petal_width <= 1.75
|   |   |--- truncated branch of depth 2
|   |--- petal_width >  1.75
|   |   |--- class: virginica


A new test example has the following relevant features:
petal_length = 1.4

The new test example took the following path through the tree:
Step 1: Feature petal_length <= 2.45 -> LEFT


Using inferred background knowledge of the features and botany, explain in simple terms \
why the decision tree came to the conclusion that the given example is setosa.
Do not refer to the underlying mechanics of the decision tree in any way, and only refer \
to the features using natural language. Please refer to the feature values in context \
using parenthesis.";
        assert_eq!(builder.llm_prompt(&path, &record, "setosa"), expected);
    }
}
