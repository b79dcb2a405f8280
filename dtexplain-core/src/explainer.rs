//! The explanation pipeline: trace, bound, explain, probe.

use crate::bundle::ModelBundle;
use crate::config::ExplainConfig;
use crate::error::{ExplainError, LlmError};
use crate::features::{FeatureSchema, Record};
use crate::path::{DecisionPath, log_path, trace_path};
use crate::prompt::PromptBuilder;
use crate::providers::{CompletionProvider, create_provider};
use crate::questions::{ProbeQuestion, generate_questions};
use crate::ranges::{FeatureRanges, feature_ranges_for_path};
use crate::tree::DecisionTree;
use crate::types::CompletionRequest;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// How the explanation text is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Fill a fixed template from the path.
    RuleBased,
    /// Ask a completion provider for a natural-language explanation.
    Llm,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::RuleBased => f.write_str("rule-based"),
            Strategy::Llm => f.write_str("llm"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rule" | "rule-based" | "rule_based" => Ok(Strategy::RuleBased),
            "llm" => Ok(Strategy::Llm),
            other => Err(format!(
                "unknown strategy '{other}' (expected 'rule' or 'llm')"
            )),
        }
    }
}

/// Everything produced for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationReport {
    pub index: usize,
    pub strategy: Strategy,
    /// Label supplied with the record, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Majority class at the reached leaf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_class: Option<String>,
    /// `Feature x <= t -> LEFT` descriptions, root first.
    pub path: Vec<String>,
    pub explanation: String,
    pub questions: Vec<ProbeQuestion>,
}

impl ExplanationReport {
    /// The explanation, three newlines, then each question followed by its
    /// `True`/`False` answer and a blank line.
    pub fn render(&self) -> String {
        let mut out = format!("{}\n\n\n", self.explanation);
        for q in &self.questions {
            let answer = if q.answer { "True" } else { "False" };
            out.push_str(&format!("{}\n{}\n\n", q.question, answer));
        }
        out
    }
}

/// Explains individual predictions of one decision tree.
pub struct Explainer {
    tree: DecisionTree,
    schema: FeatureSchema,
    labels: Vec<String>,
    config: ExplainConfig,
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl Explainer {
    /// Fails when `schema` does not name exactly the tree's features.
    pub fn new(
        tree: DecisionTree,
        schema: FeatureSchema,
        labels: Vec<String>,
        config: ExplainConfig,
    ) -> Result<Self, ExplainError> {
        schema.check_width(tree.n_features())?;
        Ok(Self {
            tree,
            schema,
            labels,
            config,
            provider: None,
        })
    }

    pub fn from_bundle(bundle: &ModelBundle, config: ExplainConfig) -> Result<Self, ExplainError> {
        Self::new(
            bundle.tree.clone(),
            bundle.schema.clone(),
            bundle.labels(),
            config,
        )
    }

    /// Use `provider` instead of building one from the `llm` config section.
    pub fn with_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn config(&self) -> &ExplainConfig {
        &self.config
    }

    fn prompts(&self) -> PromptBuilder<'_> {
        PromptBuilder::new(&self.tree, &self.schema, &self.labels, &self.config.prompt)
    }

    fn provider(&self) -> Result<Arc<dyn CompletionProvider>, LlmError> {
        match &self.provider {
            Some(provider) => Ok(Arc::clone(provider)),
            None => create_provider(&self.config.llm),
        }
    }

    /// The record's path and the value ranges it implies.
    pub fn trace(&self, record: &Record) -> Result<(DecisionPath, FeatureRanges), ExplainError> {
        let path = trace_path(&self.tree, &record.values)?;
        log_path(&path, &self.schema);
        let ranges = feature_ranges_for_path(&self.tree, &path);
        Ok((path, ranges))
    }

    pub fn rule_based_explanation(&self, path: &DecisionPath, record: &Record) -> String {
        self.prompts().rule_based(path, record)
    }

    /// Send the LLM prompt for `record` and return the completion text.
    pub async fn llm_explanation(
        &self,
        path: &DecisionPath,
        record: &Record,
        label: &str,
    ) -> Result<String, ExplainError> {
        let prompt = self.prompts().llm_prompt(path, record, label);
        let provider = self.provider()?;
        let request = CompletionRequest {
            temperature: self.config.llm.temperature,
            max_tokens: self.config.llm.max_tokens,
            ..CompletionRequest::with_system(self.config.llm.system_prompt.clone(), prompt)
        };

        debug!(model = provider.model_name(), label, "Requesting LLM explanation");
        let response = provider.complete(request).await?;
        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "LLM explanation received"
        );
        Ok(response.text)
    }

    /// Probing questions for `record`, seeded from the `questions` config.
    pub fn questions(&self, record: &Record, ranges: &FeatureRanges) -> Vec<ProbeQuestion> {
        let mut rng = match self.config.questions.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        generate_questions(
            &record.values,
            ranges,
            &self.schema,
            self.config.questions.sanity_questions,
            &mut rng,
        )
    }

    /// Run the whole pipeline for the record at `index`.
    pub async fn explain(
        &self,
        index: usize,
        record: &Record,
        strategy: Strategy,
    ) -> Result<ExplanationReport, ExplainError> {
        let (path, ranges) = self.trace(record)?;
        let predicted_class = self.tree.predict_class(path.leaf()).map(String::from);

        let explanation = match strategy {
            Strategy::RuleBased => self.rule_based_explanation(&path, record),
            Strategy::Llm => {
                let label = record
                    .label
                    .clone()
                    .or_else(|| predicted_class.clone())
                    .unwrap_or_else(|| format!("leaf {}", path.leaf()));
                self.llm_explanation(&path, record, &label).await?
            }
        };

        let questions = self.questions(record, &ranges);
        info!(
            index,
            strategy = %strategy,
            leaf = path.leaf(),
            steps = path.steps().len(),
            questions = questions.len(),
            "Explained record"
        );

        Ok(ExplanationReport {
            index,
            strategy,
            label: record.label.clone(),
            predicted_class,
            path: path
                .steps()
                .iter()
                .map(|step| step.describe(self.schema.encoded_name(step.feature)))
                .collect(),
            explanation,
            questions,
        })
    }
}
