//! # dtexplain Core
//!
//! Core library for explaining individual decision-tree predictions.
//! Provides the tree model, path tracer, range deriver, prompt builder,
//! probing-question generator, LLM providers, configuration, and the
//! explainer pipeline tying them together.

pub mod bundle;
pub mod config;
pub mod error;
pub mod explainer;
pub mod features;
pub mod path;
pub mod prompt;
pub mod providers;
pub mod questions;
pub mod ranges;
pub mod tree;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types at the crate root.
pub use bundle::ModelBundle;
pub use config::{ExplainConfig, LlmConfig, OutputConfig, PromptConfig, QuestionConfig};
pub use error::{ConfigError, ExplainError, LlmError, Result, TreeError};
pub use explainer::{ExplanationReport, Explainer, Strategy};
pub use features::{FeatureSchema, RawValue, Record, original_feature_name};
pub use path::{DecisionPath, Direction, PathStep, trace_path};
pub use prompt::{PromptBuilder, RelevantFeature, relevant_features};
pub use providers::{CompletionProvider, MockProvider, OpenAiCompatibleProvider, create_provider};
pub use questions::{ProbeQuestion, QuestionKind, generate_questions};
pub use ranges::{FeatureRange, FeatureRanges, feature_ranges_for_path};
pub use tree::{DecisionTree, TreeArrays};
pub use types::{CompletionRequest, CompletionResponse, Message, Role, TokenUsage};
