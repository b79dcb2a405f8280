//! Error types for the dtexplain core library.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering tree validation, path tracing, LLM completion, and configuration.

/// Top-level error type for the dtexplain core library.
#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Record {index} not found (bundle has {available} records)")]
    RecordNotFound { index: usize, available: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from decision tree validation and traversal.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("Tree has no nodes")]
    Empty,

    #[error("Tree array '{array}' has {actual} entries, expected {expected}")]
    LengthMismatch {
        array: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Node {node} points to child {child}, but the tree has {node_count} nodes")]
    ChildOutOfRange {
        node: usize,
        child: i64,
        node_count: usize,
    },

    #[error("Node {node} splits on feature {feature}, but the tree has {n_features} features")]
    FeatureOutOfRange {
        node: usize,
        feature: i64,
        n_features: usize,
    },

    #[error("Node {node} has {actual} class counts, expected {expected}")]
    ClassCountMismatch {
        node: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Record has {actual} feature values, tree expects {expected}")]
    RecordWidthMismatch { expected: usize, actual: usize },

    #[error("Expected {expected} feature names, got {actual}")]
    FeatureNameMismatch { expected: usize, actual: usize },

    #[error("Node {node} is reachable more than once; child links do not form a tree")]
    NotATree { node: usize },
}

/// Errors from LLM provider interactions.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Unsupported provider '{provider}' (expected one of: {supported})")]
    UnsupportedProvider { provider: String, supported: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// A type alias for results using the top-level `ExplainError`.
pub type Result<T> = std::result::Result<T, ExplainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_llm() {
        let err = ExplainError::Llm(LlmError::ApiRequest {
            message: "connection refused".into(),
        });
        assert_eq!(
            err.to_string(),
            "LLM error: API request failed: connection refused"
        );
    }

    #[test]
    fn test_error_display_tree() {
        let err = ExplainError::Tree(TreeError::RecordWidthMismatch {
            expected: 4,
            actual: 3,
        });
        assert_eq!(
            err.to_string(),
            "Tree error: Record has 3 feature values, tree expects 4"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = ExplainError::Config(ConfigError::Invalid {
            message: ".dtexplain/config.toml already exists".into(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid configuration: .dtexplain/config.toml already exists"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ExplainError = io_err.into();
        assert!(matches!(err, ExplainError::Io(_)));
    }

    #[test]
    fn test_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: ExplainError = serde_err.into();
        assert!(matches!(err, ExplainError::Serialization(_)));
    }

    #[test]
    fn test_tree_error_variants() {
        let err = TreeError::ChildOutOfRange {
            node: 2,
            child: 9,
            node_count: 5,
        };
        assert_eq!(
            err.to_string(),
            "Node 2 points to child 9, but the tree has 5 nodes"
        );

        let err = TreeError::NotATree { node: 7 };
        assert!(err.to_string().starts_with("Node 7 is reachable more than once"));
    }

    #[test]
    fn test_llm_error_variants() {
        let err = LlmError::RateLimited {
            retry_after_secs: 60,
        };
        assert_eq!(err.to_string(), "Rate limited by provider, retry after 60s");
    }
}
