use thiserror::Error;

/// Main error type for the match engine
#[derive(Error, Debug)]
pub enum MatchEngineError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem errors (config, catalog import)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed config file
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Candidate retrieval errors
    #[error("Retrieval from '{source_name}' failed: {message}")]
    Retrieval { source_name: String, message: String },

    /// Full-text query that does not follow the rendering contract
    #[error("Invalid full-text query: {0}")]
    InvalidQuery(String),

    /// Catalog store errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Scoring weights rejected by validation
    #[error("Invalid scoring weights: {0}")]
    InvalidWeights(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl MatchEngineError {
    pub fn retrieval(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        MatchEngineError::Retrieval {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

impl From<String> for MatchEngineError {
    fn from(s: String) -> Self {
        MatchEngineError::Other(s)
    }
}

impl From<&str> for MatchEngineError {
    fn from(s: &str) -> Self {
        MatchEngineError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MatchEngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_display() {
        let err = MatchEngineError::retrieval("sqlite", "fts5: syntax error near \".\"");
        assert_eq!(
            err.to_string(),
            "Retrieval from 'sqlite' failed: fts5: syntax error near \".\""
        );
    }

    #[test]
    fn test_from_str() {
        let err: MatchEngineError = "boom".into();
        assert!(matches!(err, MatchEngineError::Other(ref m) if m == "boom"));
    }
}
