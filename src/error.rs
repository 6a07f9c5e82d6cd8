//! Error types for QueryTube.

use thiserror::Error;

/// Library-level error type for QueryTube operations.
#[derive(Error, Debug)]
pub enum QueryTubeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for QueryTube operations.
pub type Result<T> = std::result::Result<T, QueryTubeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reqwest_builder_failure_is_http_error() {
        let err = reqwest::Client::new().get("not a url").build().unwrap_err();
        let err: QueryTubeError = err.into();

        assert!(matches!(err, QueryTubeError::Http(_)));
        assert!(err.to_string().starts_with("HTTP error:"));
    }
}
