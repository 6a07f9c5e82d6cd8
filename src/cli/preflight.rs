//! Pre-flight checks before starting long-running commands.
//!
//! Validates that required configuration is available before the server
//! starts accepting requests that would otherwise fail one by one.

use crate::config::Settings;
use crate::error::{QueryTubeError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Serving answers requires the model API key.
    Serve,
    /// Fetching a transcript has no configuration requirements.
    Transcript,
}

/// Run pre-flight checks for the given operation.
///
/// Returns the model API key when the operation needs one.
pub fn check(operation: Operation, settings: &Settings) -> Result<Option<String>> {
    match operation {
        Operation::Serve => {
            let key = settings.model_api_key()?;
            check_proxy(settings)?;
            Ok(Some(key))
        }
        Operation::Transcript => {
            check_proxy(settings)?;
            Ok(None)
        }
    }
}

/// Check that the configured proxy URL, if any, parses.
fn check_proxy(settings: &Settings) -> Result<()> {
    match settings.transcript.proxy() {
        Some(proxy) => url::Url::parse(proxy)
            .map(|_| ())
            .map_err(|e| QueryTubeError::Config(format!("Invalid proxy URL {}: {}", proxy, e))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_needs_no_key() {
        assert_eq!(check(Operation::Transcript, &Settings::default()).unwrap(), None);
    }

    #[test]
    fn test_serve_requires_key() {
        let mut settings = Settings::default();
        settings.model.api_key_env = "QUERYTUBE_PREFLIGHT_UNSET_KEY".to_string();
        assert!(check(Operation::Serve, &settings).is_err());
    }

    #[test]
    fn test_bad_proxy_is_reported() {
        let mut settings = Settings::default();
        settings.transcript.proxy_url = Some("::not a url::".to_string());
        assert!(matches!(
            check(Operation::Transcript, &settings),
            Err(QueryTubeError::Config(_))
        ));
    }
}
