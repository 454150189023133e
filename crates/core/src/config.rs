//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the client and
//! session. Nothing in this crate reads environment variables while handling a command.

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_ARTIFACT_DIR, DEFAULT_CLIENT_ID, DEFAULT_CLIENT_SECRET,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_SCOPE, DEFAULT_TOP_K,
};
use crate::credentials::ClientCredentials;
use crate::validation::{validate_api_base, validate_top_k};
use crate::{CodingError, CodingResult};
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    api_base: Url,
    credentials: ClientCredentials,
    top_k: u32,
    artifact_dir: PathBuf,
    http_timeout: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        api_base: &str,
        credentials: ClientCredentials,
        top_k: u32,
        artifact_dir: PathBuf,
        http_timeout: Duration,
    ) -> CodingResult<Self> {
        let api_base = validate_api_base(api_base)?;
        let top_k = validate_top_k(top_k)?;

        if credentials.client_id.trim().is_empty() {
            return Err(CodingError::InvalidInput(
                "client_id cannot be empty".into(),
            ));
        }

        if http_timeout.is_zero() {
            return Err(CodingError::InvalidInput(
                "HTTP timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            api_base,
            credentials,
            top_k,
            artifact_dir,
            http_timeout,
        })
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }
}

/// Resolve configuration from the process environment.
///
/// Intended to be called once from a binary's `main`, after `.env` has been loaded.
///
/// # Environment Variables
/// - `SAARTHI_API_BASE` (default: `http://localhost:8000/v1`)
/// - `SAARTHI_CLIENT_ID`, `SAARTHI_CLIENT_SECRET`
/// - `SAARTHI_SCOPE`: space-delimited capabilities
/// - `SAARTHI_TOP_K` (default: 10)
/// - `SAARTHI_ARTIFACT_DIR` (default: current directory)
/// - `SAARTHI_HTTP_TIMEOUT_SECS` (default: 30)
pub fn resolve_from_env() -> CodingResult<CoreConfig> {
    let var = |name: &str| std::env::var(name).ok();

    let api_base = non_empty(var("SAARTHI_API_BASE")).unwrap_or_else(|| DEFAULT_API_BASE.into());
    let credentials = ClientCredentials::new(
        non_empty(var("SAARTHI_CLIENT_ID")).unwrap_or_else(|| DEFAULT_CLIENT_ID.into()),
        non_empty(var("SAARTHI_CLIENT_SECRET")).unwrap_or_else(|| DEFAULT_CLIENT_SECRET.into()),
        scope_from_env_value(var("SAARTHI_SCOPE")),
    );
    let artifact_dir = non_empty(var("SAARTHI_ARTIFACT_DIR"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACT_DIR));

    CoreConfig::new(
        &api_base,
        credentials,
        top_k_from_env_value(var("SAARTHI_TOP_K"))?,
        artifact_dir,
        timeout_from_env_value(var("SAARTHI_HTTP_TIMEOUT_SECS"))?,
    )
}

/// Parse `topK` from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default.
pub fn top_k_from_env_value(value: Option<String>) -> CodingResult<u32> {
    match non_empty(value) {
        None => Ok(DEFAULT_TOP_K),
        Some(v) => v
            .parse::<u32>()
            .map_err(|e| CodingError::InvalidInput(format!("SAARTHI_TOP_K '{v}' is not a number: {e}"))),
    }
}

/// Parse the request timeout in seconds from an optional string value.
pub fn timeout_from_env_value(value: Option<String>) -> CodingResult<Duration> {
    match non_empty(value) {
        None => Ok(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)),
        Some(v) => v.parse::<u64>().map(Duration::from_secs).map_err(|e| {
            CodingError::InvalidInput(format!("SAARTHI_HTTP_TIMEOUT_SECS '{v}' is not a number: {e}"))
        }),
    }
}

/// Split a space-delimited scope value, falling back to the default scope.
pub fn scope_from_env_value(value: Option<String>) -> Vec<String> {
    let value = non_empty(value).unwrap_or_else(|| DEFAULT_SCOPE.into());
    value.split_whitespace().map(str::to_string).collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> ClientCredentials {
        ClientCredentials::new(DEFAULT_CLIENT_ID, DEFAULT_CLIENT_SECRET, ["read:codes"])
    }

    #[test]
    fn new_normalises_base_and_keeps_values() {
        let cfg = CoreConfig::new(
            "http://coding.example.org/v1",
            credentials(),
            5,
            PathBuf::from("out"),
            Duration::from_secs(3),
        )
        .expect("valid config");

        assert_eq!(cfg.api_base().as_str(), "http://coding.example.org/v1/");
        assert_eq!(cfg.top_k(), 5);
        assert_eq!(cfg.artifact_dir(), Path::new("out"));
        assert_eq!(cfg.http_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn new_rejects_empty_client_id_and_zero_timeout() {
        let mut creds = credentials();
        creds.client_id = " ".into();
        assert!(CoreConfig::new(DEFAULT_API_BASE, creds, 10, PathBuf::from("."), Duration::from_secs(1)).is_err());

        assert!(CoreConfig::new(DEFAULT_API_BASE, credentials(), 10, PathBuf::from("."), Duration::ZERO).is_err());
    }

    #[test]
    fn top_k_defaults_and_parses() {
        assert_eq!(top_k_from_env_value(None).expect("default"), DEFAULT_TOP_K);
        assert_eq!(top_k_from_env_value(Some("  ".into())).expect("default"), DEFAULT_TOP_K);
        assert_eq!(top_k_from_env_value(Some("25".into())).expect("parsed"), 25);
        assert!(top_k_from_env_value(Some("ten".into())).is_err());
    }

    #[test]
    fn timeout_defaults_and_parses() {
        assert_eq!(
            timeout_from_env_value(None).expect("default"),
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)
        );
        assert_eq!(timeout_from_env_value(Some("7".into())).expect("parsed"), Duration::from_secs(7));
        assert!(timeout_from_env_value(Some("-1".into())).is_err());
    }

    #[test]
    fn scope_splits_on_whitespace() {
        assert_eq!(scope_from_env_value(None), vec!["read:codes", "write:bundles"]);
        assert_eq!(scope_from_env_value(Some("read:codes".into())), vec!["read:codes"]);
    }
}
