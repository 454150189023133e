//! Network collaborators: token issuance, autocoding, bundle export and bundle import.
//!
//! [`Collaborator`] is the seam between the session logic and the remote services. The HTTP
//! implementation maps each operation to one endpoint under the configured API base.
//!
//! Status handling for protected calls:
//! - 401/403 → `CodingError::Unauthorized` (the client re-acquires a token and retries once)
//! - any other non-success → `CodingError::Collaborator` with status and body, unmodified
//! - connection/timeout/decoding faults → `CodingError::Transport`

use crate::config::CoreConfig;
use crate::constants::{AUTOCODE_PATH, EXPORT_PATH, IMPORT_PATH, TOKEN_PATH};
use crate::credentials::{AccessToken, ClientCredentials, TokenIssuer};
use crate::renderer::Suggestion;
use crate::{CodingError, CodingResult};
use async_trait::async_trait;
use fhir::{Bundle, Document};
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of an autocoding request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocodeRequest {
    pub text: String,

    #[serde(rename = "topK")]
    pub top_k: u32,
}

/// Body of an autocoding response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AutocodeResponse {
    /// Echo of the query text, when the collaborator sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// `null` and a missing field both mean no suggestions.
    #[serde(default)]
    pub suggestions: Option<Vec<Suggestion>>,
}

impl AutocodeResponse {
    /// The suggestions in collaborator order. Entries with a blank code cannot be selected and
    /// are dropped.
    pub fn into_suggestions(self) -> Vec<Suggestion> {
        let mut suggestions = self.suggestions.unwrap_or_default();
        let received = suggestions.len();
        suggestions.retain(|s| !s.code.trim().is_empty());

        let dropped = received - suggestions.len();
        if dropped > 0 {
            tracing::warn!(dropped, "autocoding response contained suggestions without a code");
        }
        suggestions
    }
}

/// Body of a token response.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// The remote services the workbench talks to.
#[async_trait]
pub trait Collaborator: TokenIssuer {
    async fn autocode(
        &self,
        token: &AccessToken,
        request: &AutocodeRequest,
    ) -> CodingResult<AutocodeResponse>;

    /// Send a document for export. The returned bundle is opaque.
    async fn export_bundle(
        &self,
        token: &AccessToken,
        document: &Document,
    ) -> CodingResult<serde_json::Value>;

    /// Send the raw bytes of a previously exported artifact. The acknowledgement is opaque.
    async fn import_bundle(
        &self,
        token: &AccessToken,
        raw: &[u8],
    ) -> CodingResult<serde_json::Value>;
}

/// [`Collaborator`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpCollaborator {
    http: reqwest::Client,
    base: Url,
}

impl HttpCollaborator {
    /// Create a collaborator client for `base` (which must end with `/`, see
    /// [`crate::validation::validate_api_base`]).
    pub fn new(base: Url, timeout: Duration) -> CodingResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn from_config(cfg: &CoreConfig) -> CodingResult<Self> {
        Self::new(cfg.api_base().clone(), cfg.http_timeout())
    }

    fn endpoint(&self, path: &str) -> CodingResult<Url> {
        self.base
            .join(path)
            .map_err(|e| CodingError::InvalidInput(format!("invalid endpoint path '{path}': {e}")))
    }
}

#[async_trait]
impl TokenIssuer for HttpCollaborator {
    async fn issue_token(&self, credentials: &ClientCredentials) -> CodingResult<AccessToken> {
        let url = self.endpoint(TOKEN_PATH)?;
        let scope = credentials.scope_param();
        let form = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("scope", scope.as_str()),
        ];

        let response = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| CodingError::AuthFailure(format!("auth collaborator unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CodingError::AuthFailure(format!(
                "token request rejected (HTTP {}): {body}",
                status.as_u16()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CodingError::AuthFailure(format!("malformed token response: {e}")))?;

        if token.access_token.trim().is_empty() {
            return Err(CodingError::AuthFailure(
                "token response carried an empty access_token".into(),
            ));
        }

        Ok(AccessToken::new(token.access_token))
    }
}

#[async_trait]
impl Collaborator for HttpCollaborator {
    async fn autocode(
        &self,
        token: &AccessToken,
        request: &AutocodeRequest,
    ) -> CodingResult<AutocodeResponse> {
        let response = self
            .http
            .post(self.endpoint(AUTOCODE_PATH)?)
            .bearer_auth(token.as_str())
            .json(request)
            .send()
            .await?;

        read_protected(AUTOCODE_PATH, response).await
    }

    async fn export_bundle(
        &self,
        token: &AccessToken,
        document: &Document,
    ) -> CodingResult<serde_json::Value> {
        let body = Bundle::render(document)?;
        let response = self
            .http
            .post(self.endpoint(EXPORT_PATH)?)
            .bearer_auth(token.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        read_protected(EXPORT_PATH, response).await
    }

    async fn import_bundle(
        &self,
        token: &AccessToken,
        raw: &[u8],
    ) -> CodingResult<serde_json::Value> {
        let response = self
            .http
            .post(self.endpoint(IMPORT_PATH)?)
            .bearer_auth(token.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(raw.to_vec())
            .send()
            .await?;

        read_protected(IMPORT_PATH, response).await
    }
}

async fn read_protected<T: DeserializeOwned>(
    endpoint: &'static str,
    response: reqwest::Response,
) -> CodingResult<T> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(CodingError::Unauthorized {
            endpoint,
            status: status.as_u16(),
        });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(endpoint, status = status.as_u16(), "collaborator call failed");
        return Err(CodingError::Collaborator {
            endpoint,
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json::<T>().await?)
}
