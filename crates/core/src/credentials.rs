//! Credential cache for the session's bearer token.
//!
//! The cache holds at most one token. A protected call asks for a bearer; if none is cached
//! one is acquired from the [`TokenIssuer`] first. The lock is held across acquisition, so
//! callers that arrive while a login is pending wait for it instead of logging in again.

use crate::CodingResult;
use async_trait::async_trait;
use std::fmt;
use tokio::sync::Mutex;

/// Client credentials presented to the auth collaborator.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,

    /// Requested capabilities, for example `read:codes`.
    pub scope: Vec<String>,
}

impl ClientCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: scope.into_iter().map(Into::into).collect(),
        }
    }

    /// Scope in its space-delimited wire form.
    pub fn scope_param(&self) -> String {
        self.scope.join(" ")
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Opaque bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Source of access tokens (the auth collaborator).
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Exchange client credentials for an access token.
    ///
    /// Implementations report unreachable collaborators and rejected credentials as
    /// `CodingError::AuthFailure`.
    async fn issue_token(&self, credentials: &ClientCredentials) -> CodingResult<AccessToken>;
}

pub struct CredentialCache {
    credentials: ClientCredentials,
    token: Mutex<Option<AccessToken>>,
}

impl CredentialCache {
    pub fn new(credentials: ClientCredentials) -> Self {
        Self {
            credentials,
            token: Mutex::new(None),
        }
    }

    /// Return the cached token, acquiring one from `issuer` if none is cached.
    ///
    /// A failed acquisition leaves the cache empty and is returned unchanged.
    pub async fn bearer<I>(&self, issuer: &I) -> CodingResult<AccessToken>
    where
        I: TokenIssuer + ?Sized,
    {
        let mut slot = self.token.lock().await;
        if let Some(token) = slot.as_ref() {
            tracing::debug!("reusing cached access token");
            return Ok(token.clone());
        }

        tracing::info!(client_id = %self.credentials.client_id, "acquiring access token");
        let token = issuer.issue_token(&self.credentials).await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token if it is still `rejected`, so the next protected call acquires a
    /// fresh one.
    ///
    /// A token issued after `rejected` is kept. Returns whether the cache was cleared.
    pub async fn invalidate_rejected(&self, rejected: &AccessToken) -> bool {
        let mut slot = self.token.lock().await;
        if slot.as_ref() == Some(rejected) {
            slot.take();
            true
        } else {
            false
        }
    }

    pub async fn has_token(&self) -> bool {
        self.token.lock().await.is_some()
    }
}
