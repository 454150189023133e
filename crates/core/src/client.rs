//! Authenticated access to the collaborators.
//!
//! [`CodingClient`] pairs a [`Collaborator`] with the session's [`CredentialCache`]. Every
//! protected call runs through one discipline: take the cached bearer (acquiring it if
//! absent), make the call, and if the collaborator rejects the token, drop it, acquire a new
//! one and retry exactly once. A second rejection is an `AuthFailure`.

use crate::collaborator::{AutocodeRequest, Collaborator};
use crate::credentials::{AccessToken, ClientCredentials, CredentialCache};
use crate::renderer::Suggestion;
use crate::{CodingError, CodingResult};
use fhir::Document;
use std::future::Future;

pub struct CodingClient<C> {
    collaborator: C,
    credentials: CredentialCache,
    top_k: u32,
}

impl<C: Collaborator> CodingClient<C> {
    pub fn new(collaborator: C, credentials: ClientCredentials, top_k: u32) -> Self {
        Self {
            collaborator,
            credentials: CredentialCache::new(credentials),
            top_k,
        }
    }

    pub fn collaborator(&self) -> &C {
        &self.collaborator
    }

    pub fn credentials(&self) -> &CredentialCache {
        &self.credentials
    }

    /// Acquire a token now instead of on the first protected call.
    pub async fn login(&self) -> CodingResult<()> {
        self.credentials.bearer(&self.collaborator).await.map(|_| ())
    }

    /// Ask the autocoding collaborator for suggestions matching `text`.
    pub async fn autocode(&self, text: &str) -> CodingResult<Vec<Suggestion>> {
        let request = AutocodeRequest {
            text: text.to_string(),
            top_k: self.top_k,
        };
        let request = &request;

        let response = self
            .with_bearer(|token| async move { self.collaborator.autocode(&token, &request).await })
            .await?;

        let suggestions = response.into_suggestions();
        tracing::debug!(count = suggestions.len(), "autocoding response received");
        Ok(suggestions)
    }

    /// Send `document` to the export collaborator and return its bundle.
    pub async fn export(&self, document: &Document) -> CodingResult<serde_json::Value> {
        let bundle = self
            .with_bearer(|token| async move {
                self.collaborator.export_bundle(&token, document).await
            })
            .await?;

        tracing::info!(conditions = document.conditions.len(), "document exported");
        Ok(bundle)
    }

    /// Send a previously exported artifact to the import collaborator.
    pub async fn reimport(&self, raw: &[u8]) -> CodingResult<serde_json::Value> {
        let ack = self
            .with_bearer(|token| async move { self.collaborator.import_bundle(&token, raw).await })
            .await?;

        tracing::info!(bytes = raw.len(), "artifact re-imported");
        Ok(ack)
    }

    async fn with_bearer<T, F, Fut>(&self, call: F) -> CodingResult<T>
    where
        F: Fn(AccessToken) -> Fut,
        Fut: Future<Output = CodingResult<T>>,
    {
        let token = self.credentials.bearer(&self.collaborator).await?;

        match call(token.clone()).await {
            Err(CodingError::Unauthorized { endpoint, status }) => {
                tracing::warn!(endpoint, status, "bearer token rejected, re-acquiring once");
                self.credentials.invalidate_rejected(&token).await;
                let token = self.credentials.bearer(&self.collaborator).await?;

                call(token).await.map_err(|err| match err {
                    CodingError::Unauthorized { endpoint, status } => CodingError::AuthFailure(
                        format!("{endpoint} rejected a freshly issued token (HTTP {status})"),
                    ),
                    other => other,
                })
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::AutocodeResponse;
    use crate::credentials::TokenIssuer;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory collaborator. Tokens are numbered; only tokens at or above
    /// `min_valid_token` are accepted on protected calls.
    #[derive(Default)]
    struct FakeCollaborator {
        issued: AtomicUsize,
        min_valid_token: usize,
        reject_credentials: bool,
        seen_tokens: Mutex<Vec<String>>,
    }

    impl FakeCollaborator {
        fn check(&self, token: &AccessToken, endpoint: &'static str) -> CodingResult<()> {
            self.seen_tokens
                .lock()
                .expect("lock")
                .push(token.as_str().to_string());
            let n: usize = token
                .as_str()
                .trim_start_matches("tok-")
                .parse()
                .expect("numbered token");
            if n < self.min_valid_token {
                return Err(CodingError::Unauthorized {
                    endpoint,
                    status: 401,
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TokenIssuer for FakeCollaborator {
        async fn issue_token(&self, _credentials: &ClientCredentials) -> CodingResult<AccessToken> {
            if self.reject_credentials {
                return Err(CodingError::AuthFailure("invalid client credentials".into()));
            }
            let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(AccessToken::new(format!("tok-{n}")))
        }
    }

    #[async_trait]
    impl Collaborator for FakeCollaborator {
        async fn autocode(
            &self,
            token: &AccessToken,
            request: &AutocodeRequest,
        ) -> CodingResult<AutocodeResponse> {
            tokio::task::yield_now().await;
            self.check(token, "coding/autocode")?;
            let suggestions = (0..request.top_k.min(2))
                .map(|i| Suggestion::new(format!("C{i}"), request.text.clone(), 1.0))
                .collect();
            Ok(AutocodeResponse {
                query: Some(request.text.clone()),
                suggestions: Some(suggestions),
            })
        }

        async fn export_bundle(
            &self,
            token: &AccessToken,
            document: &Document,
        ) -> CodingResult<serde_json::Value> {
            self.check(token, "fhir/export/bundle")?;
            Ok(fhir::CollectionBundle::build(document)?)
        }

        async fn import_bundle(
            &self,
            token: &AccessToken,
            raw: &[u8],
        ) -> CodingResult<serde_json::Value> {
            self.check(token, "fhir/import/bundle")?;
            let summary = fhir::CollectionBundle::summarize(raw)?;
            Ok(serde_json::json!({"valid": true, "total": summary.total()}))
        }
    }

    fn client(collaborator: FakeCollaborator) -> CodingClient<FakeCollaborator> {
        CodingClient::new(
            collaborator,
            ClientCredentials::new("demo-client-id", "demo-client-secret", ["read:codes"]),
            10,
        )
    }

    fn document() -> Document {
        Document {
            patient: fhir::PatientContext::new("pat1", "Demo Patient", "male", "1985-01-01"),
            conditions: vec![fhir::ClinicalStatement {
                text: "Cholera".into(),
                code: "1A00".into(),
                display: "Cholera".into(),
            }],
            procedures: vec![],
        }
    }

    #[tokio::test]
    async fn acquires_token_on_first_protected_call() {
        let client = client(FakeCollaborator::default());
        assert!(!client.credentials().has_token().await);

        let suggestions = client.autocode("cholera").await.expect("autocode");
        assert_eq!(suggestions.len(), 2);
        assert!(client.credentials().has_token().await);

        client.autocode("cholera").await.expect("autocode");
        assert_eq!(client.collaborator().issued.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_once_after_rejected_token() {
        let client = client(FakeCollaborator {
            min_valid_token: 2,
            ..Default::default()
        });

        client.autocode("cholera").await.expect("retry succeeds");

        let seen = client.collaborator().seen_tokens.lock().expect("lock").clone();
        assert_eq!(seen, vec!["tok-1".to_string(), "tok-2".to_string()]);
    }

    #[tokio::test]
    async fn second_rejection_is_auth_failure() {
        let client = client(FakeCollaborator {
            min_valid_token: 3,
            ..Default::default()
        });

        let err = client.autocode("cholera").await.expect_err("should fail");
        assert!(matches!(err, CodingError::AuthFailure(_)), "{err:?}");
        assert_eq!(client.collaborator().issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_rejections_share_one_reacquisition() {
        let client = client(FakeCollaborator {
            min_valid_token: 2,
            ..Default::default()
        });

        let (first, second) = tokio::join!(client.autocode("cholera"), client.autocode("neoplasm"));
        first.expect("first retry succeeds");
        second.expect("second retry succeeds");

        assert_eq!(client.collaborator().issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rejected_credentials_surface_unmodified() {
        let client = client(FakeCollaborator {
            reject_credentials: true,
            ..Default::default()
        });

        let err = client.login().await.expect_err("should fail");
        match err {
            CodingError::AuthFailure(msg) => assert!(msg.contains("invalid client credentials")),
            other => panic!("expected AuthFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn export_then_reimport() {
        let client = client(FakeCollaborator::default());

        let bundle = client.export(&document()).await.expect("export");
        let raw = serde_json::to_vec(&bundle).expect("serialise");
        let ack = client.reimport(&raw).await.expect("reimport");

        assert_eq!(ack["valid"], true);
        assert_eq!(ack["total"], 3);
    }
}
