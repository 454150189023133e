use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CodingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("authentication failed: {0}")]
    AuthFailure(String),

    #[error("invalid patient context: {0}")]
    InvalidContext(String),

    #[error("document error: {0}")]
    Document(#[from] fhir::FhirError),

    /// A protected call was answered with 401/403. Consumed by the retry-once logic in
    /// [`crate::client::CodingClient`]; callers only see it if they talk to a
    /// [`crate::collaborator::Collaborator`] directly.
    #[error("{endpoint} rejected the bearer token (HTTP {status})")]
    Unauthorized { endpoint: &'static str, status: u16 },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Collaborator {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("request to collaborator failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to write artifact {path}: {source}", path = path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize bundle: {0}")]
    Serialization(serde_json::Error),
}

pub type CodingResult<T> = std::result::Result<T, CodingError>;
