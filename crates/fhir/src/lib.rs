//! FHIR wire/boundary support for the Saarthi coding workbench.
//!
//! This crate provides **wire models** and **format/translation helpers** for the documents a
//! clinician exports and re-imports:
//! - the clinical document (patient context plus coded statements)
//! - the FHIR collection bundle built from such a document
//!
//! This crate focuses on:
//! - serialisation/deserialisation with strict schemas
//! - structural verification on import (never terminology validation)
//! - translation between domain types and wire structs
//!
//! It knows nothing about selections, sessions or network collaborators; those live in
//! `saarthi-core`.

pub mod collection;
pub mod document;
pub mod patient;

// Re-export facades
pub use collection::CollectionBundle;
pub use document::Bundle;

// Re-export public domain-level types
pub use collection::BundleSummary;
pub use document::{ClinicalStatement, Document};
pub use patient::PatientContext;

/// Terminology namespace URI for ICD-11 codes.
pub const ICD_SYSTEM_URI: &str = "http://id.who.int/icd/release/11";

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("schema mismatch at {path}: {reason}")]
    Schema { path: String, reason: String },

    #[error("failed to render JSON: {0}")]
    Render(serde_json::Error),
}

impl FhirError {
    /// Build a schema error, normalising an empty serde path to `<root>`.
    pub(crate) fn schema(path: &str, reason: &dyn std::fmt::Display) -> Self {
        let path = if path.is_empty() || path == "." {
            "<root>"
        } else {
            path
        };
        FhirError::Schema {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
