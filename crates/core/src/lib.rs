//! # Saarthi Core
//!
//! Client-side logic for the Saarthi clinical coding workbench.
//!
//! This crate contains:
//! - the selection set and the editing session that owns it
//! - suggestion rendering with a request-sequence guard
//! - document assembly from a selection snapshot
//! - the credential cache and authenticated access to the collaborators
//! - startup configuration and the export artifact writer
//!
//! **No wire schemas**: the document format and its importer live in the `fhir` crate.
//! **No presentation**: console and CLI concerns belong in the binaries.

pub mod artifact;
pub mod assembly;
pub mod client;
pub mod collaborator;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod renderer;
pub mod selection;
pub mod session;
pub mod validation;

pub use assembly::assemble;
pub use client::CodingClient;
pub use collaborator::{Collaborator, HttpCollaborator};
pub use config::CoreConfig;
pub use credentials::{AccessToken, ClientCredentials, CredentialCache, TokenIssuer};
pub use error::{CodingError, CodingResult};
pub use renderer::{render, Presentation, SearchTicket, SelectionToggled, Suggestion};
pub use selection::{SelectionEntry, SelectionSet, ToggleOutcome};
pub use session::{EditingSession, SessionEvent};

// Re-export the document boundary types callers need alongside the session.
pub use fhir::{Bundle, ClinicalStatement, Document, PatientContext};

use constants::{DEMO_PATIENT_BIRTH_DATE, DEMO_PATIENT_GENDER, DEMO_PATIENT_ID, DEMO_PATIENT_NAME};

/// The fixed demo patient used when no patient context is supplied.
pub fn demo_patient() -> PatientContext {
    PatientContext::new(
        DEMO_PATIENT_ID,
        DEMO_PATIENT_NAME,
        DEMO_PATIENT_GENDER,
        DEMO_PATIENT_BIRTH_DATE,
    )
}
