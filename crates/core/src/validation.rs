//! Input validation utilities.
//!
//! This module contains functions for validating inputs before they are used to assemble
//! documents or to configure collaborator access.

use crate::constants::MAX_TOP_K;
use crate::{CodingError, CodingResult};
use fhir::PatientContext;
use reqwest::Url;

/// Validates that every required patient field is present and non-blank.
///
/// # Errors
///
/// Returns `CodingError::InvalidContext` naming the first empty field, in wire order
/// (`id`, `name`, `gender`, `birthDate`).
pub fn validate_patient_context(patient: &PatientContext) -> CodingResult<()> {
    for (field, value) in patient.fields() {
        if value.trim().is_empty() {
            return Err(CodingError::InvalidContext(format!(
                "patient {field} is required"
            )));
        }
    }
    Ok(())
}

/// Parses and normalises the collaborator API base URL.
///
/// The result always ends with `/` so that relative endpoint paths join beneath it rather
/// than replacing its last segment.
///
/// # Errors
///
/// Returns `CodingError::InvalidInput` if the URL does not parse, is not http(s), or carries
/// a query string or fragment.
pub fn validate_api_base(value: &str) -> CodingResult<Url> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| CodingError::InvalidInput(format!("invalid API base URL '{value}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(CodingError::InvalidInput(format!(
            "API base URL must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(CodingError::InvalidInput(
            "API base URL must not contain a query or fragment".into(),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Validates the number of suggestions requested per autocoding call.
pub fn validate_top_k(top_k: u32) -> CodingResult<u32> {
    if top_k == 0 || top_k > MAX_TOP_K {
        return Err(CodingError::InvalidInput(format!(
            "topK must be between 1 and {MAX_TOP_K}, got {top_k}"
        )));
    }
    Ok(top_k)
}
