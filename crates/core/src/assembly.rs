//! Bundle assembly: selection snapshot plus patient context into an exportable document.
//!
//! Assembly is a pure function of its inputs. The same patient and selections always give
//! an equal document, which is what makes an export reproducible for round-trip checks.

use crate::selection::SelectionEntry;
use crate::validation::validate_patient_context;
use crate::CodingResult;
use fhir::{ClinicalStatement, Document, PatientContext};

/// Assemble a document from a patient context and selected entries.
///
/// Every entry becomes exactly one condition, in the order given; entries are never merged,
/// even when two share a display label. Procedures are always empty.
///
/// # Errors
///
/// Returns `CodingError::InvalidContext` if a required patient field is empty.
pub fn assemble(patient: &PatientContext, selections: &[SelectionEntry]) -> CodingResult<Document> {
    validate_patient_context(patient)?;

    Ok(Document {
        patient: patient.clone(),
        conditions: selections.iter().map(statement_from).collect(),
        procedures: Vec::new(),
    })
}

fn statement_from(entry: &SelectionEntry) -> ClinicalStatement {
    ClinicalStatement {
        text: entry.display.clone(),
        code: entry.code.clone(),
        display: entry.display.clone(),
    }
}
