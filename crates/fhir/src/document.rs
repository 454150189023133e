//! Exported clinical document (bundle) model, rendering and structural import.
//!
//! The document is the serialisation boundary between the editing session and the export
//! collaborator. Its JSON form is also what a clinician re-imports to check that an export
//! round-trips without loss.
//!
//! Responsibilities:
//! - Define the public domain-level document and clinical statement types
//! - Define a strict wire model for serialisation/deserialisation
//! - Render documents to JSON and import them back with structural checks only
//!
//! Import distinguishes two failure classes:
//! - the bytes are not well-formed JSON ([`FhirError::Parse`])
//! - the JSON does not have the document shape ([`FhirError::Schema`])
//!
//! No partially populated document is ever returned.

use crate::patient::{PatientContext, PatientWire};
use crate::{FhirError, FhirResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// Public domain-level types
// ============================================================================

/// A normalised clinical statement derived from one selected terminology code.
///
/// `text` and `display` are currently both taken from the selection's display label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClinicalStatement {
    pub text: String,
    pub code: String,
    pub display: String,
}

/// The exported artifact: patient context plus clinical statements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub patient: PatientContext,

    /// Conditions in selection order.
    pub conditions: Vec<ClinicalStatement>,

    /// Procedures. Always empty for documents assembled from a code selection; kept as the
    /// slot for further statement kinds.
    pub procedures: Vec<ClinicalStatement>,
}

// ============================================================================
// Public Bundle operations
// ============================================================================

/// Document (bundle) operations.
///
/// This is a zero-sized type used for namespacing document-related operations.
/// All methods are associated functions.
pub struct Bundle;

impl Bundle {
    /// Import a previously exported document from raw bytes.
    ///
    /// This is a format-fidelity check: it verifies structure only and never consults a
    /// terminology system.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Parse`] if `raw` is not well-formed JSON, and
    /// [`FhirError::Schema`] if:
    /// - `patient`, `conditions` or `procedures` is missing,
    /// - a statement lacks `text`, `code` or `display`,
    /// - a patient field is missing,
    /// - any value has an unexpected type,
    /// - unknown keys are present (due to `#[serde(deny_unknown_fields)]`).
    pub fn import(raw: &[u8]) -> FhirResult<Document> {
        let value: serde_json::Value = serde_json::from_slice(raw)?;
        if !value.is_object() {
            return Err(FhirError::schema("", &"expected a JSON object at the document root"));
        }

        let wire = serde_path_to_error::deserialize::<_, DocumentWire>(value)
            .map_err(|err| FhirError::schema(&err.path().to_string(), err.inner()))?;

        Ok(wire.into())
    }

    /// Render a document as compact JSON bytes.
    ///
    /// This is the body sent to the export collaborator.
    pub fn render(document: &Document) -> FhirResult<Vec<u8>> {
        serde_json::to_vec(&DocumentWire::from(document)).map_err(FhirError::Render)
    }

    /// Render a document as indented JSON text for display or saving.
    pub fn render_pretty(document: &Document) -> FhirResult<String> {
        serde_json::to_string_pretty(&DocumentWire::from(document)).map_err(FhirError::Render)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct DocumentWire {
    patient: PatientWire,
    conditions: Vec<StatementWire>,
    procedures: Vec<StatementWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct StatementWire {
    text: String,
    code: String,
    display: String,
}

impl From<DocumentWire> for Document {
    fn from(wire: DocumentWire) -> Self {
        Self {
            patient: wire.patient.into(),
            conditions: wire.conditions.into_iter().map(Into::into).collect(),
            procedures: wire.procedures.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&Document> for DocumentWire {
    fn from(document: &Document) -> Self {
        Self {
            patient: PatientWire::from(&document.patient),
            conditions: document.conditions.iter().map(Into::into).collect(),
            procedures: document.procedures.iter().map(Into::into).collect(),
        }
    }
}

impl From<StatementWire> for ClinicalStatement {
    fn from(wire: StatementWire) -> Self {
        Self {
            text: wire.text,
            code: wire.code,
            display: wire.display,
        }
    }
}

impl From<&ClinicalStatement> for StatementWire {
    fn from(statement: &ClinicalStatement) -> Self {
        Self {
            text: statement.text.clone(),
            code: statement.code.clone(),
            display: statement.display.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(code: &str, display: &str) -> ClinicalStatement {
        ClinicalStatement {
            text: display.to_string(),
            code: code.to_string(),
            display: display.to_string(),
        }
    }

    fn sample_document() -> Document {
        Document {
            patient: PatientContext::new("pat1", "Demo Patient", "male", "1985-01-01"),
            conditions: vec![
                statement("1A00", "Cholera"),
                statement("2C10", "Malignant neoplasm"),
            ],
            procedures: vec![],
        }
    }

    #[test]
    fn round_trips_rendered_document() {
        let document = sample_document();
        let raw = Bundle::render(&document).expect("render document");
        let imported = Bundle::import(&raw).expect("import document");
        assert_eq!(imported, document);
    }

    #[test]
    fn round_trips_pretty_rendering() {
        let document = sample_document();
        let text = Bundle::render_pretty(&document).expect("render document");
        assert!(text.contains('\n'));
        let imported = Bundle::import(text.as_bytes()).expect("import document");
        assert_eq!(imported, document);
    }

    #[test]
    fn preserves_statement_order() {
        let mut document = sample_document();
        document.conditions.reverse();
        let raw = Bundle::render(&document).expect("render document");
        let imported = Bundle::import(&raw).expect("import document");
        assert_eq!(imported.conditions[0].code, "2C10");
        assert_eq!(imported.conditions[1].code, "1A00");
    }

    #[test]
    fn imports_sample_json() {
        let input = br#"{
  "patient": {"id": "pat1", "name": "Demo Patient", "gender": "male", "birthDate": "1985-01-01"},
  "conditions": [{"text": "Cholera", "code": "1A00", "display": "Cholera"}],
  "procedures": []
}"#;

        let document = Bundle::import(input).expect("import sample");
        assert_eq!(document.patient.birth_date, "1985-01-01");
        assert_eq!(document.conditions, vec![statement("1A00", "Cholera")]);
        assert!(document.procedures.is_empty());
    }

    #[test]
    fn rejects_malformed_json_as_parse_error() {
        let err = Bundle::import(b"{\"patient\": ").expect_err("should reject truncated json");
        match err {
            FhirError::Parse(_) => {}
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_utf8_as_parse_error() {
        let err = Bundle::import(&[0xff, 0xfe, 0x00]).expect_err("should reject bytes");
        assert!(matches!(err, FhirError::Parse(_)));
    }

    #[test]
    fn rejects_empty_object_as_schema_error() {
        let err = Bundle::import(b"{}").expect_err("should reject empty object");
        match err {
            FhirError::Schema { path, reason } => {
                assert_eq!(path, "<root>");
                assert!(reason.contains("missing field"));
            }
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_procedures() {
        let input = br#"{
  "patient": {"id": "pat1", "name": "Demo Patient", "gender": "male", "birthDate": "1985-01-01"},
  "conditions": []
}"#;

        let err = Bundle::import(input).expect_err("should reject missing procedures");
        match err {
            FhirError::Schema { reason, .. } => assert!(reason.contains("procedures")),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_statement_without_code() {
        let input = br#"{
  "patient": {"id": "pat1", "name": "Demo Patient", "gender": "male", "birthDate": "1985-01-01"},
  "conditions": [{"text": "Cholera", "display": "Cholera"}],
  "procedures": []
}"#;

        let err = Bundle::import(input).expect_err("should reject statement without code");
        match err {
            FhirError::Schema { path, reason } => {
                assert!(path.contains("conditions"));
                assert!(reason.contains("code"));
            }
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_procedure_without_text() {
        let input = br#"{
  "patient": {"id": "pat1", "name": "Demo Patient", "gender": "male", "birthDate": "1985-01-01"},
  "conditions": [],
  "procedures": [{"code": "X", "display": "Y"}]
}"#;

        let err = Bundle::import(input).expect_err("should reject procedure without text");
        match err {
            FhirError::Schema { reason, .. } => assert!(reason.contains("text")),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_wrong_types() {
        let input = br#"{
  "patient": {"id": "pat1", "name": "Demo Patient", "gender": "male", "birthDate": "1985-01-01"},
  "conditions": "not_an_array",
  "procedures": []
}"#;

        let err = Bundle::import(input).expect_err("should reject wrong type");
        match err {
            FhirError::Schema { path, .. } => assert!(path.contains("conditions")),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_keys() {
        let input = br#"{
  "patient": {"id": "pat1", "name": "Demo Patient", "gender": "male", "birthDate": "1985-01-01"},
  "conditions": [],
  "procedures": [],
  "unexpected_key": true
}"#;

        let err = Bundle::import(input).expect_err("should reject unknown key");
        match err {
            FhirError::Schema { reason, .. } => assert!(reason.contains("unexpected_key")),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_object_root() {
        let err = Bundle::import(b"[]").expect_err("should reject array root");
        assert!(matches!(err, FhirError::Schema { .. }));
    }
}
