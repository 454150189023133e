//! Patient context carried by an exported document.
//!
//! Responsibilities:
//! - Define the public domain-level patient context
//! - Define the strict wire model used inside the document JSON
//! - Translate between the two
//!
//! Notes:
//! - Field presence is enforced by the wire schema on import; emptiness is checked by the
//!   assembler in `saarthi-core`, which owns the "valid context" rule.

use serde::{Deserialize, Serialize};

// ============================================================================
// Public domain-level types
// ============================================================================

/// Identity and demographic fields attached to an exported document.
///
/// All four fields are required. The birth date is kept as the ISO 8601 text supplied by the
/// caller (`YYYY-MM-DD`); it is passed through, not interpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientContext {
    /// Patient identifier used for resource references (`Patient/<id>`).
    pub id: String,

    /// Display name of the patient.
    pub name: String,

    /// Administrative gender as free text (for example `male`).
    pub gender: String,

    /// Date of birth.
    pub birth_date: String,
}

impl PatientContext {
    /// Create a patient context from its four fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        gender: impl Into<String>,
        birth_date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            gender: gender.into(),
            birth_date: birth_date.into(),
        }
    }

    /// Field names paired with their values, in wire order.
    ///
    /// Used by validators that need to report which field is missing.
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("id", self.id.as_str()),
            ("name", self.name.as_str()),
            ("gender", self.gender.as_str()),
            ("birthDate", self.birth_date.as_str()),
        ]
    }
}

// ============================================================================
// Wire types (crate-internal)
// ============================================================================

/// Wire representation of the patient object inside a document.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct PatientWire {
    pub id: String,

    pub name: String,

    pub gender: String,

    #[serde(rename = "birthDate")]
    pub birth_date: String,
}

impl From<PatientWire> for PatientContext {
    fn from(wire: PatientWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            gender: wire.gender,
            birth_date: wire.birth_date,
        }
    }
}

impl From<&PatientContext> for PatientWire {
    fn from(patient: &PatientContext) -> Self {
        Self {
            id: patient.id.clone(),
            name: patient.name.clone(),
            gender: patient.gender.clone(),
            birth_date: patient.birth_date.clone(),
        }
    }
}
