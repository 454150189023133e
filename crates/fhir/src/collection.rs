//! FHIR collection bundle built from an exported document.
//!
//! The export collaborator answers with a FHIR `Bundle` of type `collection`. This module
//! builds the same shape locally (for offline export) and summarises a downloaded bundle by
//! counting its resources.
//!
//! Resource ids follow a fixed scheme: `enc1` for the single encounter, `cond<i>` and
//! `proc<j>` for statements by position. Every clinical resource references
//! `Patient/<patient id>`.

use crate::document::{ClinicalStatement, Document};
use crate::{FhirError, FhirResult, ICD_SYSTEM_URI};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Resource types that always appear in a summary, even with a zero count.
const SUMMARY_RESOURCE_TYPES: [&str; 4] = ["Patient", "Encounter", "Condition", "Procedure"];

/// Resource counts for a bundle, keyed by `resourceType`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleSummary {
    counts: BTreeMap<String, usize>,
}

impl BundleSummary {
    fn new() -> Self {
        let counts = SUMMARY_RESOURCE_TYPES
            .iter()
            .map(|name| (name.to_string(), 0))
            .collect();
        Self { counts }
    }

    fn record(&mut self, resource_type: &str) {
        *self.counts.entry(resource_type.to_string()).or_insert(0) += 1;
    }

    /// Number of resources of the given type.
    pub fn count(&self, resource_type: &str) -> usize {
        self.counts.get(resource_type).copied().unwrap_or(0)
    }

    /// Total number of entries in the bundle.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

impl fmt::Display for BundleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(name, count)| format!("{name}={count}"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Collection bundle operations.
///
/// This is a zero-sized type used for namespacing collection-bundle operations.
pub struct CollectionBundle;

impl CollectionBundle {
    /// Build a FHIR collection bundle from a document.
    ///
    /// Entry order is: patient, encounter, conditions in document order, procedures in
    /// document order.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Render`] if the bundle cannot be converted to JSON.
    pub fn build(document: &Document) -> FhirResult<serde_json::Value> {
        let patient_id = document.patient.id.clone();
        let subject = || ReferenceWire {
            reference: format!("Patient/{patient_id}"),
        };

        let mut entry = Vec::with_capacity(2 + document.conditions.len() + document.procedures.len());

        entry.push(EntryWire {
            resource: ResourceWire::Patient(PatientResourceWire {
                id: document.patient.id.clone(),
                name: vec![HumanNameWire {
                    text: document.patient.name.clone(),
                }],
                gender: document.patient.gender.clone(),
                birth_date: document.patient.birth_date.clone(),
            }),
        });

        entry.push(EntryWire {
            resource: ResourceWire::Encounter(EncounterResourceWire {
                id: "enc1".into(),
                subject: subject(),
            }),
        });

        for (i, statement) in document.conditions.iter().enumerate() {
            entry.push(EntryWire {
                resource: ResourceWire::Condition(coded_resource(
                    format!("cond{i}"),
                    subject(),
                    statement,
                )),
            });
        }

        for (j, statement) in document.procedures.iter().enumerate() {
            entry.push(EntryWire {
                resource: ResourceWire::Procedure(coded_resource(
                    format!("proc{j}"),
                    subject(),
                    statement,
                )),
            });
        }

        let bundle = BundleWire {
            resource_type: "Bundle".into(),
            bundle_type: "collection".into(),
            entry,
        };

        serde_json::to_value(&bundle).map_err(FhirError::Render)
    }

    /// Summarise a raw FHIR bundle by counting its entries per resource type.
    ///
    /// Only the bundle and resource headers are inspected; resource bodies are not validated.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Parse`] if `raw` is not JSON, and [`FhirError::Schema`] if the root
    /// is not a `Bundle` or an entry has no `resource.resourceType`.
    pub fn summarize(raw: &[u8]) -> FhirResult<BundleSummary> {
        let value: serde_json::Value = serde_json::from_slice(raw)?;

        let wire = serde_path_to_error::deserialize::<_, BundleHeaderWire>(value)
            .map_err(|err| FhirError::schema(&err.path().to_string(), err.inner()))?;

        if wire.resource_type != "Bundle" {
            return Err(FhirError::schema(
                "resourceType",
                &format!("expected 'Bundle', got '{}'", wire.resource_type),
            ));
        }

        let mut summary = BundleSummary::new();
        for entry in &wire.entry {
            summary.record(&entry.resource.resource_type);
        }
        Ok(summary)
    }
}

fn coded_resource(
    id: String,
    subject: ReferenceWire,
    statement: &ClinicalStatement,
) -> CodedResourceWire {
    CodedResourceWire {
        id,
        subject,
        code: CodeableConceptWire {
            coding: vec![CodingWire {
                system: ICD_SYSTEM_URI.into(),
                code: statement.code.clone(),
                display: statement.display.clone(),
            }],
            text: statement.display.clone(),
        },
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Serialize)]
struct BundleWire {
    #[serde(rename = "resourceType")]
    resource_type: String,

    #[serde(rename = "type")]
    bundle_type: String,

    entry: Vec<EntryWire>,
}

#[derive(Serialize)]
struct EntryWire {
    resource: ResourceWire,
}

#[derive(Serialize)]
#[serde(tag = "resourceType")]
enum ResourceWire {
    Patient(PatientResourceWire),
    Encounter(EncounterResourceWire),
    Condition(CodedResourceWire),
    Procedure(CodedResourceWire),
}

#[derive(Serialize)]
struct PatientResourceWire {
    id: String,
    name: Vec<HumanNameWire>,
    gender: String,

    #[serde(rename = "birthDate")]
    birth_date: String,
}

#[derive(Serialize)]
struct HumanNameWire {
    text: String,
}

#[derive(Serialize)]
struct EncounterResourceWire {
    id: String,
    subject: ReferenceWire,
}

#[derive(Serialize)]
struct CodedResourceWire {
    id: String,
    subject: ReferenceWire,
    code: CodeableConceptWire,
}

#[derive(Serialize)]
struct ReferenceWire {
    reference: String,
}

#[derive(Serialize)]
struct CodeableConceptWire {
    coding: Vec<CodingWire>,
    text: String,
}

#[derive(Serialize)]
struct CodingWire {
    system: String,
    code: String,
    display: String,
}

/// Header-only view of a bundle used for summaries.
#[derive(Deserialize)]
struct BundleHeaderWire {
    #[serde(rename = "resourceType")]
    resource_type: String,

    #[serde(default)]
    entry: Vec<EntryHeaderWire>,
}

#[derive(Deserialize)]
struct EntryHeaderWire {
    resource: ResourceHeaderWire,
}

#[derive(Deserialize)]
struct ResourceHeaderWire {
    #[serde(rename = "resourceType")]
    resource_type: String,
}
