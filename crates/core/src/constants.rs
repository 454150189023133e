//! Constants used throughout the Saarthi core crate.
//!
//! Collaborator endpoint paths, defaults for startup configuration, the artifact naming scheme
//! and the demo patient context live here so the binaries and tests agree on them.

pub use fhir::ICD_SYSTEM_URI;

/// Default base URL of the collaborator API (includes the version prefix).
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/v1";

/// Default OAuth-style client identifier presented to the auth collaborator.
pub const DEFAULT_CLIENT_ID: &str = "demo-client-id";

/// Default client secret presented to the auth collaborator.
pub const DEFAULT_CLIENT_SECRET: &str = "demo-client-secret";

/// Default space-delimited capability scope requested with each token.
pub const DEFAULT_SCOPE: &str = "read:codes write:bundles";

/// Number of suggestions requested per autocoding call when not configured.
pub const DEFAULT_TOP_K: u32 = 10;

/// Upper bound accepted for the configured `topK`.
pub const MAX_TOP_K: u32 = 100;

/// Default timeout applied to every collaborator request.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default directory for downloaded export artifacts.
pub const DEFAULT_ARTIFACT_DIR: &str = ".";

/// Fixed application prefix of the export artifact file name.
pub const ARTIFACT_PREFIX: &str = "saarthi-bundle";

/// Extension of the export artifact file name.
pub const ARTIFACT_EXTENSION: &str = "json";

/// Token endpoint, relative to the API base.
pub const TOKEN_PATH: &str = "auth/token";

/// Autocoding endpoint, relative to the API base.
pub const AUTOCODE_PATH: &str = "coding/autocode";

/// Bundle export endpoint, relative to the API base.
pub const EXPORT_PATH: &str = "fhir/export/bundle";

/// Bundle import endpoint, relative to the API base.
pub const IMPORT_PATH: &str = "fhir/import/bundle";

/// Demo patient identifier.
pub const DEMO_PATIENT_ID: &str = "pat1";

/// Demo patient display name.
pub const DEMO_PATIENT_NAME: &str = "Demo Patient";

/// Demo patient gender.
pub const DEMO_PATIENT_GENDER: &str = "male";

/// Demo patient date of birth.
pub const DEMO_PATIENT_BIRTH_DATE: &str = "1985-01-01";
