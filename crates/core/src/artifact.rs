//! Downloadable export artifact.
//!
//! The bundle returned by the export collaborator is offered as a file named with the fixed
//! application prefix and a `.json` extension. An existing file of that name is overwritten.

use crate::constants::{ARTIFACT_EXTENSION, ARTIFACT_PREFIX};
use crate::{CodingError, CodingResult};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the export artifact (`saarthi-bundle.json`).
pub fn artifact_file_name() -> String {
    format!("{ARTIFACT_PREFIX}.{ARTIFACT_EXTENSION}")
}

/// Write `bundle` as indented JSON into `dir` and return the written path.
///
/// `dir` is created if it does not exist.
///
/// # Errors
///
/// Returns `CodingError::Serialization` if the bundle cannot be rendered and
/// `CodingError::ArtifactWrite` if the directory or file cannot be written.
pub fn write_artifact(dir: &Path, bundle: &serde_json::Value) -> CodingResult<PathBuf> {
    let path = dir.join(artifact_file_name());
    let bytes = serde_json::to_vec_pretty(bundle).map_err(CodingError::Serialization)?;

    fs::create_dir_all(dir).map_err(|source| CodingError::ArtifactWrite {
        path: dir.to_path_buf(),
        source,
    })?;
    fs::write(&path, bytes).map_err(|source| CodingError::ArtifactWrite {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), "export artifact written");
    Ok(path)
}
