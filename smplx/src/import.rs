//! Loading and saving parameter files.
//!
//! Only JSON is understood. SMPL-X parameters are also commonly shipped as Python pickles or NumPy
//! archives; those are recognized and rejected with a dedicated error so callers can tell the
//! user why.

use std::path::{Path, PathBuf};

use crate::params::{PoseParameters, PosePatch};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid parameter JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(".{extension} files are binary archives which are not supported; convert them to JSON")]
    UnsupportedBinary { extension: String },
    #[error("Unsupported file format {0:?}; use .json")]
    UnsupportedExtension(String),
    #[error("The {field} values must be finite numbers")]
    NonFinite { field: &'static str },
}

/// Only JSON files are accepted; everything else gets an error explaining why.
fn check_extension(name: &str) -> Result<(), ImportError> {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" => Ok(()),
        "pkl" | "npz" => Err(ImportError::UnsupportedBinary { extension }),
        _ => Err(ImportError::UnsupportedExtension(extension)),
    }
}

/// Parse the contents of a parameter file named `name`. The format is picked from the file
/// extension.
pub fn import_bytes(name: &str, bytes: &[u8]) -> Result<PosePatch, ImportError> {
    check_extension(name)?;
    let patch: PosePatch = serde_json::from_slice(bytes)?;
    if let Some(field) = patch.non_finite_field() {
        return Err(ImportError::NonFinite { field });
    }
    Ok(patch)
}

pub fn import_file(path: impl AsRef<Path>) -> Result<PosePatch, ImportError> {
    let path = path.as_ref();
    let name = path.to_string_lossy();

    // Check the extension before touching the file system.
    check_extension(&name)?;

    let bytes = std::fs::read(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    import_bytes(&name, &bytes)
}

/// Write the full parameter set as pretty printed JSON.
pub fn export_json(path: impl AsRef<Path>, params: &PoseParameters) -> Result<(), ImportError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(params)?;
    std::fs::write(path, json).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
