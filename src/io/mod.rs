//! Layout Persistence
//!
//! Layouts are stored as pretty JSON wrapped in a small versioned envelope.
//! Group bitsets appear in their canonical text form, vectors as `[x, y, z]`.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::path::Path;
use tracing::info;

use crate::collection::{EntryCollection, EntryError};
use crate::constants::LAYOUT_FORMAT_VERSION;

/// Error type for layout load/save
#[derive(Debug, thiserror::Error)]
pub enum LayoutIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Layout format version {found} is newer than supported version {max_supported}")]
    FutureVersion { found: u32, max_supported: u32 },
    #[error("Invalid layout: {0}")]
    Invalid(#[from] EntryError),
}

/// On-disk envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutFile {
    pub format_version: u32,
    pub collection: EntryCollection,
}

#[derive(Serialize)]
struct LayoutFileRef<'a> {
    format_version: u32,
    collection: &'a EntryCollection,
}

pub fn layout_to_json(collection: &EntryCollection) -> Result<String, LayoutIoError> {
    let file = LayoutFileRef {
        format_version: LAYOUT_FORMAT_VERSION,
        collection,
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

pub fn layout_from_json(json: &str) -> Result<EntryCollection, LayoutIoError> {
    let file: LayoutFile = serde_json::from_str(json)?;
    if file.format_version > LAYOUT_FORMAT_VERSION {
        return Err(LayoutIoError::FutureVersion {
            found: file.format_version,
            max_supported: LAYOUT_FORMAT_VERSION,
        });
    }
    file.collection.validate()?;
    Ok(file.collection)
}

pub fn save_layout(
    path: impl AsRef<Path>,
    collection: &EntryCollection,
) -> Result<(), LayoutIoError> {
    let path = path.as_ref();
    std::fs::write(path, layout_to_json(collection)?)?;
    info!(path = %path.display(), entries = collection.entry_count(), "Saved layout");
    Ok(())
}

pub fn load_layout(path: impl AsRef<Path>) -> Result<EntryCollection, LayoutIoError> {
    let path = path.as_ref();
    let collection = layout_from_json(&std::fs::read_to_string(path)?)?;
    info!(path = %path.display(), entries = collection.entry_count(), "Loaded layout");
    Ok(collection)
}

/// SHA3-256 of the collection's JSON form, as lowercase hex.
/// Entry keys are not part of the content.
pub fn content_hash(collection: &EntryCollection) -> Result<String, LayoutIoError> {
    let bytes = serde_json::to_vec(collection)?;
    let digest = Sha3_256::digest(&bytes);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}
