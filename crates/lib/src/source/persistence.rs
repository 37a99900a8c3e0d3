//! Persistence operations for the in-memory store
//!
//! Saves and loads the complete store state as a versioned JSON document.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use super::{InMemoryStore, StoreError, in_memory::StoreState};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// On-disk layout of the store.
#[derive(Serialize, Deserialize)]
struct SerializableStore {
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    #[serde(flatten)]
    state: StoreState,
}

/// Writes the store to `path` as pretty-printed JSON.
pub(crate) fn save_to_file<P: AsRef<Path>>(store: &InMemoryStore, path: P) -> Result<(), StoreError> {
    let state = store.state.read().unwrap().clone();
    let serializable = SerializableStore {
        version: PERSISTENCE_VERSION,
        state,
    };
    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|source| StoreError::SerializationFailed { source })?;
    std::fs::write(path, json).map_err(|source| StoreError::FileIo { source })
}

/// Reads a store from `path`; a missing file yields an empty store.
pub(crate) fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemoryStore, StoreError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(InMemoryStore::new());
    }
    let json = std::fs::read_to_string(path).map_err(|source| StoreError::FileIo { source })?;
    let serializable: SerializableStore = serde_json::from_str(&json)
        .map_err(|source| StoreError::DeserializationFailed { source })?;
    Ok(InMemoryStore::from_state(serializable.state))
}
