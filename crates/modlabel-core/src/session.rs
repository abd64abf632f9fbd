//! Session document files.
//!
//! A session is one JSON object shared by every per-target store; the
//! label store owns only its own keys. Reading a missing file yields an
//! empty session so the first save creates it.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::labels::{LabelStore, LoadSummary, SaveSummary};

/// Read the session object at `path`. A missing file is an empty session.
pub fn read_session(path: &Path) -> Result<Map<String, Value>, CoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => return Err(CoreError::Io(e)),
    };
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(&content).map_err(|source| CoreError::Json {
        path: path.to_path_buf(),
        source,
    })? {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::InvalidDocument(format!(
            "{} holds a JSON {} instead of an object",
            path.display(),
            json_kind(&other)
        ))),
    }
}

/// Pretty-print `session` to `path`, creating parent directories.
pub fn write_session(path: &Path, session: &Map<String, Value>) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(session).map_err(|source| CoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Merge the store's labels into the session at `path`, keeping keys that
/// belong to other stores.
pub fn save_labels(store: &LabelStore, path: &Path) -> Result<SaveSummary, CoreError> {
    let mut session = read_session(path)?;
    let summary = store.save(&mut session);
    write_session(path, &session)?;
    tracing::info!(path = %path.display(), labels = summary.total(), "session saved");
    Ok(summary)
}

/// Replace the store's labels with those in the session at `path`.
pub fn load_labels(
    store: &LabelStore,
    path: &Path,
) -> Result<LoadSummary, CoreError> {
    let session = read_session(path)?;
    let summary = store.load(&Value::Object(session));
    tracing::info!(path = %path.display(), "session loaded");
    Ok(summary)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
