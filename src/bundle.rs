//! Leaf records and their on-disk bundle files.
//!
//! A bundle is `<key>.json`: a JSON object mapping field name to string
//! value, written next to the other bundles of the same remote directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::ExportError;

/// Extension of exported bundle files.
pub const BUNDLE_EXTENSION: &str = "json";

/// Fields of one leaf secret.
pub type Fields = BTreeMap<String, String>;

/// One fetched leaf secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafRecord {
    pub name: String,
    pub fields: Fields,
}

impl LeafRecord {
    /// Build a record from the `data` object of a read response.
    pub fn from_payload(name: impl Into<String>, data: &Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            fields: fields_from_object(data),
        }
    }
}

/// Render a JSON value as the text stored in a field file.
fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn fields_from_object(data: &Map<String, Value>) -> Fields {
    data.iter()
        .map(|(field, value)| (field.clone(), field_text(value)))
        .collect()
}

/// Reject names that would escape or collapse the output directory.
pub fn check_file_name(name: &str) -> Result<(), ExportError> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if unsafe_name {
        return Err(ExportError::UnsafeName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// File name of the bundle for a leaf key.
pub fn bundle_file_name(name: &str) -> String {
    format!("{name}.{BUNDLE_EXTENSION}")
}

/// Write one bundle into `dir`, replacing any previous file of that name.
pub async fn write_bundle(dir: &Path, record: &LeafRecord) -> Result<PathBuf, ExportError> {
    check_file_name(&record.name)?;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(ExportError::io(dir))?;

    let path = dir.join(bundle_file_name(&record.name));
    let json = serde_json::to_string_pretty(&record.fields).map_err(|e| {
        ExportError::InvalidBundle {
            path: path.clone(),
            reason: e.to_string(),
        }
    })?;
    tokio::fs::write(&path, json)
        .await
        .map_err(ExportError::io(&path))?;

    tracing::debug!("Wrote bundle {}", path.display());
    Ok(path)
}

/// Write every record as a bundle, returning paths in input order.
pub async fn export_bundles(
    dir: &Path,
    records: &[LeafRecord],
) -> Result<Vec<PathBuf>, ExportError> {
    let mut paths = Vec::with_capacity(records.len());
    for record in records {
        paths.push(write_bundle(dir, record).await?);
    }
    Ok(paths)
}

/// Load the field mapping of a bundle file.
pub async fn read_bundle(path: &Path) -> Result<Fields, ExportError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(ExportError::io(path))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| ExportError::InvalidBundle {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    match value {
        Value::Object(map) => Ok(fields_from_object(&map)),
        _ => Err(ExportError::InvalidBundle {
            path: path.to_path_buf(),
            reason: "expected a JSON object".to_string(),
        }),
    }
}
