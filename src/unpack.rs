//! Bundle decoding into per-secret directories.
//!
//! `alpha.json` becomes `alpha/`, holding one file per field. Base64 fields
//! are written as the decoded bytes, everything else as UTF-8 text.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::bundle::{check_file_name, read_bundle, BUNDLE_EXTENSION};
use crate::classify::decode_field;
use crate::error::ExportError;

/// Files produced from one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedBundle {
    pub bundle: PathBuf,
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Output directory for a bundle: the bundle path minus its extension.
pub fn output_dir_for(bundle: &Path) -> PathBuf {
    bundle.with_extension("")
}

/// Decode one bundle into its output directory.
///
/// Re-running over an unchanged bundle rewrites the same files with the same
/// content.
pub async fn unpack_bundle(bundle: &Path) -> Result<UnpackedBundle, ExportError> {
    let fields = read_bundle(bundle).await?;
    let dir = output_dir_for(bundle);

    // Validate and decode everything before touching the output directory.
    let mut decoded = Vec::with_capacity(fields.len());
    for (field, value) in &fields {
        check_file_name(field)?;
        let content = decode_field(field, value).map_err(|source| ExportError::Decode {
            bundle: bundle.to_path_buf(),
            field: field.clone(),
            source,
        })?;
        decoded.push((dir.join(field), content));
    }

    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(ExportError::io(&dir))?;

    let mut files = Vec::with_capacity(decoded.len());
    for (path, content) in decoded {
        tokio::fs::write(&path, content.as_bytes())
            .await
            .map_err(ExportError::io(&path))?;
        files.push(path);
    }

    tracing::debug!("Unpacked {} into {} files", bundle.display(), files.len());
    Ok(UnpackedBundle {
        bundle: bundle.to_path_buf(),
        dir,
        files,
    })
}

/// Bundle files directly inside `dir`, sorted by name.
pub fn find_bundles(dir: &Path) -> Vec<PathBuf> {
    let mut bundles: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == BUNDLE_EXTENSION))
        .collect();
    bundles.sort();
    bundles
}

/// Decode every bundle found directly inside `dir`.
pub async fn unpack_dir(dir: &Path) -> Result<Vec<UnpackedBundle>, ExportError> {
    let mut unpacked = Vec::new();
    for bundle in find_bundles(dir) {
        unpacked.push(unpack_bundle(&bundle).await?);
    }
    Ok(unpacked)
}
