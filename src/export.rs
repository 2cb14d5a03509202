//! Full export run: walk the remote tree, write bundles, unpack them.
//!
//! ```text
//!   queue ──► list_keys ──► read_level ──► export_bundles ──► unpack_bundle
//!     ▲                         │
//!     └──── sub-directories ────┘
//! ```
//!
//! The remote root maps to the output directory; a remote directory
//! `a/b/` below it maps to `<output>/a/b/`.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use crate::bundle::{bundle_file_name, check_file_name, export_bundles};
use crate::error::ExportError;
use crate::path::SecretPath;
use crate::tree::{discover, Level};
use crate::unpack::unpack_bundle;
use crate::vault::SecretStore;

/// What one run wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Remote paths that were listed, in visit order.
    pub visited: Vec<SecretPath>,
    /// Bundle files written.
    pub bundles: Vec<PathBuf>,
    /// Field files written across all bundles.
    pub files_written: usize,
}

/// Reject a level where a bundle file would take the name of a directory,
/// e.g. leaf `a` (bundle `a.json`) next to leaf `a.json` or directory `a.json/`.
fn check_collisions(level: &Level) -> Result<(), ExportError> {
    let dirs: HashSet<&str> = level
        .leaves
        .iter()
        .map(|leaf| leaf.name.as_str())
        .chain(level.directories.iter().map(String::as_str))
        .collect();
    for leaf in &level.leaves {
        let file = bundle_file_name(&leaf.name);
        if dirs.contains(file.as_str()) {
            return Err(ExportError::NameCollision {
                path: level.path.to_string(),
                name: file,
            });
        }
    }
    Ok(())
}

/// Drives the export of one subtree into a local directory.
pub struct Exporter<S> {
    store: S,
    output_dir: PathBuf,
}

impl<S: SecretStore> Exporter<S> {
    pub fn new(store: S, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            output_dir: output_dir.into(),
        }
    }

    /// Export everything below `root`, visiting directories breadth-first
    /// until none are left.
    pub async fn run(&self, root: &SecretPath) -> Result<ExportSummary, ExportError> {
        let mut summary = ExportSummary::default();
        let mut queue = VecDeque::from([(root.clone(), self.output_dir.clone())]);

        while let Some((path, local_dir)) = queue.pop_front() {
            tracing::info!("Current path = '{}'", path);
            let level = discover(&self.store, &path).await?;
            check_collisions(&level)?;

            let bundles = export_bundles(&local_dir, &level.leaves).await?;
            for bundle in &bundles {
                let unpacked = unpack_bundle(bundle).await?;
                summary.files_written += unpacked.files.len();
            }
            summary.bundles.extend(bundles);

            for dir in &level.directories {
                check_file_name(dir)?;
                queue.push_back((path.join(dir), local_dir.join(dir)));
            }
            summary.visited.push(path);
        }

        tracing::info!(
            "Exported {} secrets ({} files) from {} paths under '{}'",
            summary.bundles.len(),
            summary.files_written,
            summary.visited.len(),
            root
        );
        Ok(summary)
    }
}
