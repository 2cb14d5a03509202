//! Export pipeline errors.
//!
//! Every variant is fatal for the run and names the path, key or file that
//! caused it.

use std::path::PathBuf;

use thiserror::Error;

use crate::vault::VaultError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Data for '{path}' was not found in Vault")]
    NotFound { path: String },

    #[error("No keys were found under '{path}' in Vault")]
    MalformedListing { path: String },

    #[error("Cannot tell whether '{key}' under '{path}' is a secret or a directory")]
    AmbiguousNode { path: String, key: String },

    #[error("Failed to read from or find the path '{path}' in Vault: {source}")]
    Transport {
        path: String,
        #[source]
        source: VaultError,
    },

    #[error("Field '{field}' in {} looks like base64 but does not decode: {source}", .bundle.display())]
    Decode {
        bundle: PathBuf,
        field: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Invalid bundle {}: {reason}", .path.display())]
    InvalidBundle { path: PathBuf, reason: String },

    #[error("Refusing to use '{name}' as a file name")]
    UnsafeName { name: String },

    #[error("'{name}' under '{path}' would be both a bundle file and a directory")]
    NameCollision { path: String, name: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Secret path is empty")]
    EmptyPath,
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ExportError::Io { path, source }
    }

    pub(crate) fn transport(path: &str) -> impl FnOnce(VaultError) -> Self + '_ {
        move |source| ExportError::Transport {
            path: path.to_string(),
            source,
        }
    }
}
