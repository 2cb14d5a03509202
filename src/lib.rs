//! # vault-export
//!
//! Exports a HashiCorp Vault KV subtree to the local filesystem.
//!
//! ## Pipeline
//!
//! ```text
//!   AppRoleAuth ──► Token ──► VaultClient (SecretStore)
//!                                  │
//!        ┌─────────────────────────┘
//!        ▼
//!   tree::list_keys ──► tree::read_level ──► bundle::export_bundles ──► unpack::unpack_bundle
//!        ▲                     │
//!        └── sub-directories ──┘
//! ```
//!
//! Every leaf secret is written as `<key>.json` and then unpacked into a
//! `<key>/` directory with one file per field. Base64 field values are
//! decoded to their raw bytes.
//!
//! ## Modules
//! - `vault`: auth and store traits plus their HTTP implementations
//! - `tree`: listing and leaf/directory classification
//! - `bundle`: leaf records and bundle files
//! - `classify`: base64 detection and decoding
//! - `unpack`: bundle to directory materialization
//! - `export`: the full recursive run

pub mod bundle;
pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod path;
pub mod tree;
pub mod unpack;
pub mod vault;

pub use config::{Config, VaultSettings};
pub use error::ExportError;
pub use export::{ExportSummary, Exporter};
pub use path::SecretPath;
