//! Configuration management for vault-export.
//!
//! Configuration is read from environment variables:
//! - `VAULT_ADDR` - Required. Vault address, e.g. `https://vault.example.com`.
//!   A bare host name gets `https://` prepended.
//! - `VAULT_NAMESPACE` - Optional. Enterprise namespace, sent as a header.
//! - `VAULT_MOUNT` - Required. KV mount, e.g. `A/TEST/KV`.
//! - `VAULT_SECRET_PATH` - Optional. Path below the mount to export.
//! - `VAULT_ROLE_ID` - Required. AppRole role id.
//! - `VAULT_SECRET_ID` - Required. AppRole secret id.
//! - `VAULT_SKIP_VERIFY` - Optional. Disable TLS verification. Defaults to `false`.
//! - `VAULT_TIMEOUT_SECS` - Optional. Per-request timeout. Defaults to `30`.
//! - `VAULT_EXPORT_PREFIX_NAMESPACE` - Optional. Use the namespace as the first
//!   segment of the secret path. Defaults to `true`.
//! - `EXPORT_OUTPUT_DIR` - Optional. Output directory. Defaults to current directory.
//! - `EXPORT_DECODE_ONLY` - Optional. Skip Vault and only re-decode the bundles
//!   already in `EXPORT_OUTPUT_DIR`. Defaults to `false`.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::error::ExportError;
use crate::path::SecretPath;

/// Default Vault address.
pub const DEFAULT_ADDRESS: &str = "http://127.0.0.1:8200";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Connection settings shared by the auth and store clients.
#[derive(Debug, Clone)]
pub struct VaultSettings {
    /// Base URL without trailing slash
    pub address: String,

    /// Enterprise namespace (empty when unused)
    pub namespace: String,

    /// Accept invalid TLS certificates
    pub skip_verify: bool,

    /// Timeout applied to every HTTP request
    pub timeout: Duration,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            namespace: String::new(),
            skip_verify: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Export run configuration.
#[derive(Clone)]
pub struct Config {
    pub vault: VaultSettings,

    /// KV mount
    pub mount: String,

    /// Path below the mount
    pub path: String,

    /// AppRole role id
    pub role_id: String,

    /// AppRole secret id
    pub secret_id: String,

    /// Where bundles and unpacked secrets are written
    pub output_dir: PathBuf,

    /// Whether the namespace prefixes the secret path
    pub prefix_namespace: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("vault", &self.vault)
            .field("mount", &self.mount)
            .field("path", &self.path)
            .field("role_id", &self.role_id)
            .field("secret_id", &"<redacted>")
            .field("output_dir", &self.output_dir)
            .field("prefix_namespace", &self.prefix_namespace)
            .finish()
    }
}

/// Recognises `1`, `true`, `yes`, `y`, `on` (case-insensitive) as `true`.
fn parse_bool(value: Option<String>, default: bool) -> bool {
    match value {
        Some(value) => matches!(
            value.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ),
        None => default,
    }
}

/// Prepend `https://` to bare hosts and validate the scheme.
///
/// Plain `http://` is only accepted for localhost.
fn normalize_address(raw: &str) -> Result<String, ConfigError> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let invalid = |reason: &str| {
        ConfigError::InvalidValue("VAULT_ADDR".to_string(), format!("{raw}: {reason}"))
    };
    let url = url::Url::parse(&with_scheme).map_err(|e| invalid(&e.to_string()))?;
    match url.scheme() {
        "https" => {}
        "http" if matches!(url.host_str(), Some("localhost" | "127.0.0.1")) => {}
        "http" => return Err(invalid("plain http is only allowed for localhost")),
        _ => return Err(invalid("unsupported scheme")),
    }
    Ok(with_scheme.trim_end_matches('/').to_string())
}

fn output_dir_from<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup("EXPORT_OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Decode-only run: unpack bundles already on disk, no Vault access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeConfig {
    pub output_dir: PathBuf,
}

impl DecodeConfig {
    /// `Some` when `EXPORT_DECODE_ONLY` is set to a true value.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !parse_bool(lookup("EXPORT_DECODE_ONLY"), false) {
            return None;
        }
        Some(Self {
            output_dir: output_dir_from(&lookup),
        })
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if a required variable is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
        };

        let address = normalize_address(&required("VAULT_ADDR")?)?;
        let mount = required("VAULT_MOUNT")?;
        let role_id = required("VAULT_ROLE_ID")?;
        let secret_id = required("VAULT_SECRET_ID")?;

        let namespace = lookup("VAULT_NAMESPACE").unwrap_or_default();
        let path = lookup("VAULT_SECRET_PATH").unwrap_or_default();

        let timeout_secs: u64 = match lookup("VAULT_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|e| {
                ConfigError::InvalidValue("VAULT_TIMEOUT_SECS".to_string(), format!("{}", e))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "VAULT_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let output_dir = output_dir_from(&lookup);

        Ok(Self {
            vault: VaultSettings {
                address,
                namespace,
                skip_verify: parse_bool(lookup("VAULT_SKIP_VERIFY"), false),
                timeout: Duration::from_secs(timeout_secs),
            },
            mount,
            path,
            role_id,
            secret_id,
            output_dir,
            prefix_namespace: parse_bool(lookup("VAULT_EXPORT_PREFIX_NAMESPACE"), true),
        })
    }

    /// Root path of the export: namespace + mount + path.
    pub fn secret_path(&self) -> Result<SecretPath, ExportError> {
        let namespace = if self.prefix_namespace {
            self.vault.namespace.as_str()
        } else {
            ""
        };
        SecretPath::from_parts(namespace, &self.mount, &self.path)
    }

    /// One-line connection summary for logs. The secret id is never shown.
    pub fn summary(&self) -> String {
        format!(
            "url = '{}', namespace = '{}', role_id = {}, secret_id = <redacted>, path = '{}/{}', output = {}",
            self.vault.address,
            self.vault.namespace,
            self.role_id,
            self.mount.trim_matches('/'),
            self.path.trim_matches('/'),
            self.output_dir.display()
        )
    }
}
