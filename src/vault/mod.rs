//! Vault session primitives.
//!
//! Two capabilities are kept apart:
//! - [`AuthSession`] turns credentials into a [`Token`]
//! - [`SecretStore`] lists and reads paths with an already-issued token
//!
//! The HTTP implementations share one transport policy (namespace header,
//! TLS verification, timeout) built by [`build_http_client`].

mod auth;
mod client;
mod error;
#[cfg(test)]
pub mod memory;

pub use auth::AppRoleAuth;
pub use client::VaultClient;
pub use error::VaultError;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

use crate::config::VaultSettings;

/// Header carrying the Vault Enterprise namespace.
pub const NAMESPACE_HEADER: &str = "x-vault-namespace";

/// Header carrying the client token.
pub const TOKEN_HEADER: &str = "x-vault-token";

/// Bearer token issued by Vault. The value never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Credential exchange that yields a session token.
#[async_trait]
pub trait AuthSession: Send + Sync {
    async fn authenticate(&self) -> Result<Token, VaultError>;
}

/// Read access to a hierarchical secret store.
///
/// Both operations return the raw JSON response body. `Ok(None)` means the
/// store had nothing at that path (HTTP 404 or an empty response).
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// List the children of `path`.
    async fn list(&self, path: &str) -> Result<Option<Value>, VaultError>;

    /// Read the secret stored at `path`.
    async fn read(&self, path: &str) -> Result<Option<Value>, VaultError>;
}

#[async_trait]
impl<S: SecretStore + ?Sized> SecretStore for &S {
    async fn list(&self, path: &str) -> Result<Option<Value>, VaultError> {
        (**self).list(path).await
    }

    async fn read(&self, path: &str) -> Result<Option<Value>, VaultError> {
        (**self).read(path).await
    }
}

fn user_agent() -> String {
    format!("vault-export/{}", env!("CARGO_PKG_VERSION"))
}

/// Build the HTTP client shared by auth and store calls.
///
/// TLS verification is decided here, once per session.
pub fn build_http_client(settings: &VaultSettings) -> Result<reqwest::Client, VaultError> {
    let mut headers = HeaderMap::new();
    if !settings.namespace.is_empty() {
        let value = HeaderValue::from_str(&settings.namespace)
            .map_err(|_| VaultError::InvalidNamespace(settings.namespace.clone()))?;
        headers.insert(NAMESPACE_HEADER, value);
    }

    if settings.skip_verify {
        tracing::warn!(
            "TLS certificate verification is disabled for {}",
            settings.address
        );
    }

    reqwest::Client::builder()
        .user_agent(user_agent())
        .timeout(settings.timeout)
        .danger_accept_invalid_certs(settings.skip_verify)
        .default_headers(headers)
        .build()
        .map_err(VaultError::ClientBuild)
}
