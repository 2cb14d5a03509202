//! Vault HTTP client for listing and reading KV paths.

use async_trait::async_trait;
use serde_json::Value;

use super::{build_http_client, SecretStore, Token, VaultError, TOKEN_HEADER};
use crate::config::VaultSettings;

const LOOKUP_SELF_PATH: &str = "auth/token/lookup-self";

/// Percent-encode each segment of a slash-delimited Vault path.
///
/// Slashes are kept, including a trailing one, so `dir/` and `dir` stay
/// distinct requests.
fn encode_vault_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Authenticated Vault REST client.
#[derive(Debug, Clone)]
pub struct VaultClient {
    http: reqwest::Client,
    base_url: String,
    token: Token,
}

impl VaultClient {
    /// Create a client for an already-issued token.
    pub fn new(settings: &VaultSettings, token: Token) -> Result<Self, VaultError> {
        Ok(Self {
            http: build_http_client(settings)?,
            base_url: settings.address.trim_end_matches('/').to_owned(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/v1/{}",
            self.base_url,
            encode_vault_path(path.trim_start_matches('/'))
        )
    }

    async fn get_json(&self, path: &str, list: bool) -> Result<Option<Value>, VaultError> {
        let mut request = self
            .http
            .get(self.url(path))
            .header(TOKEN_HEADER, self.token.as_str())
            .header("Accept", "application/json");
        if list {
            request = request.query(&[("list", "true")]);
        }

        let resp = request.send().await.map_err(VaultError::Network)?;
        match resp.status().as_u16() {
            200 => {
                let body = resp.json::<Value>().await.map_err(VaultError::Network)?;
                Ok(Some(body))
            }
            204 | 404 => Ok(None),
            other => Err(VaultError::from_status(other)),
        }
    }

    /// Check that the token is accepted by Vault.
    pub async fn is_authenticated(&self) -> Result<bool, VaultError> {
        match self.get_json(LOOKUP_SELF_PATH, false).await {
            Ok(Some(_)) => Ok(true),
            Ok(None) | Err(VaultError::Unauthorized) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl SecretStore for VaultClient {
    async fn list(&self, path: &str) -> Result<Option<Value>, VaultError> {
        tracing::debug!("LIST {}", path);
        self.get_json(path, true).await
    }

    async fn read(&self, path: &str) -> Result<Option<Value>, VaultError> {
        tracing::debug!("READ {}", path);
        self.get_json(path, false).await
    }
}
