//! AppRole login.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{build_http_client, AuthSession, Token, VaultError};
use crate::config::VaultSettings;

const APPROLE_LOGIN_PATH: &str = "v1/auth/approle/login";

#[derive(Serialize)]
struct LoginRequest<'a> {
    role_id: &'a str,
    secret_id: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    auth: Option<LoginAuth>,
}

#[derive(Deserialize)]
struct LoginAuth {
    client_token: String,
}

/// Exchanges an AppRole `role_id`/`secret_id` pair for a client token.
pub struct AppRoleAuth {
    http: reqwest::Client,
    base_url: String,
    role_id: String,
    secret_id: String,
}

impl std::fmt::Debug for AppRoleAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppRoleAuth")
            .field("base_url", &self.base_url)
            .field("role_id", &self.role_id)
            .finish()
    }
}

impl AppRoleAuth {
    pub fn new(
        settings: &VaultSettings,
        role_id: impl Into<String>,
        secret_id: impl Into<String>,
    ) -> Result<Self, VaultError> {
        Ok(Self {
            http: build_http_client(settings)?,
            base_url: settings.address.trim_end_matches('/').to_owned(),
            role_id: role_id.into(),
            secret_id: secret_id.into(),
        })
    }
}

#[async_trait]
impl AuthSession for AppRoleAuth {
    async fn authenticate(&self) -> Result<Token, VaultError> {
        let url = format!("{}/{}", self.base_url, APPROLE_LOGIN_PATH);
        let resp = self
            .http
            .post(&url)
            .json(&LoginRequest {
                role_id: &self.role_id,
                secret_id: &self.secret_id,
            })
            .send()
            .await
            .map_err(VaultError::Network)?;

        match resp.status().as_u16() {
            200 => {
                let body = resp
                    .json::<LoginResponse>()
                    .await
                    .map_err(VaultError::Network)?;
                let auth = body.auth.ok_or_else(|| {
                    VaultError::InvalidResponse("login response has no 'auth' block".into())
                })?;
                tracing::debug!("AppRole login succeeded for role {}", self.role_id);
                Ok(Token::new(auth.client_token))
            }
            // Vault answers 400 for an unknown role or secret id.
            400 => Err(VaultError::Unauthorized),
            other => Err(VaultError::from_status(other)),
        }
    }
}
