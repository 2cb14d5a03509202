//! Transport-level Vault errors.
//!
//! Raw response bodies are never carried in these errors so that a failed
//! read cannot leak secret material into logs.

/// Error talking to the Vault HTTP API.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("network error communicating with Vault: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Vault authentication failed (check role/secret id and token policies)")]
    Unauthorized,

    #[error("Vault API rate limit exceeded")]
    RateLimited,

    #[error("Vault API server error (HTTP {0})")]
    ServerError(u16),

    #[error("unexpected Vault API response: status {0}")]
    UnexpectedStatus(u16),

    #[error("invalid Vault response: {0}")]
    InvalidResponse(String),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("namespace '{0}' is not a valid header value")]
    InvalidNamespace(String),
}

impl VaultError {
    /// Map a non-success HTTP status to an error.
    ///
    /// 404 is not handled here: list and read treat it as "no payload".
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => VaultError::Unauthorized,
            429 => VaultError::RateLimited,
            500..=599 => VaultError::ServerError(status),
            other => VaultError::UnexpectedStatus(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(VaultError::from_status(403), VaultError::Unauthorized));
        assert!(matches!(VaultError::from_status(401), VaultError::Unauthorized));
        assert!(matches!(VaultError::from_status(429), VaultError::RateLimited));
        assert!(matches!(
            VaultError::from_status(503),
            VaultError::ServerError(503)
        ));
        assert!(matches!(
            VaultError::from_status(418),
            VaultError::UnexpectedStatus(418)
        ));
    }
}
