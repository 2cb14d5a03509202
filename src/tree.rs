//! Remote tree discovery: listing a path and sorting its keys into leaf
//! secrets and sub-directories.

use serde_json::Value;

use crate::bundle::LeafRecord;
use crate::error::ExportError;
use crate::path::SecretPath;
use crate::vault::SecretStore;

/// One listed path, split into its leaves and pending directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub path: SecretPath,
    /// Leaf secrets in listing order.
    pub leaves: Vec<LeafRecord>,
    /// Directory names (without trailing `/`) in listing order.
    pub directories: Vec<String>,
}

/// Extract `data.keys` from a list response.
fn keys_from_listing(path: &SecretPath, body: Option<Value>) -> Result<Vec<String>, ExportError> {
    let data = body
        .as_ref()
        .and_then(|b| b.get("data"))
        .filter(|d| !d.is_null())
        .ok_or_else(|| ExportError::NotFound {
            path: path.to_string(),
        })?;

    let malformed = || ExportError::MalformedListing {
        path: path.to_string(),
    };
    data.get("keys")
        .and_then(Value::as_array)
        .ok_or_else(malformed)?
        .iter()
        .map(|k| k.as_str().map(str::to_string).ok_or_else(malformed))
        .collect()
}

/// List the keys directly under `path`, in the order the store returned them.
pub async fn list_keys<S>(store: &S, path: &SecretPath) -> Result<Vec<String>, ExportError>
where
    S: SecretStore + ?Sized,
{
    let body = store
        .list(path.as_str())
        .await
        .map_err(ExportError::transport(path.as_str()))?;
    let keys = keys_from_listing(path, body)?;
    tracing::info!("List of secrets under '{}': {:?}", path, keys);
    Ok(keys)
}

/// Read every key under `path` and classify it as leaf or directory.
///
/// A key that returns a payload is a leaf. A key without payload must end
/// with `/` to count as a directory; anything else is ambiguous.
pub async fn read_level<S>(
    store: &S,
    path: &SecretPath,
    keys: &[String],
) -> Result<Level, ExportError>
where
    S: SecretStore + ?Sized,
{
    let mut leaves = Vec::new();
    let mut directories = Vec::new();

    for key in keys {
        let full = path.child_key(key);
        let secret = store
            .read(&full)
            .await
            .map_err(ExportError::transport(&full))?;

        if let Some(data) = secret
            .as_ref()
            .and_then(|s| s.get("data"))
            .and_then(Value::as_object)
        {
            leaves.push(LeafRecord::from_payload(key.as_str(), data));
        } else if let Some(dir) = key.strip_suffix('/') {
            directories.push(dir.to_string());
        } else {
            return Err(ExportError::AmbiguousNode {
                path: path.to_string(),
                key: key.clone(),
            });
        }
    }

    tracing::debug!(
        "'{}': {} secrets, {} directories",
        path,
        leaves.len(),
        directories.len()
    );
    Ok(Level {
        path: path.clone(),
        leaves,
        directories,
    })
}

/// List and read one path.
pub async fn discover<S>(store: &S, path: &SecretPath) -> Result<Level, ExportError>
where
    S: SecretStore + ?Sized,
{
    let keys = list_keys(store, path).await?;
    read_level(store, path, &keys).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::memory::MemoryStore;
    use crate::vault::VaultError;
    use serde_json::json;

    fn root() -> SecretPath {
        SecretPath::parse("ns/kv/app").unwrap()
    }

    #[tokio::test]
    async fn keys_keep_store_order() {
        let store = MemoryStore::new().with_keys("ns/kv/app", &["zeta", "alpha", "mid/"]);
        let keys = list_keys(&store, &root()).await.unwrap();
        assert_eq!(keys, vec!["zeta", "alpha", "mid/"]);
    }

    #[tokio::test]
    async fn missing_listing_is_not_found() {
        let store = MemoryStore::new();
        let err = list_keys(&store, &root()).await.unwrap_err();
        assert!(matches!(err, ExportError::NotFound { ref path } if path == "ns/kv/app"));
    }

    #[tokio::test]
    async fn listing_without_data_is_not_found() {
        let store = MemoryStore::new().with_list_body("ns/kv/app", json!({ "warnings": [] }));
        let err = list_keys(&store, &root()).await.unwrap_err();
        assert!(matches!(err, ExportError::NotFound { .. }));
    }

    #[tokio::test]
    async fn listing_without_keys_is_malformed() {
        let store = MemoryStore::new().with_list_body("ns/kv/app", json!({ "data": {} }));
        let err = list_keys(&store, &root()).await.unwrap_err();
        assert!(matches!(err, ExportError::MalformedListing { .. }));
    }

    #[tokio::test]
    async fn non_string_key_is_malformed() {
        let store =
            MemoryStore::new().with_list_body("ns/kv/app", json!({ "data": { "keys": [1] } }));
        let err = list_keys(&store, &root()).await.unwrap_err();
        assert!(matches!(err, ExportError::MalformedListing { .. }));
    }

    #[tokio::test]
    async fn list_transport_error_names_path() {
        let store = MemoryStore::new().failing("ns/kv/app", 403);
        let err = list_keys(&store, &root()).await.unwrap_err();
        match err {
            ExportError::Transport { path, source } => {
                assert_eq!(path, "ns/kv/app");
                assert!(matches!(source, VaultError::Unauthorized));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn leaves_and_directories_are_split() {
        let store = MemoryStore::new()
            .with_keys("ns/kv/app", &["alpha", "beta/", "gamma"])
            .with_secret("ns/kv/app/alpha", json!({ "x": "aGVsbG8=" }))
            .with_secret("ns/kv/app/gamma", json!({ "y": "plain" }));

        let level = discover(&store, &root()).await.unwrap();
        let names: Vec<&str> = level.leaves.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "gamma"]);
        assert_eq!(level.leaves[0].fields["x"], "aGVsbG8=");
        assert_eq!(level.directories, vec!["beta"]);
        assert!(store.calls().contains(&"READ ns/kv/app/beta/".to_string()));
    }

    #[tokio::test]
    async fn key_without_payload_or_slash_is_ambiguous() {
        let store = MemoryStore::new().with_keys("ns/kv/app", &["ghost"]);
        let err = discover(&store, &root()).await.unwrap_err();
        assert!(matches!(err, ExportError::AmbiguousNode { ref key, .. } if key == "ghost"));
    }

    #[tokio::test]
    async fn payload_without_data_object_is_not_a_leaf() {
        let store = MemoryStore::new()
            .with_keys("ns/kv/app", &["dir/"])
            .with_secret("ns/kv/app/dir/", json!(null));
        let level = discover(&store, &root()).await.unwrap();
        assert!(level.leaves.is_empty());
        assert_eq!(level.directories, vec!["dir"]);
    }

    #[tokio::test]
    async fn every_key_classified_exactly_once() {
        let keys = ["a", "b/", "c", "d/", "e"];
        let mut store = MemoryStore::new().with_keys("ns/kv/app", &keys);
        for leaf in ["a", "c", "e"] {
            store = store.with_secret(&format!("ns/kv/app/{leaf}"), json!({ "k": leaf }));
        }

        let level = discover(&store, &root()).await.unwrap();
        assert_eq!(level.leaves.len() + level.directories.len(), keys.len());
        for leaf in &level.leaves {
            assert!(!level.directories.contains(&leaf.name));
        }
    }

    #[tokio::test]
    async fn read_transport_error_names_full_path() {
        let store = MemoryStore::new()
            .with_keys("ns/kv/app", &["alpha"])
            .failing("ns/kv/app/alpha", 500);
        let err = discover(&store, &root()).await.unwrap_err();
        assert!(matches!(err, ExportError::Transport { ref path, .. } if path == "ns/kv/app/alpha"));
    }
}
