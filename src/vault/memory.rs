//! In-memory secret store for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{SecretStore, VaultError};

#[derive(Default)]
pub struct MemoryStore {
    lists: HashMap<String, Value>,
    reads: HashMap<String, Value>,
    failing: HashMap<String, u16>,
    calls: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a well-formed listing for `path`.
    pub fn with_keys(self, path: &str, keys: &[&str]) -> Self {
        self.with_list_body(path, json!({ "data": { "keys": keys } }))
    }

    /// Register an arbitrary list response body for `path`.
    pub fn with_list_body(mut self, path: &str, body: Value) -> Self {
        self.lists.insert(path.to_string(), body);
        self
    }

    /// Register a KV payload at `path`.
    pub fn with_secret(mut self, path: &str, data: Value) -> Self {
        self.reads.insert(path.to_string(), json!({ "data": data }));
        self
    }

    /// Make every call on `path` fail with the given HTTP status.
    pub fn failing(mut self, path: &str, status: u16) -> Self {
        self.failing.insert(path.to_string(), status);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn record(&self, op: &str, path: &str) -> Result<(), VaultError> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(format!("{op} {path}"));
        match self.failing.get(path) {
            Some(status) => Err(VaultError::from_status(*status)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn list(&self, path: &str) -> Result<Option<Value>, VaultError> {
        self.record("LIST", path)?;
        Ok(self.lists.get(path).cloned())
    }

    async fn read(&self, path: &str) -> Result<Option<Value>, VaultError> {
        self.record("READ", path)?;
        Ok(self.reads.get(path).cloned())
    }
}
