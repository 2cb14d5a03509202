//! Slash-delimited Vault secret paths.

use crate::error::ExportError;

/// A non-empty Vault path such as `ns/A/TEST/KV/my-path`.
///
/// Segments never contain empty parts or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretPath(String);

impl SecretPath {
    /// Build a path from namespace, mount and relative path.
    ///
    /// Each part may itself contain slashes; stray and repeated slashes are
    /// dropped. The namespace may be empty.
    pub fn from_parts(namespace: &str, mount: &str, path: &str) -> Result<Self, ExportError> {
        let mut segments = Vec::new();
        for part in [namespace, mount, path] {
            for segment in part.split('/').filter(|s| !s.is_empty()) {
                if segment == ".." || segment == "." {
                    return Err(ExportError::UnsafeName {
                        name: segment.to_string(),
                    });
                }
                segments.push(segment);
            }
        }
        if segments.is_empty() {
            return Err(ExportError::EmptyPath);
        }
        Ok(Self(segments.join("/")))
    }

    pub fn parse(path: &str) -> Result<Self, ExportError> {
        Self::from_parts("", "", path)
    }

    /// Append one directory segment (a trailing slash is ignored).
    pub fn join(&self, child: &str) -> Self {
        Self(format!("{}/{}", self.0, child.trim_matches('/')))
    }

    /// Full path of a listed key, kept verbatim so `dir/` stays `dir/`.
    pub fn child_key(&self, key: &str) -> String {
        format!("{}/{}", self.0, key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SecretPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
