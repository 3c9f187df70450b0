//! Container registry targets
//!
//! The pipeline never talks to a registry itself; it only composes the
//! fully-qualified tag strings the external build/push steps consume.

/// One enabled registry target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryTarget {
    /// Registry host, e.g. "docker.io" or "ghcr.io"
    pub host: String,
    /// Owner/organization namespace under the host
    pub namespace: String,
}

impl RegistryTarget {
    pub fn dockerhub(namespace: impl Into<String>) -> Self {
        Self {
            host: "docker.io".to_string(),
            namespace: namespace.into(),
        }
    }

    pub fn ghcr(namespace: impl Into<String>) -> Self {
        Self {
            host: "ghcr.io".to_string(),
            namespace: namespace.into(),
        }
    }

    /// Fully-qualified image reference for a tag
    pub fn image_ref(&self, image: &str, tag: &str) -> String {
        format!("{}/{}/{}:{}", self.host, self.namespace, image, tag)
    }
}
