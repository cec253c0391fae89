//! Provider registry: maps provider names to client factories

use crate::{StorageClient, StorageError};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Builds a freshly configured client for one request
pub type ClientFactory =
    Arc<dyn Fn() -> crate::Result<Box<dyn StorageClient>> + Send + Sync>;

/// Errors that can occur while resolving a provider
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The request named no provider and nothing supplied a default
    #[error("No provider specified in the request")]
    UnspecifiedProvider,

    /// The named provider is not registered
    #[error("Invalid provider specified")]
    UnknownProvider(String),

    /// The provider is registered but its client could not be built
    #[error("provider '{provider}' could not be constructed: {source}")]
    Construction {
        provider: String,
        #[source]
        source: StorageError,
    },
}

/// Static mapping from provider identifiers to client factories.
///
/// Populated once at startup and read-only afterwards. Resolution is a pure
/// lookup plus client construction; it never touches the network.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ClientFactory>,
    version_providers: HashMap<String, String>,
    default_provider: Option<String>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a provider name, replacing any previous one
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> crate::Result<Box<dyn StorageClient>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    /// Map an API version to the provider it serves by default
    pub fn map_version(
        &mut self,
        version: impl Into<String>,
        provider: impl Into<String>,
    ) -> &mut Self {
        self.version_providers.insert(version.into(), provider.into());
        self
    }

    /// Provider used by versioned requests whose version has no mapping
    pub fn set_default_provider(&mut self, provider: impl Into<String>) -> &mut Self {
        self.default_provider = Some(provider.into());
        self
    }

    /// Check whether a provider is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered provider names, sorted
    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Pick the provider name a request resolves to without building a client.
    ///
    /// An explicit provider always wins, even an empty one, which then fails as
    /// unknown. Without one, an unversioned request fails; a versioned request
    /// uses the version's mapping, then the default.
    pub fn select<'a>(
        &'a self,
        provider: Option<&'a str>,
        version: Option<&str>,
    ) -> Result<&'a str, ResolveError> {
        if let Some(provider) = provider {
            return Ok(provider);
        }

        let version = version.ok_or(ResolveError::UnspecifiedProvider)?;
        self.version_providers
            .get(version)
            .or(self.default_provider.as_ref())
            .map(String::as_str)
            .ok_or(ResolveError::UnspecifiedProvider)
    }

    /// Resolve a request's provider to a configured client
    pub fn resolve(
        &self,
        provider: Option<&str>,
        version: Option<&str>,
    ) -> Result<Box<dyn StorageClient>, ResolveError> {
        let name = self.select(provider, version)?;
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ResolveError::UnknownProvider(name.to_string()))?;

        factory().map_err(|source| ResolveError::Construction {
            provider: name.to_string(),
            source,
        })
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers())
            .field("version_providers", &self.version_providers)
            .field("default_provider", &self.default_provider)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorageClient;
    use rstest::rstest;

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry
            .register("bucketeer", || Ok(Box::new(MemoryStorageClient::new("bucketeer-bucket"))))
            .register("archive", || Ok(Box::new(MemoryStorageClient::new("archive-bucket"))))
            .register("broken", || {
                Err(StorageError::Configuration("missing bucket".to_string()))
            })
            .map_version("v2", "archive")
            .set_default_provider("bucketeer");
        registry
    }

    #[rstest]
    #[case::explicit(Some("archive"), None, "archive-bucket")]
    #[case::explicit_beats_version(Some("bucketeer"), Some("v2"), "bucketeer-bucket")]
    #[case::mapped_version(None, Some("v2"), "archive-bucket")]
    #[case::unmapped_version_falls_back(None, Some("v1"), "bucketeer-bucket")]
    fn test_resolve(
        #[case] provider: Option<&str>,
        #[case] version: Option<&str>,
        #[case] bucket: &str,
    ) {
        let client = registry().resolve(provider, version).unwrap();
        assert_eq!(client.bucket(), bucket);
    }

    #[test]
    fn test_unspecified_provider() {
        let err = registry().resolve(None, None).unwrap_err();
        assert!(matches!(err, ResolveError::UnspecifiedProvider));

    }

    #[rstest]
    #[case::unversioned(None)]
    #[case::versioned(Some("v2"))]
    fn test_empty_provider_is_unknown(#[case] version: Option<&str>) {
        let err = registry().resolve(Some(""), version).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownProvider(ref name) if name.is_empty()));
        assert_eq!(err.to_string(), "Invalid provider specified");
    }

    #[test]
    fn test_unknown_provider() {
        let err = registry().resolve(Some("icloud"), None).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownProvider(ref name) if name == "icloud"));
    }

    #[test]
    fn test_version_without_default_fails() {
        let mut registry = ProviderRegistry::new();
        registry.register("bucketeer", || Ok(Box::new(MemoryStorageClient::new("b"))));

        let err = registry.resolve(None, Some("v9")).unwrap_err();
        assert!(matches!(err, ResolveError::UnspecifiedProvider));
    }

    #[test]
    fn test_default_provider_must_be_registered() {
        let mut registry = ProviderRegistry::new();
        registry.set_default_provider("ghost");

        let err = registry.resolve(None, Some("v1")).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownProvider(ref name) if name == "ghost"));
    }

    #[test]
    fn test_construction_failure() {
        let err = registry().resolve(Some("broken"), None).unwrap_err();
        match err {
            ResolveError::Construction { provider, source } => {
                assert_eq!(provider, "broken");
                assert!(matches!(source, StorageError::Configuration(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_registered_providers() {
        let registry = registry();
        assert_eq!(registry.providers(), vec!["archive", "broken", "bucketeer"]);
        assert!(registry.contains("archive"));
        assert!(!registry.contains("icloud"));
    }
}
