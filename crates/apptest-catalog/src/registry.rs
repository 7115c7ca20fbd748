//! Name to URL lookup for application catalogs.

use std::collections::BTreeMap;

use crate::error::CatalogError;

const GIANT_SWARM_CATALOGS: &[(&str, &str)] = &[
    (
        "control-plane-catalog",
        "https://giantswarm.github.io/control-plane-catalog/",
    ),
    (
        "control-plane-test-catalog",
        "https://giantswarm.github.io/control-plane-test-catalog/",
    ),
    ("default", "https://giantswarm.github.io/default-catalog/"),
    (
        "default-test",
        "https://giantswarm.github.io/default-test-catalog/",
    ),
    ("giantswarm", "https://giantswarm.github.io/giantswarm-catalog/"),
    (
        "giantswarm-test",
        "https://giantswarm.github.io/giantswarm-test-catalog/",
    ),
    (
        "giantswarm-operations-platform",
        "https://giantswarm.github.io/giantswarm-operations-platform-catalog/",
    ),
    (
        "giantswarm-operations-platform-test",
        "https://giantswarm.github.io/giantswarm-operations-platform-test-catalog/",
    ),
    (
        "giantswarm-playground",
        "https://giantswarm.github.io/giantswarm-playground-catalog/",
    ),
    (
        "giantswarm-playground-test",
        "https://giantswarm.github.io/giantswarm-playground-test-catalog/",
    ),
    ("helm-stable", "https://charts.helm.sh/stable/packages/"),
    ("releases", "https://giantswarm.github.io/releases-catalog/"),
    (
        "releases-test",
        "https://giantswarm.github.io/releases-test-catalog/",
    ),
];

/// Maps catalog names to their index URLs.
///
/// Registries are plain values handed to the orchestrator at construction.
/// An explicit URL on a descriptor always wins over the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRegistry {
    entries: BTreeMap<String, String>,
}

impl CatalogRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The well-known public Giant Swarm catalogs.
    #[must_use]
    pub fn giant_swarm() -> Self {
        GIANT_SWARM_CATALOGS
            .iter()
            .map(|(name, url)| ((*name).to_string(), (*url).to_string()))
            .collect()
    }

    /// Adds or replaces an entry.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.insert(name, url);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.entries.insert(name.into(), url.into());
    }

    /// Registered URL for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves the catalog URL for an application.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MissingCatalogName` when `catalog_name` is empty
    /// and `CatalogError::UnknownCatalog` when the name is not registered and
    /// no explicit URL is given.
    pub fn resolve_url(
        &self,
        app: &str,
        catalog_name: &str,
        explicit_url: Option<&str>,
    ) -> Result<String, CatalogError> {
        if catalog_name.is_empty() {
            return Err(CatalogError::MissingCatalogName {
                app: app.to_string(),
            });
        }
        if let Some(url) = explicit_url.filter(|u| !u.is_empty()) {
            return Ok(url.to_string());
        }
        self.get(catalog_name)
            .map(str::to_string)
            .ok_or_else(|| CatalogError::UnknownCatalog {
                name: catalog_name.to_string(),
            })
    }
}

impl FromIterator<(String, String)> for CatalogRegistry {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, String)> for CatalogRegistry {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}
