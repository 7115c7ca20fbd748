//! Chart version resolution.
//!
//! [`HelmIndexResolver`] reads a catalog's Helm repository index
//! (`<catalog>/index.yaml`) and picks the newest published version of an
//! application. Test catalogs publish commit builds as
//! `<release>-<commit sha>`, so a commit reference is resolved by looking for
//! versions that contain it.
//!
//! [`StaticVersionResolver`] answers from a fixed table and is meant for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::Mutex;
use url::Url;

use crate::error::CatalogError;

/// Resolves a desired version or commit reference to a published version.
#[async_trait]
pub trait VersionResolver: Send + Sync {
    /// Returns the latest version of `app_name` in the catalog at `catalog_url`.
    ///
    /// An empty `constraint` selects the absolute latest version; otherwise
    /// only versions containing `constraint` are considered.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::AppNotFound` for unknown applications and
    /// `CatalogError::NoMatchingVersion` when nothing matches the constraint.
    async fn resolve_latest(
        &self,
        catalog_url: &str,
        app_name: &str,
        constraint: &str,
    ) -> Result<String, CatalogError>;
}

/// Configuration for [`HelmIndexResolver`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// HTTP request timeout (default: 30 seconds).
    pub request_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ResolverConfig {
    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct HelmIndex {
    #[serde(default)]
    entries: BTreeMap<String, Vec<ChartEntry>>,
}

#[derive(Debug, Deserialize)]
struct ChartEntry {
    version: String,
    #[serde(default)]
    created: Option<String>,
}

/// Resolver backed by the Helm repository index of a catalog.
#[derive(Debug, Clone)]
pub struct HelmIndexResolver {
    http_client: reqwest::Client,
}

impl HelmIndexResolver {
    /// Creates a resolver with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NetworkError` if the HTTP client cannot be built.
    pub fn new(config: ResolverConfig) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;
        Ok(Self { http_client })
    }

    /// Creates a resolver around an existing HTTP client.
    #[must_use]
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Builds `<catalog>/index.yaml`, keeping any path prefix of the catalog.
    fn index_url(catalog_url: &str) -> Result<Url, CatalogError> {
        let base = format!("{}/", catalog_url.trim_end_matches('/'));
        Url::parse(&base)
            .and_then(|u| u.join("index.yaml"))
            .map_err(|e| CatalogError::InvalidUrl {
                url: catalog_url.to_string(),
                message: e.to_string(),
            })
    }

    async fn fetch_index(&self, catalog_url: &str) -> Result<HelmIndex, CatalogError> {
        let index_url = Self::index_url(catalog_url)?;

        let response = self
            .http_client
            .get(index_url.as_str())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %index_url, error = %e, "Failed to fetch catalog index");
                CatalogError::NetworkError(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(CatalogError::HttpError {
                status: response.status().as_u16(),
                url: index_url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;
        serde_yaml::from_str(&body).map_err(|e| CatalogError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl VersionResolver for HelmIndexResolver {
    async fn resolve_latest(
        &self,
        catalog_url: &str,
        app_name: &str,
        constraint: &str,
    ) -> Result<String, CatalogError> {
        let mut index = self.fetch_index(catalog_url).await?;
        let entries = index
            .entries
            .remove(app_name)
            .ok_or_else(|| CatalogError::AppNotFound {
                app: app_name.to_string(),
                catalog_url: catalog_url.to_string(),
            })?;

        let version = latest_matching(entries, constraint).ok_or_else(|| {
            CatalogError::NoMatchingVersion {
                app: app_name.to_string(),
                constraint: constraint.to_string(),
                catalog_url: catalog_url.to_string(),
            }
        })?;

        tracing::debug!(
            app = %app_name,
            catalog = %catalog_url,
            constraint = %constraint,
            version = %version,
            "Resolved chart version"
        );
        Ok(version)
    }
}

/// Newest entry containing `constraint`, ordered by release then `created`.
fn latest_matching(entries: Vec<ChartEntry>, constraint: &str) -> Option<String> {
    entries
        .into_iter()
        .filter(|e| e.version.contains(constraint))
        .map(|e| {
            let created = e
                .created
                .as_deref()
                .and_then(|c| OffsetDateTime::parse(c, &Rfc3339).ok());
            (release_core(&e.version), created, e.version)
        })
        .max_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, _, version)| version)
}

/// Numeric `major.minor.patch` of a version, ignoring pre-release and build.
fn release_core(version: &str) -> Vec<u64> {
    version
        .trim_start_matches('v')
        .split(['-', '+'])
        .next()
        .unwrap_or_default()
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

/// Resolver answering from an in-memory table of published versions.
///
/// Versions are kept in publication order; the last matching one wins.
#[derive(Debug, Default)]
pub struct StaticVersionResolver {
    published: HashMap<(String, String), Vec<String>>,
    calls: AtomicUsize,
    constraints: Mutex<Vec<String>>,
}

impl StaticVersionResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes versions of `app_name` in the catalog at `catalog_url`.
    #[must_use]
    pub fn with_versions<I, S>(mut self, catalog_url: &str, app_name: &str, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.published
            .entry((catalog_url.to_string(), app_name.to_string()))
            .or_default()
            .extend(versions.into_iter().map(Into::into));
        self
    }

    /// Number of `resolve_latest` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Constraints passed to `resolve_latest`, in call order.
    pub async fn constraints(&self) -> Vec<String> {
        self.constraints.lock().await.clone()
    }
}

#[async_trait]
impl VersionResolver for StaticVersionResolver {
    async fn resolve_latest(
        &self,
        catalog_url: &str,
        app_name: &str,
        constraint: &str,
    ) -> Result<String, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.constraints.lock().await.push(constraint.to_string());

        let versions = self
            .published
            .get(&(catalog_url.to_string(), app_name.to_string()))
            .ok_or_else(|| CatalogError::AppNotFound {
                app: app_name.to_string(),
                catalog_url: catalog_url.to_string(),
            })?;

        versions
            .iter()
            .rev()
            .find(|v| v.contains(constraint))
            .cloned()
            .ok_or_else(|| CatalogError::NoMatchingVersion {
                app: app_name.to_string(),
                constraint: constraint.to_string(),
                catalog_url: catalog_url.to_string(),
            })
    }
}
