//! # apptest-catalog
//!
//! Catalog lookup and chart version resolution.
//!
//! - [`CatalogRegistry`] maps catalog names to index URLs
//! - [`VersionResolver`] turns a version or commit constraint into a published version
//! - [`HelmIndexResolver`] implements it against a Helm repository index
//!
//! # Example
//!
//! ```ignore
//! use apptest_catalog::{CatalogRegistry, HelmIndexResolver, ResolverConfig, VersionResolver};
//!
//! let registry = CatalogRegistry::giant_swarm();
//! let url = registry.resolve_url("cert-manager-app", "default", None)?;
//! let resolver = HelmIndexResolver::new(ResolverConfig::default())?;
//! let latest = resolver.resolve_latest(&url, "cert-manager-app", "").await?;
//! ```

mod error;
mod registry;
mod resolver;

pub use error::CatalogError;
pub use registry::CatalogRegistry;
pub use resolver::{HelmIndexResolver, ResolverConfig, StaticVersionResolver, VersionResolver};

/// Type alias for a shared resolver trait object.
pub type DynResolver = std::sync::Arc<dyn VersionResolver>;
