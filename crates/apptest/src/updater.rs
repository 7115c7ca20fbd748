//! In-place upgrade of an existing application record.

use apptest_catalog::{CatalogRegistry, VersionResolver};
use apptest_storage::{AppRecord, Record, ResourceClient};

use crate::app::App;
use crate::error::{AppTestError, Operation, RecordRef, Result};

/// The fields an upgrade is allowed to change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPatch {
    pub version: String,
    pub catalog: String,
}

impl AppPatch {
    /// Applies the patch; everything else on the record is kept.
    pub fn apply(&self, record: &mut AppRecord) {
        record.spec.version.clone_from(&self.version);
        record.spec.catalog.clone_from(&self.catalog);
    }
}

/// Moves a live application record to the desired version and catalog.
pub struct Updater<'a> {
    client: &'a dyn ResourceClient,
    resolver: &'a dyn VersionResolver,
    registry: &'a CatalogRegistry,
}

impl<'a> Updater<'a> {
    pub fn new(
        client: &'a dyn ResourceClient,
        resolver: &'a dyn VersionResolver,
        registry: &'a CatalogRegistry,
    ) -> Self {
        Self {
            client,
            resolver,
            registry,
        }
    }

    /// Resolves the desired version and submits the update.
    ///
    /// The version is the latest one matching the commit ref when set,
    /// otherwise the version field, otherwise the absolute latest.
    ///
    /// Returns the version written to the record.
    ///
    /// # Errors
    ///
    /// A missing record surfaces as an `ErrorKind::NotFound` error.
    pub async fn update(&self, desired: &App) -> Result<String> {
        let namespace = desired.record_namespace();
        let target = RecordRef::app(&desired.name, namespace);

        tracing::debug!(name = %desired.name, namespace = %namespace, "Finding app");
        let mut current = self
            .client
            .get_app(&desired.name, namespace)
            .await
            .map_err(|e| AppTestError::storage(Operation::Get, target.clone(), e))?;

        let catalog_url = self
            .registry
            .resolve_url(&desired.name, &desired.catalog_name, desired.catalog_url())
            .map_err(|e| AppTestError::catalog(&desired.name, e))?;
        let constraint = desired
            .commit_ref()
            .or_else(|| desired.version())
            .unwrap_or_default();
        let version = self
            .resolver
            .resolve_latest(&catalog_url, &desired.name, constraint)
            .await
            .map_err(|e| AppTestError::catalog(&desired.name, e))?;

        let patch = AppPatch {
            version: version.clone(),
            catalog: desired.catalog_name.clone(),
        };
        patch.apply(&mut current);

        tracing::debug!(
            name = %desired.name,
            namespace = %namespace,
            version = %patch.version,
            catalog = %patch.catalog,
            "Updating app"
        );
        self.client
            .update(&Record::App(current))
            .await
            .map_err(|e| AppTestError::storage(Operation::Update, target, e))?;

        tracing::debug!(name = %desired.name, namespace = %namespace, "Updated app");
        Ok(version)
    }
}
