//! Catalog registration and primary record creation.

use apptest_catalog::{CatalogRegistry, VersionResolver};
use apptest_storage::{Record, RecordKind, ResourceClient};

use crate::app::{App, VersionSelector};
use crate::builders;
use crate::error::{AppTestError, Operation, RecordRef, Result};
use crate::materializer::DependencyMaterializer;

/// A descriptor whose catalog and version selection have been checked.
#[derive(Debug, Clone)]
pub struct PlannedApp<'a> {
    pub app: &'a App,
    pub catalog_url: String,
    pub selector: VersionSelector<'a>,
}

/// Writes catalogs, secondary records and primary records.
pub struct Installer<'a> {
    client: &'a dyn ResourceClient,
    resolver: &'a dyn VersionResolver,
    registry: &'a CatalogRegistry,
}

impl<'a> Installer<'a> {
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

    /// Catalog URL of a descriptor: the explicit URL, else the registry entry.
    pub fn catalog_url(&self, app: &App) -> Result<String> {
        self.registry
            .resolve_url(&app.name, &app.catalog_name, app.catalog_url())
            .map_err(|e| AppTestError::catalog(&app.name, e))
    }

    /// Checks every descriptor before anything is written.
    pub fn plan<'b>(&self, apps: &'b [App]) -> Result<Vec<PlannedApp<'b>>> {
        apps.iter()
            .map(|app| -> Result<PlannedApp<'b>> {
                Ok(PlannedApp {
                    app,
                    catalog_url: self.catalog_url(app)?,
                    selector: app.version_selector()?,
                })
            })
            .collect()
    }

    /// Creates one catalog record per distinct catalog name.
    ///
    /// `catalogs` holds `(name, url)` pairs; later duplicates of a name are
    /// skipped. Existing catalogs are left as they are.
    pub async fn ensure_catalogs<'b>(
        &self,
        catalogs: impl IntoIterator<Item = (&'b str, &'b str)>,
    ) -> Result<()> {
        let mut seen: Vec<&str> = Vec::new();
        for (name, url) in catalogs {
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);

            tracing::debug!(catalog = %name, url = %url, "Creating catalog");
            let record = Record::Catalog(builders::catalog_record(name, url));
            match self.client.create(&record).await {
                Ok(_) => tracing::debug!(catalog = %name, "Created catalog"),
                Err(e) if e.is_already_exists() => {
                    tracing::debug!(catalog = %name, "Catalog already exists");
                }
                Err(e) => {
                    return Err(AppTestError::storage(
                        Operation::Create,
                        RecordRef::new(RecordKind::Catalog, name, None),
                        e,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Concrete version to install.
    pub async fn resolve_version(&self, planned: &PlannedApp<'_>) -> Result<String> {
        match planned.selector {
            VersionSelector::Exact(version) => Ok(version.to_string()),
            VersionSelector::Commit(commit) => self
                .resolver
                .resolve_latest(&planned.catalog_url, &planned.app.name, commit)
                .await
                .map_err(|e| AppTestError::catalog(&planned.app.name, e)),
        }
    }

    /// Writes the secondary records and the primary record of one app.
    ///
    /// Returns `false` when the primary record already existed.
    pub async fn create_app(&self, planned: &PlannedApp<'_>) -> Result<bool> {
        let app = planned.app;
        let version = self.resolve_version(planned).await?;
        tracing::debug!(
            name = %app.name,
            catalog = %app.catalog_name,
            version = %version,
            "Creating app"
        );

        DependencyMaterializer::new(self.client)
            .materialize(app)
            .await?;

        let record = Record::App(builders::app_record(app, &version));
        match self.client.create(&record).await {
            Ok(_) => {
                tracing::debug!(name = %app.name, namespace = %app.record_namespace(), "Created app");
                Ok(true)
            }
            Err(e) if e.is_already_exists() => {
                tracing::debug!(name = %app.name, namespace = %app.record_namespace(), "App already exists");
                Ok(false)
            }
            Err(e) => Err(AppTestError::storage(
                Operation::Create,
                RecordRef::app(&app.name, app.record_namespace()),
                e,
            )),
        }
    }

    /// Catalogs first, then every app in order.
    pub async fn install(&self, planned: &[PlannedApp<'_>]) -> Result<()> {
        self.ensure_catalogs(
            planned
                .iter()
                .map(|p| (p.app.catalog_name.as_str(), p.catalog_url.as_str())),
        )
        .await?;

        for p in planned {
            self.create_app(p).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apptest_catalog::StaticVersionResolver;
    use apptest_db_memory::InMemoryClient;
    use apptest_storage::LabelSelector;

    const DEFAULT_URL: &str = "https://giantswarm.github.io/default-catalog/";

    #[test]
    fn test_plan_rejects_invalid_descriptor() {
        let client = InMemoryClient::new();
        let resolver = StaticVersionResolver::new();
        let registry = CatalogRegistry::giant_swarm();
        let installer = Installer::new(&client, &resolver, &registry);

        let apps = vec![
            App::new("good", "default").with_version("1.0.0"),
            App::new("bad", "mystery").with_version("1.0.0"),
        ];
        let err = installer.plan(&apps).unwrap_err();
        assert!(err.to_string().contains("mystery"));
    }

    #[tokio::test]
    async fn test_catalogs_deduplicated() {
        let client = InMemoryClient::new();
        let resolver = StaticVersionResolver::new();
        let registry = CatalogRegistry::giant_swarm();
        let installer = Installer::new(&client, &resolver, &registry);

        installer
            .ensure_catalogs([("default", DEFAULT_URL), ("default", DEFAULT_URL)])
            .await
            .unwrap();
        installer
            .ensure_catalogs([("default", DEFAULT_URL)])
            .await
            .unwrap();

        assert_eq!(client.stats().creates, 1);
        assert_eq!(client.count(RecordKind::Catalog).await, 1);
    }

    #[tokio::test]
    async fn test_commit_resolved_through_catalog() {
        let client = InMemoryClient::new();
        let resolver = StaticVersionResolver::new().with_versions(
            DEFAULT_URL,
            "hello",
            ["0.1.0", "0.2.0-abc123"],
        );
        let registry = CatalogRegistry::giant_swarm();
        let installer = Installer::new(&client, &resolver, &registry);

        let apps = vec![App::new("hello", "default").with_commit_ref("abc123")];
        let planned = installer.plan(&apps).unwrap();
        assert!(installer.create_app(&planned[0]).await.unwrap());

        let app = client.get_app("hello", "giantswarm").await.unwrap();
        assert_eq!(app.spec.version, "0.2.0-abc123");
        assert!(!installer.create_app(&planned[0]).await.unwrap());

        let all = client
            .list(RecordKind::App, None, &LabelSelector::everything())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }
}
