//! Secondary records an application record points at.

use apptest_storage::{Record, RecordKind, ResourceClient, StorageError};

use crate::app::App;
use crate::builders;
use crate::error::{AppTestError, Operation, RecordRef, Result};

/// Writes the credentials secret and user values config map of a descriptor.
pub struct DependencyMaterializer<'a> {
    client: &'a dyn ResourceClient,
}

impl<'a> DependencyMaterializer<'a> {
    pub fn new(client: &'a dyn ResourceClient) -> Self {
        Self { client }
    }

    /// Writes whatever secondary records `app` needs.
    pub async fn materialize(&self, app: &App) -> Result<()> {
        if let Some(kube_config) = app.kube_config() {
            self.upsert_kubeconfig_secret(app, kube_config).await?;
        }
        if let Some(values) = app.values_yaml() {
            self.ensure_user_values(app, values).await?;
        }
        Ok(())
    }

    /// Creates the kubeconfig secret, or overwrites it when it exists.
    pub async fn upsert_kubeconfig_secret(&self, app: &App, kube_config: &str) -> Result<()> {
        let mut secret = builders::kubeconfig_secret(app, kube_config);
        let namespace = app.record_namespace();
        let target = RecordRef::new(RecordKind::Secret, &secret.metadata.name, Some(namespace));

        tracing::debug!(name = %secret.metadata.name, namespace = %namespace, "Creating kubeconfig secret");

        match self
            .client
            .get(RecordKind::Secret, &secret.metadata.name, Some(namespace))
            .await
        {
            Err(StorageError::NotFound { .. }) => {
                self.client
                    .create(&Record::Secret(secret))
                    .await
                    .map_err(|e| AppTestError::storage(Operation::Create, target, e))?;
                tracing::debug!(name = %app.name, namespace = %namespace, "Created kubeconfig secret");
            }
            Ok(existing) => {
                secret.metadata.resource_version = existing.metadata().resource_version.clone();
                self.client
                    .update(&Record::Secret(secret))
                    .await
                    .map_err(|e| AppTestError::storage(Operation::Update, target, e))?;
                tracing::debug!(name = %app.name, namespace = %namespace, "Updated existing kubeconfig secret");
            }
            Err(e) => return Err(AppTestError::storage(Operation::Get, target, e)),
        }
        Ok(())
    }

    /// Creates the user values config map. An existing one is left untouched.
    pub async fn ensure_user_values(&self, app: &App, values: &str) -> Result<()> {
        let config_map = builders::user_values_config_map(app, values);
        let namespace = app.record_namespace();
        let target = RecordRef::new(RecordKind::ConfigMap, &config_map.metadata.name, Some(namespace));

        match self.client.create(&Record::ConfigMap(config_map)).await {
            Ok(_) => {
                tracing::debug!(name = %target.name, namespace = %namespace, "Created user values config map");
                Ok(())
            }
            Err(e) if e.is_already_exists() => {
                tracing::debug!(name = %target.name, namespace = %namespace, "User values config map already exists");
                Ok(())
            }
            Err(e) => Err(AppTestError::storage(Operation::Create, target, e)),
        }
    }
}
