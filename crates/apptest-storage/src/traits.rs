//! The resource client trait.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::{AppRecord, LabelSelector, Record, RecordKind, SchemaRecord};

/// Typed access to named, namespaced declarative records.
///
/// Implementations must be thread-safe (`Send + Sync`). `namespace` is
/// ignored for cluster scoped kinds.
///
/// # Example
///
/// ```ignore
/// use apptest_storage::{RecordKind, ResourceClient, StorageError};
///
/// async fn release_status(client: &dyn ResourceClient) -> Result<String, StorageError> {
///     let app = client.get_app("hello", "giantswarm").await?;
///     Ok(app.status.release.status)
/// }
/// ```
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Creates a record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if a record with the same kind,
    /// name and namespace exists.
    async fn create(&self, record: &Record) -> Result<Record, StorageError>;

    /// Reads a record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the record does not exist.
    async fn get(
        &self,
        kind: RecordKind,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<Record, StorageError>;

    /// Replaces an existing record.
    ///
    /// When `metadata.resource_version` is set it must match the stored one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the record does not exist and
    /// `StorageError::Conflict` on a stale resource version.
    async fn update(&self, record: &Record) -> Result<Record, StorageError>;

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the record does not exist.
    async fn delete(
        &self,
        kind: RecordKind,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Lists records of a kind, optionally limited to one namespace.
    async fn list(
        &self,
        kind: RecordKind,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> Result<Vec<Record>, StorageError>;

    /// Returns the name of this backend for logging.
    fn backend_name(&self) -> &'static str;

    /// Reads a primary application record.
    async fn get_app(&self, name: &str, namespace: &str) -> Result<AppRecord, StorageError> {
        self.get(RecordKind::App, name, Some(namespace))
            .await?
            .into_app()
    }

    /// Reads a schema extension record.
    async fn get_schema(&self, name: &str) -> Result<SchemaRecord, StorageError> {
        self.get(RecordKind::Schema, name, None).await?.into_schema()
    }
}
