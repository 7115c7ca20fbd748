//! # apptest-storage
//!
//! Resource client abstraction for apptest.
//!
//! This crate defines the [`ResourceClient`] trait and the record types the
//! orchestrator writes: catalogs, applications, secrets, config maps and
//! schema extensions. Implementations live in separate crates
//! (`apptest-db-memory`, `apptest-kube`).
//!
//! ## Implementing a client
//!
//! ```ignore
//! use async_trait::async_trait;
//! use apptest_storage::{Record, RecordKind, ResourceClient, StorageError};
//!
//! struct MyClient;
//!
//! #[async_trait]
//! impl ResourceClient for MyClient {
//!     async fn create(&self, record: &Record) -> Result<Record, StorageError> {
//!         // Implementation
//!     }
//!     // ... other methods
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::ResourceClient;
pub use types::{
    APPLICATION_GROUP, AppRecord, AppRecordSpec, AppStatus, CatalogRecord, CatalogSpec,
    CatalogStorage, ConfigMapRecord, ConfigMapReference, ESTABLISHED_CONDITION,
    KubeConfigContext, KubeConfigSource, LabelSelector, OPERATOR_VERSION_LABEL, ObjectMeta,
    Record, RecordKind, ReleaseStatus, SchemaCondition, SchemaNames, SchemaRecord, SchemaScope,
    SchemaSpec, SchemaStatus, SchemaVersion, SecretRecord, SecretReference, UserConfig,
    record_key,
};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared client trait object.
pub type DynClient = std::sync::Arc<dyn ResourceClient>;
