//! In-memory resource client for apptest.
//!
//! This crate provides an in-memory implementation of the `ResourceClient`
//! trait from `apptest-storage`. Besides the store semantics it offers test
//! controls that stand in for the external reconciler: scripted status
//! sequences and injected transient failures.
//!
//! # Example
//!
//! ```ignore
//! use apptest_db_memory::InMemoryClient;
//! use apptest_storage::{AppStatus, ResourceClient};
//!
//! let client = InMemoryClient::new();
//! client
//!     .script_app_statuses("hello", "giantswarm", [
//!         AppStatus::new("pending-install", ""),
//!         AppStatus::new("deployed", "1.2.3"),
//!     ])
//!     .await;
//! ```

pub mod storage;

pub use apptest_storage::{ResourceClient, StorageError};
pub use storage::{InMemoryClient, StorageKey, StoreStats};

/// Type alias for a shareable in-memory client.
pub type SharedInMemoryClient = std::sync::Arc<InMemoryClient>;

/// Creates a new shared in-memory client.
pub fn create_memory_client() -> SharedInMemoryClient {
    std::sync::Arc::new(InMemoryClient::new())
}
