//! Test fixtures for a declarative, eventually consistent application
//! control plane.
//!
//! Integration suites describe the applications they need with [`App`]
//! descriptors. [`AppSetup`] writes the catalog, credential, values and
//! application records for them, then polls until the reconciler reports the
//! wanted version as deployed.
//!
//! ```ignore
//! use apptest::{App, AppSetup, config::loader};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = loader::load_config(None)?;
//! apptest::observability::init_tracing(&config.logging);
//! let setup = AppSetup::from_config(&config).await?;
//!
//! let apps = [App::new("hello-world-app", "default")
//!     .with_version("0.1.0")
//!     .wait_for_deploy(true)];
//! setup.install_apps(&apps, &CancellationToken::new()).await?;
//! setup.clean_up(&apps).await?;
//! ```

pub mod app;
pub mod builders;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod installer;
pub mod materializer;
pub mod observability;
pub mod schema;
pub mod setup;
pub mod updater;
pub mod waiter;

pub use app::{App, VersionSelector};
pub use config::AppTestConfig;
pub use error::{AppTestError, ErrorKind, Operation, RecordRef, Result};
pub use setup::{AppSetup, AppSetupBuilder};
pub use updater::AppPatch;
pub use waiter::{BackoffPolicy, PollOutcome, Scheduler, TokioScheduler, VersionTarget};

pub use apptest_catalog::{CatalogRegistry, VersionResolver};
pub use apptest_storage::{ResourceClient, SchemaRecord, SchemaScope};
