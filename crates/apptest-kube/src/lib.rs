//! Kubernetes implementation of the apptest resource client.
//!
//! [`KubeClient`] wraps a `kube` client built from a kubeconfig, so token,
//! client certificate and exec based users all work.
//!
//! ```ignore
//! use apptest_kube::{ConnectionOptions, KubeClient};
//!
//! let client =
//!     KubeClient::from_kubeconfig_path("/home/me/.kube/config", &ConnectionOptions::default())
//!         .await?;
//! let app = client.get_app("cert-manager-app", "giantswarm").await?;
//! ```

mod client;
pub mod kubeconfig;

pub use client::KubeClient;
pub use kubeconfig::{ConnectionOptions, KubeConfigError};
