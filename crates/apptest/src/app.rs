//! Desired-state descriptors.

use serde::{Deserialize, Serialize};

use crate::error::{AppTestError, Result};

/// Namespace holding primary records when a descriptor does not set one.
pub const DEFAULT_RECORD_NAMESPACE: &str = "giantswarm";

/// Operator version served by the unique operator instance.
pub const UNIQUE_OPERATOR_VERSION: &str = "0.0.0";

/// Release status of a successfully converged application.
pub const STATUS_DEPLOYED: &str = "deployed";
/// Release status of an application whose install or upgrade failed.
pub const STATUS_FAILED: &str = "failed";
/// Release status of an application the reconciler gave up installing.
pub const STATUS_NOT_INSTALLED: &str = "not-installed";

/// Desired state of one application.
///
/// Empty strings are treated exactly like unset fields.
///
/// ```ignore
/// let app = App::new("cert-manager-app", "default")
///     .with_namespace("kube-system")
///     .with_version("2.3.1")
///     .wait_for_deploy(true);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct App {
    pub name: String,
    /// Namespace the application workload is installed into.
    pub namespace: String,
    /// Namespace of the primary record. Defaults to `giantswarm`.
    pub record_namespace: String,
    pub catalog_name: String,
    /// Overrides the registry lookup for `catalog_name`.
    pub catalog_url: String,
    pub version: String,
    /// Commit the installed version must be built from.
    pub commit_ref: String,
    pub values_yaml: String,
    /// Credentials for a remote target cluster.
    pub kube_config: String,
    /// Defaults to the unique instance version `0.0.0`.
    pub operator_version: String,
    pub wait_for_deploy: bool,
}

/// How a descriptor selects its version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector<'a> {
    /// Install exactly this version.
    Exact(&'a str),
    /// Install the latest version built from this commit.
    Commit(&'a str),
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

impl App {
    pub fn new(name: impl Into<String>, catalog_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog_name: catalog_name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_record_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.record_namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_url = url.into();
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn with_commit_ref(mut self, commit_ref: impl Into<String>) -> Self {
        self.commit_ref = commit_ref.into();
        self
    }

    #[must_use]
    pub fn with_values_yaml(mut self, values: impl Into<String>) -> Self {
        self.values_yaml = values.into();
        self
    }

    #[must_use]
    pub fn with_kube_config(mut self, kube_config: impl Into<String>) -> Self {
        self.kube_config = kube_config.into();
        self
    }

    #[must_use]
    pub fn with_operator_version(mut self, version: impl Into<String>) -> Self {
        self.operator_version = version.into();
        self
    }

    #[must_use]
    pub fn wait_for_deploy(mut self, wait: bool) -> Self {
        self.wait_for_deploy = wait;
        self
    }

    /// Namespace of the primary and secondary records.
    #[must_use]
    pub fn record_namespace(&self) -> &str {
        non_empty(&self.record_namespace).unwrap_or(DEFAULT_RECORD_NAMESPACE)
    }

    #[must_use]
    pub fn operator_version(&self) -> &str {
        non_empty(&self.operator_version).unwrap_or(UNIQUE_OPERATOR_VERSION)
    }

    #[must_use]
    pub fn catalog_url(&self) -> Option<&str> {
        non_empty(&self.catalog_url)
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        non_empty(&self.version)
    }

    #[must_use]
    pub fn commit_ref(&self) -> Option<&str> {
        non_empty(&self.commit_ref)
    }

    #[must_use]
    pub fn values_yaml(&self) -> Option<&str> {
        non_empty(&self.values_yaml)
    }

    #[must_use]
    pub fn kube_config(&self) -> Option<&str> {
        non_empty(&self.kube_config)
    }

    /// Whether neither a version nor a commit is set.
    #[must_use]
    pub fn is_unpinned(&self) -> bool {
        self.version().is_none() && self.commit_ref().is_none()
    }

    /// The version selection of this descriptor.
    ///
    /// # Errors
    ///
    /// Returns `AppTestError::InvalidInput` unless exactly one of `version`
    /// and `commit_ref` is set.
    pub fn version_selector(&self) -> Result<VersionSelector<'_>> {
        match (self.version(), self.commit_ref()) {
            (Some(version), None) => Ok(VersionSelector::Exact(version)),
            (None, Some(commit)) => Ok(VersionSelector::Commit(commit)),
            (Some(_), Some(_)) => Err(AppTestError::invalid_input(
                &self.name,
                "both commit ref and version cannot be provided",
            )),
            (None, None) => Err(AppTestError::invalid_input(
                &self.name,
                "either commit ref or version must be provided",
            )),
        }
    }
}
