use std::collections::BTreeMap;
use std::time::Duration;

use apptest_kube::ConnectionOptions;
use serde::{Deserialize, Serialize};

use crate::waiter::BackoffPolicy;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppTestConfig {
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Waiting for applications to deploy
    #[serde(default)]
    pub wait: WaitConfig,
    /// Waiting for schema extensions to be established
    #[serde(default)]
    pub schema_wait: SchemaWaitConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl AppTestConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Cluster validations
        let inline = self.cluster.kube_config.as_deref().is_some_and(|s| !s.is_empty());
        let path = self
            .cluster
            .kube_config_path
            .as_deref()
            .is_some_and(|s| !s.is_empty());
        match (inline, path) {
            (true, true) => {
                return Err("cluster.kube_config and cluster.kube_config_path must not both be set".into());
            }
            (false, false) => {
                return Err("cluster.kube_config or cluster.kube_config_path must be set".into());
            }
            _ => {}
        }
        if self.cluster.connect_timeout_secs == 0 || self.cluster.read_timeout_secs == 0 {
            return Err("cluster timeouts must be > 0".into());
        }
        self.validate_waits()?;
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        if self.catalog.request_timeout_secs == 0 {
            return Err("catalog.request_timeout_secs must be > 0".into());
        }
        Ok(())
    }

    /// Checks only the wait sections; used when collaborators are injected.
    pub fn validate_waits(&self) -> Result<(), String> {
        if self.wait.interval_secs == 0 || self.wait.deadline_secs == 0 {
            return Err("wait intervals must be > 0".into());
        }
        if self.wait.interval_secs > self.wait.deadline_secs {
            return Err("wait.interval_secs must be <= wait.deadline_secs".into());
        }
        let sw = &self.schema_wait;
        if sw.initial_interval_ms == 0 || sw.max_interval_secs == 0 || sw.deadline_secs == 0 {
            return Err("schema_wait intervals must be > 0".into());
        }
        let max_interval_ms = sw.max_interval_secs.saturating_mul(1000);
        if sw.initial_interval_ms > max_interval_ms {
            return Err("schema_wait.initial_interval_ms must be <= schema_wait.max_interval_secs".into());
        }
        Ok(())
    }

    pub fn app_wait_policy(&self) -> BackoffPolicy {
        BackoffPolicy::constant(
            Duration::from_secs(self.wait.interval_secs),
            Duration::from_secs(self.wait.deadline_secs),
        )
    }

    pub fn schema_wait_policy(&self) -> BackoffPolicy {
        BackoffPolicy::exponential(
            Duration::from_millis(self.schema_wait.initial_interval_ms),
            Duration::from_secs(self.schema_wait.max_interval_secs),
            Duration::from_secs(self.schema_wait.deadline_secs),
        )
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        let mut options = ConnectionOptions::default()
            .with_connect_timeout(Duration::from_secs(self.cluster.connect_timeout_secs))
            .with_read_timeout(Duration::from_secs(self.cluster.read_timeout_secs));
        if let Some(context) = self.cluster.context.as_deref().filter(|c| !c.is_empty()) {
            options = options.with_context(context);
        }
        options
    }

    pub fn catalog_request_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.request_timeout_secs)
    }
}

/// Credentials of the cluster hosting the control plane. Exactly one of
/// `kube_config` and `kube_config_path` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Inline kubeconfig document
    #[serde(default)]
    pub kube_config: Option<String>,
    #[serde(default)]
    pub kube_config_path: Option<String>,
    /// Overrides the kubeconfig's current-context
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_read_timeout_secs() -> u64 {
    30
}
impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kube_config: None,
            kube_config_path: None,
            context: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    #[serde(default = "default_wait_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_wait_deadline_secs")]
    pub deadline_secs: u64,
}
fn default_wait_interval_secs() -> u64 {
    10
}
fn default_wait_deadline_secs() -> u64 {
    20 * 60
}
impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_wait_interval_secs(),
            deadline_secs: default_wait_deadline_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaWaitConfig {
    #[serde(default = "default_schema_initial_interval_ms")]
    pub initial_interval_ms: u64,
    #[serde(default = "default_schema_max_interval_secs")]
    pub max_interval_secs: u64,
    #[serde(default = "default_schema_deadline_secs")]
    pub deadline_secs: u64,
}
fn default_schema_initial_interval_ms() -> u64 {
    1000
}
fn default_schema_max_interval_secs() -> u64 {
    10
}
fn default_schema_deadline_secs() -> u64 {
    60
}
impl Default for SchemaWaitConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_schema_initial_interval_ms(),
            max_interval_secs: default_schema_max_interval_secs(),
            deadline_secs: default_schema_deadline_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Extra catalogs merged over the well-known ones, name to URL
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}
fn default_catalog_timeout_secs() -> u64 {
    30
}
impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_catalog_timeout_secs(),
            extra: BTreeMap::new(),
        }
    }
}

pub mod loader {
    use super::AppTestConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Loads `path`, or `apptest.toml` if present, then applies `APPTEST__`
    /// environment overrides and validates the result.
    ///
    /// An explicitly given path must exist.
    pub fn load_config(path: Option<&str>) -> Result<AppTestConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if !pathbuf.exists() {
                    return Err(format!("config file {p} not found"));
                }
                builder = builder.add_source(File::from(pathbuf));
            }
            None => {
                let default_path = PathBuf::from("apptest.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., APPTEST__WAIT__DEADLINE_SECS=600
        builder = builder.add_source(
            Environment::with_prefix("APPTEST")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppTestConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
