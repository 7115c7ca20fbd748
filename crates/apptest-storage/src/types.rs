//! Record types shared by every resource client.
//!
//! Records mirror the JSON shape the control plane stores. `apiVersion` and
//! `kind` are not stored on the structs; they are derived from [`RecordKind`]
//! when a record is encoded with [`Record::to_json`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StorageError;

/// API group of the application platform records.
pub const APPLICATION_GROUP: &str = "application.giantswarm.io";

/// Label selecting which operator instance reconciles a record.
pub const OPERATOR_VERSION_LABEL: &str = "app-operator.giantswarm.io/version";

/// The closed set of record kinds this crate knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKind {
    /// Catalog registration (`AppCatalog`).
    Catalog,
    /// Primary application record (`App`).
    App,
    /// Credentials secret.
    Secret,
    /// User configuration map.
    ConfigMap,
    /// Schema extension (`CustomResourceDefinition`).
    Schema,
}

impl RecordKind {
    /// API group, empty for the core group.
    #[must_use]
    pub fn group(self) -> &'static str {
        match self {
            Self::Catalog | Self::App => APPLICATION_GROUP,
            Self::Secret | Self::ConfigMap => "",
            Self::Schema => "apiextensions.k8s.io",
        }
    }

    /// API version within the group.
    #[must_use]
    pub fn version(self) -> &'static str {
        match self {
            Self::Catalog | Self::App => "v1alpha1",
            Self::Secret | Self::ConfigMap | Self::Schema => "v1",
        }
    }

    /// `apiVersion` as written into encoded records.
    #[must_use]
    pub fn api_version(self) -> String {
        match self.group() {
            "" => self.version().to_string(),
            group => format!("{group}/{}", self.version()),
        }
    }

    /// `kind` as written into encoded records.
    #[must_use]
    pub fn kind_name(self) -> &'static str {
        match self {
            Self::Catalog => "AppCatalog",
            Self::App => "App",
            Self::Secret => "Secret",
            Self::ConfigMap => "ConfigMap",
            Self::Schema => "CustomResourceDefinition",
        }
    }

    /// Plural resource name used in API paths.
    #[must_use]
    pub fn plural(self) -> &'static str {
        match self {
            Self::Catalog => "appcatalogs",
            Self::App => "apps",
            Self::Secret => "secrets",
            Self::ConfigMap => "configmaps",
            Self::Schema => "customresourcedefinitions",
        }
    }

    /// Whether records of this kind live inside a namespace.
    #[must_use]
    pub fn is_namespaced(self) -> bool {
        matches!(self, Self::App | Self::Secret | Self::ConfigMap)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_name())
    }
}

/// Builds the display key of a record: `namespace/name` or `name`.
#[must_use]
pub fn record_key(name: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{ns}/{name}"),
        _ => name.to_string(),
    }
}

/// Metadata common to every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Set by the store; sent back on update for optimistic concurrency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl ObjectMeta {
    /// Metadata for a cluster scoped record.
    #[must_use]
    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Metadata for a namespaced record.
    #[must_use]
    pub fn namespaced(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }

    /// Adds a label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// `namespace/name` or `name`.
    #[must_use]
    pub fn key(&self) -> String {
        record_key(&self.name, self.namespace.as_deref())
    }
}

// ==================== Catalog ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub metadata: ObjectMeta,
    pub spec: CatalogSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSpec {
    pub title: String,
    pub description: String,
    pub storage: CatalogStorage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStorage {
    #[serde(rename = "type")]
    pub storage_type: String,
    #[serde(rename = "URL")]
    pub url: String,
}

// ==================== App ====================

/// The primary record representing an installed application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    pub metadata: ObjectMeta,
    pub spec: AppRecordSpec,
    /// Written only by the reconciler.
    #[serde(default)]
    pub status: AppStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRecordSpec {
    pub catalog: String,
    pub name: String,
    pub namespace: String,
    pub version: String,
    pub kube_config: KubeConfigSource,
    #[serde(default, skip_serializing_if = "UserConfig::is_empty")]
    pub user_config: UserConfig,
}

/// Where the reconciler finds credentials for the target cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeConfigSource {
    pub in_cluster: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<KubeConfigContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretReference>,
}

impl KubeConfigSource {
    /// Credentials of the cluster the reconciler runs in.
    #[must_use]
    pub fn in_cluster() -> Self {
        Self {
            in_cluster: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubeConfigContext {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretReference {
    pub name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map: Option<ConfigMapReference>,
}

impl UserConfig {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.config_map.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMapReference {
    pub name: String,
    pub namespace: String,
}

/// Observed state reported by the reconciler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStatus {
    #[serde(default)]
    pub app_version: String,
    #[serde(default)]
    pub release: ReleaseStatus,
    #[serde(default)]
    pub version: String,
}

impl AppStatus {
    /// A status with the given release state and observed version.
    #[must_use]
    pub fn new(status: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            release: ReleaseStatus {
                status: status.into(),
                reason: String::new(),
            },
            version: version.into(),
            ..Default::default()
        }
    }

    /// Sets the human readable reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.release.reason = reason.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseStatus {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub status: String,
}

// ==================== Secret / ConfigMap ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub metadata: ObjectMeta,
    /// Raw bytes; base64 encoded on the wire.
    #[serde(default, with = "base64_map", skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMapRecord {
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

mod base64_map {
    use std::collections::BTreeMap;

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<String, Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let encoded: BTreeMap<&String, String> =
            map.iter().map(|(k, v)| (k, STANDARD.encode(v))).collect();
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Vec<u8>>, D::Error> {
        let encoded = Option::<BTreeMap<String, String>>::deserialize(deserializer)?;
        encoded
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| {
                STANDARD
                    .decode(v.as_bytes())
                    .map(|bytes| (k, bytes))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

// ==================== Schema extension ====================

/// Condition type marking a schema extension as served by the API.
pub const ESTABLISHED_CONDITION: &str = "Established";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRecord {
    pub metadata: ObjectMeta,
    pub spec: SchemaSpec,
    #[serde(default)]
    pub status: SchemaStatus,
}

impl SchemaRecord {
    /// Builds a schema extension for `kind` in `group`, served at `version`.
    ///
    /// The record name is `<plural>.<group>` with the plural derived from the
    /// lowercase kind.
    #[must_use]
    pub fn new(group: &str, kind: &str, version: &str, scope: SchemaScope) -> Self {
        let singular = kind.to_ascii_lowercase();
        let plural = format!("{singular}s");
        Self {
            metadata: ObjectMeta::cluster(format!("{plural}.{group}")),
            spec: SchemaSpec {
                group: group.to_string(),
                names: SchemaNames {
                    kind: kind.to_string(),
                    list_kind: format!("{kind}List"),
                    plural,
                    singular,
                },
                scope,
                versions: vec![SchemaVersion {
                    name: version.to_string(),
                    served: true,
                    storage: true,
                    schema: Some(serde_json::json!({
                        "openAPIV3Schema": {
                            "type": "object",
                            "x-kubernetes-preserve-unknown-fields": true
                        }
                    })),
                }],
            },
            status: SchemaStatus::default(),
        }
    }

    /// Whether the API reports the extension as established.
    #[must_use]
    pub fn is_established(&self) -> bool {
        self.status
            .conditions
            .iter()
            .any(|c| c.condition_type == ESTABLISHED_CONDITION)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSpec {
    pub group: String,
    pub names: SchemaNames,
    pub scope: SchemaScope,
    pub versions: Vec<SchemaVersion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaScope {
    Namespaced,
    Cluster,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNames {
    pub kind: String,
    pub list_kind: String,
    pub plural: String,
    pub singular: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaVersion {
    pub name: String,
    pub served: bool,
    pub storage: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaStatus {
    #[serde(default)]
    pub conditions: Vec<SchemaCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SchemaCondition {
    /// An `Established=True` condition.
    #[must_use]
    pub fn established() -> Self {
        Self {
            condition_type: ESTABLISHED_CONDITION.to_string(),
            status: "True".to_string(),
            reason: Some("InitialNamesAccepted".to_string()),
            message: None,
        }
    }
}

// ==================== Record ====================

/// Any record a [`ResourceClient`](crate::ResourceClient) can store.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Catalog(CatalogRecord),
    App(AppRecord),
    Secret(SecretRecord),
    ConfigMap(ConfigMapRecord),
    Schema(SchemaRecord),
}

impl Record {
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Catalog(_) => RecordKind::Catalog,
            Self::App(_) => RecordKind::App,
            Self::Secret(_) => RecordKind::Secret,
            Self::ConfigMap(_) => RecordKind::ConfigMap,
            Self::Schema(_) => RecordKind::Schema,
        }
    }

    #[must_use]
    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Catalog(r) => &r.metadata,
            Self::App(r) => &r.metadata,
            Self::Secret(r) => &r.metadata,
            Self::ConfigMap(r) => &r.metadata,
            Self::Schema(r) => &r.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Self::Catalog(r) => &mut r.metadata,
            Self::App(r) => &mut r.metadata,
            Self::Secret(r) => &mut r.metadata,
            Self::ConfigMap(r) => &mut r.metadata,
            Self::Schema(r) => &mut r.metadata,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.metadata().namespace.as_deref()
    }

    /// `namespace/name` or `name`.
    #[must_use]
    pub fn key(&self) -> String {
        self.metadata().key()
    }

    /// Encodes the record including `apiVersion` and `kind`.
    pub fn to_json(&self) -> Result<Value, StorageError> {
        let encoded = match self {
            Self::Catalog(r) => serde_json::to_value(r),
            Self::App(r) => serde_json::to_value(r),
            Self::Secret(r) => serde_json::to_value(r),
            Self::ConfigMap(r) => serde_json::to_value(r),
            Self::Schema(r) => serde_json::to_value(r),
        };
        let mut value = encoded.map_err(|e| {
            StorageError::invalid_record(format!("failed to encode {}: {e}", self.kind()))
        })?;

        if let Some(obj) = value.as_object_mut() {
            let kind = self.kind();
            obj.insert("apiVersion".to_string(), Value::String(kind.api_version()));
            obj.insert("kind".to_string(), Value::String(kind.kind_name().to_string()));
        }
        Ok(value)
    }

    /// Decodes a record of the given kind. Unknown fields are ignored.
    pub fn from_json(kind: RecordKind, value: Value) -> Result<Self, StorageError> {
        let decoded = match kind {
            RecordKind::Catalog => serde_json::from_value(value).map(Self::Catalog),
            RecordKind::App => serde_json::from_value(value).map(Self::App),
            RecordKind::Secret => serde_json::from_value(value).map(Self::Secret),
            RecordKind::ConfigMap => serde_json::from_value(value).map(Self::ConfigMap),
            RecordKind::Schema => serde_json::from_value(value).map(Self::Schema),
        };
        decoded.map_err(|e| StorageError::invalid_record(format!("failed to decode {kind}: {e}")))
    }

    pub fn into_app(self) -> Result<AppRecord, StorageError> {
        match self {
            Self::App(r) => Ok(r),
            other => Err(unexpected_kind(RecordKind::App, other.kind())),
        }
    }

    pub fn into_secret(self) -> Result<SecretRecord, StorageError> {
        match self {
            Self::Secret(r) => Ok(r),
            other => Err(unexpected_kind(RecordKind::Secret, other.kind())),
        }
    }

    pub fn into_config_map(self) -> Result<ConfigMapRecord, StorageError> {
        match self {
            Self::ConfigMap(r) => Ok(r),
            other => Err(unexpected_kind(RecordKind::ConfigMap, other.kind())),
        }
    }

    pub fn into_schema(self) -> Result<SchemaRecord, StorageError> {
        match self {
            Self::Schema(r) => Ok(r),
            other => Err(unexpected_kind(RecordKind::Schema, other.kind())),
        }
    }
}

fn unexpected_kind(expected: RecordKind, actual: RecordKind) -> StorageError {
    StorageError::invalid_record(format!("expected {expected}, got {actual}"))
}

impl From<CatalogRecord> for Record {
    fn from(r: CatalogRecord) -> Self {
        Self::Catalog(r)
    }
}

impl From<AppRecord> for Record {
    fn from(r: AppRecord) -> Self {
        Self::App(r)
    }
}

impl From<SecretRecord> for Record {
    fn from(r: SecretRecord) -> Self {
        Self::Secret(r)
    }
}

impl From<ConfigMapRecord> for Record {
    fn from(r: ConfigMapRecord) -> Self {
        Self::ConfigMap(r)
    }
}

impl From<SchemaRecord> for Record {
    fn from(r: SchemaRecord) -> Self {
        Self::Schema(r)
    }
}

/// Equality-based label filter used by `list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    labels: BTreeMap<String, String>,
}

impl LabelSelector {
    /// Matches every record.
    #[must_use]
    pub fn everything() -> Self {
        Self::default()
    }

    /// Requires `key=value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.labels
            .iter()
            .all(|(k, v)| labels.get(k).is_some_and(|actual| actual == v))
    }

    /// Renders the selector in `k=v,k2=v2` form.
    #[must_use]
    pub fn to_query(&self) -> String {
        self.labels
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_kind_paths() {
        assert_eq!(RecordKind::App.api_version(), "application.giantswarm.io/v1alpha1");
        assert_eq!(RecordKind::Secret.api_version(), "v1");
        assert_eq!(RecordKind::Schema.api_version(), "apiextensions.k8s.io/v1");
        assert!(RecordKind::ConfigMap.is_namespaced());
        assert!(!RecordKind::Catalog.is_namespaced());
    }

    #[test]
    fn test_app_record_json_shape() {
        let app = AppRecord {
            metadata: ObjectMeta::namespaced("hello", "giantswarm")
                .with_label(OPERATOR_VERSION_LABEL, "0.0.0"),
            spec: AppRecordSpec {
                catalog: "default".into(),
                name: "hello".into(),
                namespace: "kube-system".into(),
                version: "1.0.0".into(),
                kube_config: KubeConfigSource::in_cluster(),
                user_config: UserConfig::default(),
            },
            status: AppStatus::default(),
        };

        let value = Record::from(app).to_json().unwrap();
        assert_eq!(value["apiVersion"], "application.giantswarm.io/v1alpha1");
        assert_eq!(value["kind"], "App");
        assert_eq!(value["spec"]["kubeConfig"]["inCluster"], true);
        assert!(value["spec"].get("userConfig").is_none());
        assert_eq!(
            value["metadata"]["labels"][OPERATOR_VERSION_LABEL],
            "0.0.0"
        );
    }

    #[test]
    fn test_app_status_decoding_ignores_unknown_fields() {
        let value = json!({
            "apiVersion": "application.giantswarm.io/v1alpha1",
            "kind": "App",
            "metadata": {"name": "hello", "namespace": "giantswarm", "resourceVersion": "42", "generation": 3},
            "spec": {
                "catalog": "default",
                "name": "hello",
                "namespace": "kube-system",
                "version": "1.0.0",
                "kubeConfig": {"inCluster": true}
            },
            "status": {
                "appVersion": "1.0.0",
                "release": {"status": "deployed", "lastDeployed": "2021-01-01T00:00:00Z"},
                "version": "1.0.0"
            }
        });

        let app = Record::from_json(RecordKind::App, value)
            .unwrap()
            .into_app()
            .unwrap();
        assert_eq!(app.metadata.resource_version.as_deref(), Some("42"));
        assert_eq!(app.status.release.status, "deployed");
        assert_eq!(app.status.version, "1.0.0");
    }

    #[test]
    fn test_secret_data_is_base64_on_the_wire() {
        let mut secret = SecretRecord {
            metadata: ObjectMeta::namespaced("hello-kubeconfig", "giantswarm"),
            data: BTreeMap::new(),
        };
        secret.data.insert("kubeConfig".into(), b"apiVersion: v1".to_vec());

        let value = Record::from(secret.clone()).to_json().unwrap();
        assert_eq!(value["data"]["kubeConfig"], "YXBpVmVyc2lvbjogdjE=");

        let decoded = Record::from_json(RecordKind::Secret, value)
            .unwrap()
            .into_secret()
            .unwrap();
        assert_eq!(decoded, secret);
    }

    #[test]
    fn test_schema_record_naming_and_established() {
        let mut schema = SchemaRecord::new(
            "monitoring.giantswarm.io",
            "Silence",
            "v1alpha1",
            SchemaScope::Namespaced,
        );
        assert_eq!(schema.metadata.name, "silences.monitoring.giantswarm.io");
        assert_eq!(schema.spec.names.list_kind, "SilenceList");
        assert!(!schema.is_established());

        schema.status.conditions.push(SchemaCondition::established());
        assert!(schema.is_established());
    }

    #[test]
    fn test_into_wrong_kind_fails() {
        let cm = ConfigMapRecord {
            metadata: ObjectMeta::namespaced("a", "b"),
            data: BTreeMap::new(),
        };
        let err = Record::from(cm).into_app().unwrap_err();
        assert_eq!(err.to_string(), "Invalid record: expected App, got ConfigMap");
    }

    #[test]
    fn test_label_selector() {
        let selector = LabelSelector::everything().with(OPERATOR_VERSION_LABEL, "0.0.0");
        let mut labels = BTreeMap::new();
        assert!(!selector.matches(&labels));
        labels.insert(OPERATOR_VERSION_LABEL.to_string(), "0.0.0".to_string());
        assert!(selector.matches(&labels));
        assert_eq!(selector.to_query(), "app-operator.giantswarm.io/version=0.0.0");
        assert!(LabelSelector::everything().matches(&BTreeMap::new()));
    }
}
