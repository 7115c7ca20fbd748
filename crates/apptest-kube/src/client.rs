use std::path::Path;

use apptest_storage::{
    LabelSelector, Record, RecordKind, ResourceClient, StorageError, record_key,
};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Api, ApiResource, DeleteParams, DynamicObject, ListParams, PostParams};
use kube::core::GroupVersionKind;

use crate::kubeconfig::{self, ConnectionOptions, KubeConfigError};

/// What a request was doing, for mapping `409 Conflict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Create,
    Read,
    Replace,
    Delete,
    List,
}

/// [`ResourceClient`] backed by a `kube` client.
#[derive(Clone)]
pub struct KubeClient {
    client: kube::Client,
}

impl KubeClient {
    /// Wraps an existing client.
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    /// Builds a client from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns `KubeConfigError::Client` if the TLS setup described by the
    /// configuration is invalid.
    pub fn try_from_config(config: kube::Config) -> Result<Self, KubeConfigError> {
        let client =
            kube::Client::try_from(config).map_err(|e| KubeConfigError::Client(e.to_string()))?;
        Ok(Self::new(client))
    }

    /// Builds a client from an inline kubeconfig document.
    pub async fn from_kubeconfig(
        yaml: &str,
        options: &ConnectionOptions,
    ) -> Result<Self, KubeConfigError> {
        Self::try_from_config(kubeconfig::load(yaml, options).await?)
    }

    /// Builds a client from a kubeconfig file.
    pub async fn from_kubeconfig_path(
        path: impl AsRef<Path>,
        options: &ConnectionOptions,
    ) -> Result<Self, KubeConfigError> {
        Self::try_from_config(kubeconfig::load_from_path(path, options).await?)
    }

    /// Api handle for one kind. Namespaced kinds without a namespace get
    /// the all-namespaces handle, which only supports listing.
    fn api(&self, kind: RecordKind, namespace: Option<&str>) -> Api<DynamicObject> {
        let resource = api_resource(kind);
        match namespace {
            Some(ns) if kind.is_namespaced() => {
                Api::namespaced_with(self.client.clone(), ns, &resource)
            }
            _ => Api::all_with(self.client.clone(), &resource),
        }
    }

    /// Api handle for a single object; namespaced kinds need a namespace.
    fn object_api(
        &self,
        kind: RecordKind,
        namespace: Option<&str>,
    ) -> Result<Api<DynamicObject>, StorageError> {
        if kind.is_namespaced() && namespace.is_none() {
            return Err(StorageError::invalid_record(format!(
                "{kind} records are namespaced but no namespace was given"
            )));
        }
        Ok(self.api(kind, namespace))
    }
}

fn api_resource(kind: RecordKind) -> ApiResource {
    match kind {
        RecordKind::Secret => ApiResource::erase::<Secret>(&()),
        RecordKind::ConfigMap => ApiResource::erase::<ConfigMap>(&()),
        RecordKind::Schema => ApiResource::erase::<CustomResourceDefinition>(&()),
        RecordKind::Catalog | RecordKind::App => ApiResource::from_gvk_with_plural(
            &GroupVersionKind::gvk(kind.group(), kind.version(), kind.kind_name()),
            kind.plural(),
        ),
    }
}

fn namespace_of(kind: RecordKind, namespace: Option<&str>) -> Option<&str> {
    namespace.filter(|ns| kind.is_namespaced() && !ns.is_empty())
}

fn to_object(record: &Record) -> Result<DynamicObject, StorageError> {
    serde_json::from_value(record.to_json()?).map_err(|e| {
        StorageError::invalid_record(format!("failed to encode {}: {e}", record.kind()))
    })
}

fn from_object(kind: RecordKind, object: DynamicObject) -> Result<Record, StorageError> {
    let value = serde_json::to_value(object).map_err(|e| {
        StorageError::invalid_record(format!("failed to decode {kind} response: {e}"))
    })?;
    Record::from_json(kind, value)
}

fn map_error(err: kube::Error, verb: Verb, kind: RecordKind, key: &str) -> StorageError {
    match err {
        kube::Error::Api(ae) if ae.code == 404 => StorageError::not_found(kind, key),
        kube::Error::Api(ae) if ae.code == 409 && (verb == Verb::Create || ae.reason == "AlreadyExists") => {
            StorageError::already_exists(kind, key)
        }
        kube::Error::Api(ae) if ae.code == 409 => StorageError::conflict(kind, key, ae.message),
        kube::Error::Api(ae) => StorageError::api(ae.code, ae.message),
        kube::Error::SerdeError(e) => {
            StorageError::invalid_record(format!("failed to parse {kind} response: {e}"))
        }
        other => {
            tracing::warn!(kind = %kind, key = %key, ?verb, error = %other, "Kubernetes API request failed");
            StorageError::connection_error(other.to_string())
        }
    }
}

#[async_trait]
impl ResourceClient for KubeClient {
    async fn create(&self, record: &Record) -> Result<Record, StorageError> {
        let kind = record.kind();
        let key = record.key();
        let api = self.object_api(kind, namespace_of(kind, record.namespace()))?;
        let object = to_object(record)?;

        tracing::debug!(kind = %kind, key = %key, "Creating record");
        let created = api
            .create(&PostParams::default(), &object)
            .await
            .map_err(|e| map_error(e, Verb::Create, kind, &key))?;
        from_object(kind, created)
    }

    async fn get(
        &self,
        kind: RecordKind,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<Record, StorageError> {
        let namespace = namespace_of(kind, namespace);
        let key = record_key(name, namespace);
        let object = self
            .object_api(kind, namespace)?
            .get(name)
            .await
            .map_err(|e| map_error(e, Verb::Read, kind, &key))?;
        from_object(kind, object)
    }

    async fn update(&self, record: &Record) -> Result<Record, StorageError> {
        let kind = record.kind();
        let key = record.key();
        let api = self.object_api(kind, namespace_of(kind, record.namespace()))?;
        let object = to_object(record)?;

        tracing::debug!(kind = %kind, key = %key, "Updating record");
        let replaced = api
            .replace(record.name(), &PostParams::default(), &object)
            .await
            .map_err(|e| map_error(e, Verb::Replace, kind, &key))?;
        from_object(kind, replaced)
    }

    async fn delete(
        &self,
        kind: RecordKind,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<(), StorageError> {
        let namespace = namespace_of(kind, namespace);
        let key = record_key(name, namespace);

        tracing::debug!(kind = %kind, key = %key, "Deleting record");
        self.object_api(kind, namespace)?
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| map_error(e, Verb::Delete, kind, &key))?;
        Ok(())
    }

    async fn list(
        &self,
        kind: RecordKind,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> Result<Vec<Record>, StorageError> {
        let namespace = namespace_of(kind, namespace);
        let key = record_key(kind.plural(), namespace);
        let mut params = ListParams::default();
        if !selector.is_empty() {
            params = params.labels(&selector.to_query());
        }

        let objects = self
            .api(kind, namespace)
            .list(&params)
            .await
            .map_err(|e| map_error(e, Verb::List, kind, &key))?;
        objects
            .items
            .into_iter()
            .map(|object| from_object(kind, object))
            .collect()
    }

    fn backend_name(&self) -> &'static str {
        "kubernetes"
    }
}
