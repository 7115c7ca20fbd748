use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use apptest_storage::{
    AppStatus, LabelSelector, Record, RecordKind, ResourceClient, SchemaCondition, StorageError,
    record_key,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

pub type StorageKey = String; // Format: "Kind/namespace/name" or "Kind/name"

pub(crate) fn make_storage_key(kind: RecordKind, name: &str, namespace: Option<&str>) -> StorageKey {
    format!("{kind}/{}", record_key(name, effective_namespace(kind, namespace)))
}

/// Cluster scoped kinds never carry a namespace.
fn effective_namespace(kind: RecordKind, namespace: Option<&str>) -> Option<&str> {
    if kind.is_namespaced() {
        namespace
    } else {
        None
    }
}

/// A status change the fake reconciler applies on a later `get`.
#[derive(Debug, Clone)]
enum ScriptedStatus {
    App(AppStatus),
    Schema(Vec<SchemaCondition>),
}

#[derive(Debug, Default)]
struct State {
    records: HashMap<StorageKey, Record>,
    scripts: HashMap<StorageKey, VecDeque<ScriptedStatus>>,
}

/// Write and read counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub creates: u64,
    pub updates: u64,
    pub deletes: u64,
    pub gets: u64,
}

/// In-memory resource store.
///
/// This implementation provides:
/// - Create/get/update/delete/list with the same absorbed-error contract as a real API
/// - Optimistic concurrency on `resourceVersion`
/// - Status preserved across spec updates, as with a status subresource
/// - Scripted status sequences standing in for the reconciler
/// - Injected transient `get` failures
#[derive(Debug, Default)]
pub struct InMemoryClient {
    state: RwLock<State>,
    version_counter: AtomicU64,
    failing_gets: AtomicUsize,
    creates: AtomicU64,
    updates: AtomicU64,
    deletes: AtomicU64,
    gets: AtomicU64,
}

impl InMemoryClient {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            version_counter: AtomicU64::new(1),
            ..Default::default()
        }
    }

    /// Generates the next resource version.
    fn next_version(&self) -> String {
        self.version_counter
            .fetch_add(1, Ordering::SeqCst)
            .to_string()
    }

    fn validate_namespace(record: &Record) -> Result<(), StorageError> {
        let kind = record.kind();
        if kind.is_namespaced() && record.namespace().is_none_or(str::is_empty) {
            return Err(StorageError::invalid_record(format!(
                "{kind} {} requires a namespace",
                record.name()
            )));
        }
        Ok(())
    }

    /// Queues statuses for an application record; each `get` applies one.
    ///
    /// The last applied status stays in place once the queue is drained.
    pub async fn script_app_statuses(
        &self,
        name: &str,
        namespace: &str,
        statuses: impl IntoIterator<Item = AppStatus>,
    ) {
        let key = make_storage_key(RecordKind::App, name, Some(namespace));
        let mut state = self.state.write().await;
        state
            .scripts
            .entry(key)
            .or_default()
            .extend(statuses.into_iter().map(ScriptedStatus::App));
    }

    /// Queues condition lists for a schema record; each `get` applies one.
    pub async fn script_schema_conditions(
        &self,
        name: &str,
        conditions: impl IntoIterator<Item = Vec<SchemaCondition>>,
    ) {
        let key = make_storage_key(RecordKind::Schema, name, None);
        let mut state = self.state.write().await;
        state
            .scripts
            .entry(key)
            .or_default()
            .extend(conditions.into_iter().map(ScriptedStatus::Schema));
    }

    /// Overwrites the observed status of an existing application record.
    pub async fn set_app_status(
        &self,
        name: &str,
        namespace: &str,
        status: AppStatus,
    ) -> Result<(), StorageError> {
        let key = make_storage_key(RecordKind::App, name, Some(namespace));
        let mut state = self.state.write().await;
        match state.records.get_mut(&key) {
            Some(Record::App(app)) => {
                app.status = status;
                Ok(())
            }
            _ => Err(StorageError::not_found(
                RecordKind::App,
                record_key(name, Some(namespace)),
            )),
        }
    }

    /// Makes the next `count` calls to `get` fail with a connection error.
    pub fn fail_next_gets(&self, count: usize) {
        self.failing_gets.store(count, Ordering::SeqCst);
    }

    /// Number of stored records of a kind.
    pub async fn count(&self, kind: RecordKind) -> usize {
        let state = self.state.read().await;
        state.records.values().filter(|r| r.kind() == kind).count()
    }

    /// Whether a record exists.
    pub async fn contains(&self, kind: RecordKind, name: &str, namespace: Option<&str>) -> bool {
        let key = make_storage_key(kind, name, namespace);
        self.state.read().await.records.contains_key(&key)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            creates: self.creates.load(Ordering::SeqCst),
            updates: self.updates.load(Ordering::SeqCst),
            deletes: self.deletes.load(Ordering::SeqCst),
            gets: self.gets.load(Ordering::SeqCst),
        }
    }

    fn take_injected_failure(&self) -> bool {
        self.failing_gets
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn apply_script(record: &mut Record, scripted: ScriptedStatus) {
    match (record, scripted) {
        (Record::App(app), ScriptedStatus::App(status)) => app.status = status,
        (Record::Schema(schema), ScriptedStatus::Schema(conditions)) => {
            schema.status.conditions = conditions;
        }
        (record, scripted) => {
            tracing::warn!(
                kind = %record.kind(),
                name = %record.name(),
                scripted = ?scripted,
                "Scripted status does not match record kind, ignoring"
            );
        }
    }
}

/// Carries server-managed status from the stored record into an update.
fn preserve_status(stored: &Record, incoming: &mut Record) {
    match (stored, incoming) {
        (Record::App(old), Record::App(new)) => new.status = old.status.clone(),
        (Record::Schema(old), Record::Schema(new)) => new.status = old.status.clone(),
        _ => {}
    }
}

#[async_trait]
impl ResourceClient for InMemoryClient {
    async fn create(&self, record: &Record) -> Result<Record, StorageError> {
        Self::validate_namespace(record)?;
        let kind = record.kind();
        let key = make_storage_key(kind, record.name(), record.namespace());

        let mut state = self.state.write().await;
        if state.records.contains_key(&key) {
            return Err(StorageError::already_exists(kind, record.key()));
        }

        let mut stored = record.clone();
        let meta = stored.metadata_mut();
        if !kind.is_namespaced() {
            meta.namespace = None;
        }
        meta.resource_version = Some(self.next_version());
        meta.uid = Some(uuid::Uuid::new_v4().to_string());

        state.records.insert(key, stored.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }

    async fn get(
        &self,
        kind: RecordKind,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<Record, StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.take_injected_failure() {
            return Err(StorageError::connection_error("injected failure"));
        }

        let key = make_storage_key(kind, name, namespace);
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let record = state.records.get_mut(&key).ok_or_else(|| {
            StorageError::not_found(kind, record_key(name, effective_namespace(kind, namespace)))
        })?;
        if let Some(scripted) = state.scripts.get_mut(&key).and_then(VecDeque::pop_front) {
            apply_script(record, scripted);
        }
        Ok(record.clone())
    }

    async fn update(&self, record: &Record) -> Result<Record, StorageError> {
        Self::validate_namespace(record)?;
        let kind = record.kind();
        let key = make_storage_key(kind, record.name(), record.namespace());

        let mut state = self.state.write().await;
        let stored = state
            .records
            .get(&key)
            .ok_or_else(|| StorageError::not_found(kind, record.key()))?;

        if let Some(expected) = record.metadata().resource_version.as_deref()
            && stored.metadata().resource_version.as_deref() != Some(expected)
        {
            return Err(StorageError::conflict(
                kind,
                record.key(),
                format!("resource version {expected} is stale"),
            ));
        }

        let mut updated = record.clone();
        preserve_status(stored, &mut updated);
        let uid = stored.metadata().uid.clone();
        let meta = updated.metadata_mut();
        meta.uid = uid;
        meta.resource_version = Some(self.next_version());

        state.records.insert(key, updated.clone());
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(updated)
    }

    async fn delete(
        &self,
        kind: RecordKind,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<(), StorageError> {
        let key = make_storage_key(kind, name, namespace);
        let mut state = self.state.write().await;
        state
            .records
            .remove(&key)
            .ok_or_else(|| StorageError::not_found(kind, record_key(name, namespace)))?;
        state.scripts.remove(&key);
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list(
        &self,
        kind: RecordKind,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> Result<Vec<Record>, StorageError> {
        let namespace = effective_namespace(kind, namespace);
        let state = self.state.read().await;
        let mut records: Vec<Record> = state
            .records
            .values()
            .filter(|r| r.kind() == kind)
            .filter(|r| namespace.is_none() || r.namespace() == namespace)
            .filter(|r| selector.matches(&r.metadata().labels))
            .cloned()
            .collect();
        records.sort_by_key(Record::key);
        Ok(records)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apptest_storage::{
        AppRecord, AppRecordSpec, CatalogRecord, CatalogSpec, ConfigMapRecord, KubeConfigSource,
        OPERATOR_VERSION_LABEL, ObjectMeta, SchemaRecord, SchemaScope, UserConfig,
    };
    use std::collections::BTreeMap;

    fn app(name: &str, version: &str) -> Record {
        Record::App(AppRecord {
            metadata: ObjectMeta::namespaced(name, "giantswarm")
                .with_label(OPERATOR_VERSION_LABEL, "0.0.0"),
            spec: AppRecordSpec {
                catalog: "default".into(),
                name: name.into(),
                namespace: "kube-system".into(),
                version: version.into(),
                kube_config: KubeConfigSource::in_cluster(),
                user_config: UserConfig::default(),
            },
            status: AppStatus::default(),
        })
    }

    fn catalog(name: &str) -> Record {
        Record::Catalog(CatalogRecord {
            metadata: ObjectMeta::cluster(name),
            spec: CatalogSpec::default(),
        })
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let client = InMemoryClient::new();
        let created = client.create(&app("hello", "1.0.0")).await.unwrap();
        assert!(created.metadata().resource_version.is_some());
        assert!(created.metadata().uid.is_some());

        let fetched = client.get_app("hello", "giantswarm").await.unwrap();
        assert_eq!(fetched.spec.version, "1.0.0");
    }

    #[tokio::test]
    async fn test_create_twice_is_already_exists() {
        let client = InMemoryClient::new();
        client.create(&app("hello", "1.0.0")).await.unwrap();
        let err = client.create(&app("hello", "2.0.0")).await.unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(client.count(RecordKind::App).await, 1);
    }

    #[tokio::test]
    async fn test_cluster_scoped_ignores_namespace() {
        let client = InMemoryClient::new();
        client.create(&catalog("default")).await.unwrap();
        assert!(client.contains(RecordKind::Catalog, "default", Some("whatever")).await);
        let record = client
            .get(RecordKind::Catalog, "default", None)
            .await
            .unwrap();
        assert_eq!(record.namespace(), None);
    }

    #[tokio::test]
    async fn test_namespaced_record_requires_namespace() {
        let client = InMemoryClient::new();
        let record = Record::ConfigMap(ConfigMapRecord {
            metadata: ObjectMeta::cluster("values"),
            data: BTreeMap::new(),
        });
        let err = client.create(&record).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidRecord { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let client = InMemoryClient::new();
        let err = client.update(&app("hello", "1.0.0")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_with_stale_version_conflicts() {
        let client = InMemoryClient::new();
        let created = client.create(&app("hello", "1.0.0")).await.unwrap();
        client.update(&created).await.unwrap();

        let err = client.update(&created).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_update_preserves_status() {
        let client = InMemoryClient::new();
        client.create(&app("hello", "1.0.0")).await.unwrap();
        client
            .set_app_status("hello", "giantswarm", AppStatus::new("deployed", "1.0.0"))
            .await
            .unwrap();

        let mut replacement = app("hello", "2.0.0");
        if let Record::App(a) = &mut replacement {
            a.status = AppStatus::new("failed", "bogus");
        }
        client.update(&replacement).await.unwrap();

        let fetched = client.get_app("hello", "giantswarm").await.unwrap();
        assert_eq!(fetched.spec.version, "2.0.0");
        assert_eq!(fetched.status.release.status, "deployed");
    }

    #[tokio::test]
    async fn test_delete() {
        let client = InMemoryClient::new();
        client.create(&app("hello", "1.0.0")).await.unwrap();
        client
            .delete(RecordKind::App, "hello", Some("giantswarm"))
            .await
            .unwrap();
        let err = client
            .delete(RecordKind::App, "hello", Some("giantswarm"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(client.stats().deletes, 1);
    }

    #[tokio::test]
    async fn test_list_filters_by_namespace_and_labels() {
        let client = InMemoryClient::new();
        client.create(&app("a", "1.0.0")).await.unwrap();
        client.create(&app("b", "1.0.0")).await.unwrap();
        let mut other = app("c", "1.0.0");
        other.metadata_mut().namespace = Some("other".into());
        other.metadata_mut().labels.clear();
        client.create(&other).await.unwrap();

        let all = client
            .list(RecordKind::App, None, &LabelSelector::everything())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let labelled = client
            .list(
                RecordKind::App,
                Some("giantswarm"),
                &LabelSelector::everything().with(OPERATOR_VERSION_LABEL, "0.0.0"),
            )
            .await
            .unwrap();
        let names: Vec<&str> = labelled.iter().map(Record::name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_scripted_app_statuses() {
        let client = InMemoryClient::new();
        client.create(&app("hello", "1.2.3")).await.unwrap();
        client
            .script_app_statuses(
                "hello",
                "giantswarm",
                [
                    AppStatus::new("pending-install", ""),
                    AppStatus::new("deployed", "1.2.3"),
                ],
            )
            .await;

        let first = client.get_app("hello", "giantswarm").await.unwrap();
        assert_eq!(first.status.release.status, "pending-install");
        let second = client.get_app("hello", "giantswarm").await.unwrap();
        assert_eq!(second.status.release.status, "deployed");
        let third = client.get_app("hello", "giantswarm").await.unwrap();
        assert_eq!(third.status.version, "1.2.3");
    }

    #[tokio::test]
    async fn test_scripted_schema_conditions() {
        let client = InMemoryClient::new();
        let schema = SchemaRecord::new("example.io", "Widget", "v1", SchemaScope::Cluster);
        let name = schema.metadata.name.clone();
        client.create(&Record::Schema(schema)).await.unwrap();
        client
            .script_schema_conditions(&name, [vec![], vec![SchemaCondition::established()]])
            .await;

        assert!(!client.get_schema(&name).await.unwrap().is_established());
        assert!(client.get_schema(&name).await.unwrap().is_established());
    }

    #[tokio::test]
    async fn test_injected_get_failures() {
        let client = InMemoryClient::new();
        client.create(&app("hello", "1.0.0")).await.unwrap();
        client.fail_next_gets(2);

        for _ in 0..2 {
            let err = client.get_app("hello", "giantswarm").await.unwrap_err();
            assert!(matches!(err, StorageError::ConnectionError { .. }));
        }
        assert!(client.get_app("hello", "giantswarm").await.is_ok());
        assert_eq!(client.stats().gets, 3);
    }
}
