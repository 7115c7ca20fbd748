//! Pure construction of the records written for a descriptor.

use std::collections::BTreeMap;

use apptest_storage::{
    AppRecord, AppRecordSpec, AppStatus, CatalogRecord, CatalogSpec, CatalogStorage,
    ConfigMapRecord, ConfigMapReference, KubeConfigContext, KubeConfigSource,
    OPERATOR_VERSION_LABEL, ObjectMeta, SecretRecord, SecretReference, UserConfig,
};

use crate::app::{App, UNIQUE_OPERATOR_VERSION};

/// Data key of the kubeconfig secret.
pub const KUBECONFIG_KEY: &str = "kubeConfig";

/// Data key of the user values config map.
pub const VALUES_KEY: &str = "values";

const HELM_STORAGE: &str = "helm";

#[must_use]
pub fn kubeconfig_secret_name(app_name: &str) -> String {
    format!("{app_name}-kubeconfig")
}

#[must_use]
pub fn user_values_name(app_name: &str) -> String {
    format!("{app_name}-user-values")
}

/// Catalog registration, reconciled by the unique operator instance.
#[must_use]
pub fn catalog_record(name: &str, url: &str) -> CatalogRecord {
    CatalogRecord {
        metadata: ObjectMeta::cluster(name)
            .with_label(OPERATOR_VERSION_LABEL, UNIQUE_OPERATOR_VERSION),
        spec: CatalogSpec {
            title: name.to_string(),
            description: name.to_string(),
            storage: CatalogStorage {
                storage_type: HELM_STORAGE.to_string(),
                url: url.to_string(),
            },
        },
    }
}

/// Secret carrying the target cluster credentials.
#[must_use]
pub fn kubeconfig_secret(app: &App, kube_config: &str) -> SecretRecord {
    let mut data = BTreeMap::new();
    data.insert(KUBECONFIG_KEY.to_string(), kube_config.as_bytes().to_vec());
    SecretRecord {
        metadata: ObjectMeta::namespaced(kubeconfig_secret_name(&app.name), app.record_namespace()),
        data,
    }
}

/// Config map carrying the user values overlay.
#[must_use]
pub fn user_values_config_map(app: &App, values: &str) -> ConfigMapRecord {
    let mut data = BTreeMap::new();
    data.insert(VALUES_KEY.to_string(), values.to_string());
    ConfigMapRecord {
        metadata: ObjectMeta::namespaced(user_values_name(&app.name), app.record_namespace()),
        data,
    }
}

/// Where the reconciler should read target credentials from.
#[must_use]
pub fn kubeconfig_source(app: &App) -> KubeConfigSource {
    if app.kube_config().is_none() {
        return KubeConfigSource::in_cluster();
    }
    let secret_name = kubeconfig_secret_name(&app.name);
    KubeConfigSource {
        in_cluster: false,
        context: Some(KubeConfigContext {
            name: secret_name.clone(),
        }),
        secret: Some(SecretReference {
            name: secret_name,
            namespace: app.record_namespace().to_string(),
        }),
    }
}

/// The primary record for `app` at the resolved `version`.
#[must_use]
pub fn app_record(app: &App, version: &str) -> AppRecord {
    let user_config = UserConfig {
        config_map: app.values_yaml().map(|_| ConfigMapReference {
            name: user_values_name(&app.name),
            namespace: app.record_namespace().to_string(),
        }),
    };

    AppRecord {
        metadata: ObjectMeta::namespaced(&app.name, app.record_namespace())
            .with_label(OPERATOR_VERSION_LABEL, app.operator_version()),
        spec: AppRecordSpec {
            catalog: app.catalog_name.clone(),
            name: app.name.clone(),
            namespace: app.namespace.clone(),
            version: version.to_string(),
            kube_config: kubeconfig_source(app),
            user_config,
        },
        status: AppStatus::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_record() {
        let record = catalog_record("default", "https://giantswarm.github.io/default-catalog/");
        assert_eq!(record.metadata.name, "default");
        assert_eq!(record.metadata.namespace, None);
        assert_eq!(record.spec.title, "default");
        assert_eq!(record.spec.description, "default");
        assert_eq!(record.spec.storage.storage_type, "helm");
        assert_eq!(
            record.metadata.labels.get(OPERATOR_VERSION_LABEL).map(String::as_str),
            Some("0.0.0")
        );
    }

    #[test]
    fn test_in_cluster_app_record() {
        let app = App::new("cert-manager-app", "default")
            .with_namespace("kube-system")
            .with_version("2.3.1");
        let record = app_record(&app, "2.3.1");

        assert_eq!(record.metadata.namespace.as_deref(), Some("giantswarm"));
        assert_eq!(record.spec.namespace, "kube-system");
        assert_eq!(record.spec.version, "2.3.1");
        assert!(record.spec.kube_config.in_cluster);
        assert!(record.spec.user_config.is_empty());
    }

    #[test]
    fn test_remote_cluster_app_record() {
        let app = App::new("hello", "default")
            .with_record_namespace("org-acme")
            .with_kube_config("apiVersion: v1")
            .with_values_yaml("e2e: true")
            .with_operator_version("2.0.0");
        let record = app_record(&app, "1.0.0");

        let kube = &record.spec.kube_config;
        assert!(!kube.in_cluster);
        assert_eq!(kube.context.as_ref().unwrap().name, "hello-kubeconfig");
        assert_eq!(
            kube.secret,
            Some(SecretReference {
                name: "hello-kubeconfig".into(),
                namespace: "org-acme".into()
            })
        );
        assert_eq!(
            record.spec.user_config.config_map,
            Some(ConfigMapReference {
                name: "hello-user-values".into(),
                namespace: "org-acme".into()
            })
        );
        assert_eq!(
            record.metadata.labels.get(OPERATOR_VERSION_LABEL).map(String::as_str),
            Some("2.0.0")
        );
    }

    #[test]
    fn test_secondary_records() {
        let app = App::new("hello", "default");
        let secret = kubeconfig_secret(&app, "kind: Config");
        assert_eq!(secret.metadata.key(), "giantswarm/hello-kubeconfig");
        assert_eq!(secret.data[KUBECONFIG_KEY], b"kind: Config".to_vec());

        let cm = user_values_config_map(&app, "e2e: true");
        assert_eq!(cm.metadata.key(), "giantswarm/hello-user-values");
        assert_eq!(cm.data[VALUES_KEY], "e2e: true");
    }
}
