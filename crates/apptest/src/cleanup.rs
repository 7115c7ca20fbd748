//! Best-effort removal of the records written for descriptors.

use apptest_storage::{RecordKind, ResourceClient};

use crate::app::App;
use crate::builders::{kubeconfig_secret_name, user_values_name};
use crate::error::{AppTestError, Operation, RecordRef, Result};

/// Deletes the primary record, kubeconfig secret and user values config map
/// of every descriptor. Records that do not exist are skipped.
///
/// Catalogs are shared between descriptors and are never deleted. Deletion
/// is not awaited.
pub async fn clean_up(client: &dyn ResourceClient, apps: &[App]) -> Result<()> {
    for app in apps {
        let namespace = app.record_namespace();
        let records = [
            (RecordKind::App, app.name.clone()),
            (RecordKind::Secret, kubeconfig_secret_name(&app.name)),
            (RecordKind::ConfigMap, user_values_name(&app.name)),
        ];

        for (kind, name) in records {
            match client.delete(kind, &name, Some(namespace)).await {
                Ok(()) => tracing::debug!(kind = %kind, name = %name, namespace = %namespace, "Deleted record"),
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    return Err(AppTestError::storage(
                        Operation::Delete,
                        RecordRef::new(kind, name, Some(namespace)),
                        e,
                    ));
                }
            }
        }
    }
    Ok(())
}
