//! Registration of schema extensions.

use apptest_storage::{Record, RecordKind, ResourceClient, SchemaRecord};
use tokio_util::sync::CancellationToken;

use crate::error::{AppTestError, Operation, RecordRef, Result};
use crate::waiter::{BackoffPolicy, ConvergenceWaiter, Scheduler};

/// Creates schema extensions and waits until the API serves them.
pub struct SchemaRegistrar<'a> {
    client: &'a dyn ResourceClient,
    scheduler: &'a dyn Scheduler,
    policy: &'a BackoffPolicy,
}

impl<'a> SchemaRegistrar<'a> {
    pub fn new(
        client: &'a dyn ResourceClient,
        scheduler: &'a dyn Scheduler,
        policy: &'a BackoffPolicy,
    ) -> Self {
        Self {
            client,
            scheduler,
            policy,
        }
    }

    /// Creates `schema` unless it exists, then waits for `Established`.
    pub async fn ensure(&self, schema: &SchemaRecord, cancel: &CancellationToken) -> Result<()> {
        let name = &schema.metadata.name;
        match self.client.create(&Record::Schema(schema.clone())).await {
            Ok(_) => tracing::debug!(name = %name, "Created schema extension"),
            Err(e) if e.is_already_exists() => {
                tracing::debug!(name = %name, "Schema extension already exists");
            }
            Err(e) => {
                return Err(AppTestError::storage(
                    Operation::Create,
                    RecordRef::new(RecordKind::Schema, name, None),
                    e,
                ));
            }
        }

        ConvergenceWaiter::new(self.client, self.scheduler)
            .wait_for_schema(name, self.policy, cancel)
            .await
    }
}
