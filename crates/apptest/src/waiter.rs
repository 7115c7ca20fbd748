//! Convergence waiting.
//!
//! A wait is a loop of polls. Each poll is reduced to a [`PollOutcome`] by a
//! pure classification function; [`poll_until`] decides whether to stop,
//! sleep or give up. Sleeping goes through a [`Scheduler`] so tests can run
//! the loop without real time passing.
//!
//! ```text
//!            ┌──────── Continue / FailTransient ────────┐
//!            ▼                                          │
//!   poll ──► classify ──► Succeed ──► Ok(())            │
//!                    ├──► FailTerminal ──► Err          │
//!                    └──► deadline left? ── yes ─ sleep ┘
//!                                   └── no ──► Err(DeadlineExceeded)
//! ```

use std::future::Future;
use std::time::Duration;

use apptest_storage::{AppStatus, RecordKind, ResourceClient, SchemaRecord};
use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::app::{App, STATUS_DEPLOYED, STATUS_FAILED, STATUS_NOT_INSTALLED};
use crate::error::{AppTestError, RecordRef, Result};

/// Source of time for poll loops.
#[async_trait]
pub trait Scheduler: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Scheduler backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry schedule of a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub initial_interval: Duration,
    /// Upper bound for the delay between retries.
    pub max_interval: Duration,
    /// Factor applied to the delay after each retry.
    pub multiplier: u32,
    /// Total time after which the wait gives up.
    pub deadline: Duration,
}

impl BackoffPolicy {
    /// Fixed delay between retries.
    #[must_use]
    pub fn constant(interval: Duration, deadline: Duration) -> Self {
        Self {
            initial_interval: interval,
            max_interval: interval,
            multiplier: 1,
            deadline,
        }
    }

    /// Doubling delay, capped at `max_interval`.
    #[must_use]
    pub fn exponential(initial: Duration, max_interval: Duration, deadline: Duration) -> Self {
        Self {
            initial_interval: initial,
            max_interval,
            multiplier: 2,
            deadline,
        }
    }

    /// 10 second polls for up to 20 minutes.
    #[must_use]
    pub fn app_default() -> Self {
        Self::constant(Duration::from_secs(10), Duration::from_secs(20 * 60))
    }

    /// 1 second doubling to 10 seconds, for up to 1 minute.
    #[must_use]
    pub fn schema_default() -> Self {
        Self::exponential(
            Duration::from_secs(1),
            Duration::from_secs(10),
            Duration::from_secs(60),
        )
    }

    /// Rejects schedules that would poll without sleeping.
    ///
    /// # Errors
    ///
    /// Returns a message naming the zero interval.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.initial_interval.is_zero() {
            return Err("wait policy initial interval must be > 0".into());
        }
        if self.max_interval.is_zero() {
            return Err("wait policy max interval must be > 0".into());
        }
        Ok(())
    }

    /// Delay following `current`.
    #[must_use]
    pub fn next_interval(&self, current: Duration) -> Duration {
        current
            .saturating_mul(self.multiplier.max(1))
            .min(self.max_interval)
    }
}

/// Result of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Not converged yet; the reason is logged and kept for the deadline error.
    Continue(String),
    /// Converged.
    Succeed,
    /// The reconciler gave up; stop without retrying.
    FailTerminal { status: String, reason: String },
    /// Fetching the record failed; retry.
    FailTransient(String),
}

/// Version an application must report before it counts as deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionTarget {
    /// Observed version must end with the commit.
    Commit(String),
    /// Observed version must equal this one.
    Exact(String),
    /// Any version.
    Any,
}

impl VersionTarget {
    /// Target implied by a descriptor; a commit takes precedence.
    #[must_use]
    pub fn for_app(app: &App) -> Self {
        match (app.commit_ref(), app.version()) {
            (Some(commit), _) => Self::Commit(commit.to_string()),
            (None, Some(version)) => Self::Exact(version.to_string()),
            (None, None) => Self::Any,
        }
    }

    #[must_use]
    pub fn matches(&self, observed: &str) -> bool {
        match self {
            Self::Commit(commit) => observed.ends_with(commit.as_str()),
            Self::Exact(version) => observed == version,
            Self::Any => true,
        }
    }

    fn wanted(&self) -> &str {
        match self {
            Self::Commit(v) | Self::Exact(v) => v,
            Self::Any => "",
        }
    }
}

/// Classifies the observed status of an application record.
#[must_use]
pub fn classify_app_status(status: &AppStatus, target: &VersionTarget) -> PollOutcome {
    let release = &status.release;
    match release.status.as_str() {
        STATUS_NOT_INSTALLED | STATUS_FAILED => PollOutcome::FailTerminal {
            status: release.status.clone(),
            reason: release.reason.clone(),
        },
        STATUS_DEPLOYED if target.matches(&status.version) => PollOutcome::Succeed,
        STATUS_DEPLOYED => PollOutcome::Continue(format!(
            "waiting for version matching {:?}, current version {:?}",
            target.wanted(),
            status.version
        )),
        other => PollOutcome::Continue(format!(
            "waiting for {STATUS_DEPLOYED:?}, current {other:?}"
        )),
    }
}

/// Classifies the observed status of a schema extension record.
#[must_use]
pub fn classify_schema(schema: &SchemaRecord) -> PollOutcome {
    if schema.is_established() {
        PollOutcome::Succeed
    } else {
        PollOutcome::Continue(format!(
            "schema extension {} is not established yet",
            schema.metadata.name
        ))
    }
}

/// Polls until `poll` reports a terminal outcome, the deadline passes or
/// `cancel` fires.
///
/// A retry is only scheduled if it would start before the deadline.
///
/// # Errors
///
/// Returns `AppTestError::Config` for a policy with a zero interval, without
/// polling. Otherwise `AppTestError::TerminalFailure`,
/// `AppTestError::DeadlineExceeded` carrying the last reason, or
/// `AppTestError::Cancelled`.
pub async fn poll_until<F, Fut>(
    scheduler: &dyn Scheduler,
    policy: &BackoffPolicy,
    cancel: &CancellationToken,
    target: &RecordRef,
    mut poll: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollOutcome>,
{
    policy.validate().map_err(AppTestError::Config)?;

    let started = scheduler.now();
    let mut interval = policy.initial_interval;
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(AppTestError::Cancelled {
                target: target.clone(),
            });
        }
        attempt += 1;

        let reason = match poll().await {
            PollOutcome::Succeed => return Ok(()),
            PollOutcome::FailTerminal { status, reason } => {
                return Err(AppTestError::TerminalFailure {
                    target: target.clone(),
                    status,
                    reason,
                });
            }
            PollOutcome::Continue(reason) => {
                tracing::debug!(
                    target_record = %target,
                    attempt,
                    reason = %reason,
                    retry_in = ?interval,
                    "Not converged yet, retrying"
                );
                reason
            }
            PollOutcome::FailTransient(reason) => {
                tracing::warn!(
                    target_record = %target,
                    attempt,
                    error = %reason,
                    retry_in = ?interval,
                    "Failed to read record, retrying"
                );
                reason
            }
        };

        let waited = scheduler.now().saturating_duration_since(started);
        if waited.saturating_add(interval) > policy.deadline {
            return Err(AppTestError::DeadlineExceeded {
                target: target.clone(),
                waited,
                last_reason: reason,
            });
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(AppTestError::Cancelled {
                    target: target.clone(),
                });
            }
            _ = scheduler.sleep(interval) => {}
        }
        interval = policy.next_interval(interval);
    }
}

/// Waits for records to converge.
pub struct ConvergenceWaiter<'a> {
    client: &'a dyn ResourceClient,
    scheduler: &'a dyn Scheduler,
}

impl<'a> ConvergenceWaiter<'a> {
    pub fn new(client: &'a dyn ResourceClient, scheduler: &'a dyn Scheduler) -> Self {
        Self { client, scheduler }
    }

    /// Waits until the application record reports `deployed` at `version`.
    pub async fn wait_for_app(
        &self,
        name: &str,
        namespace: &str,
        version: &VersionTarget,
        policy: &BackoffPolicy,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let target = RecordRef::app(name, namespace);
        tracing::debug!(name = %name, namespace = %namespace, "Ensuring app is deployed");

        poll_until(self.scheduler, policy, cancel, &target, || async {
            match self.client.get_app(name, namespace).await {
                Ok(app) => classify_app_status(&app.status, version),
                Err(e) => PollOutcome::FailTransient(e.to_string()),
            }
        })
        .await?;

        tracing::info!(name = %name, namespace = %namespace, "App is deployed");
        Ok(())
    }

    /// Waits until the schema extension record is established.
    pub async fn wait_for_schema(
        &self,
        name: &str,
        policy: &BackoffPolicy,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let target = RecordRef::new(RecordKind::Schema, name, None);

        poll_until(self.scheduler, policy, cancel, &target, || async {
            match self.client.get_schema(name).await {
                Ok(schema) => classify_schema(&schema),
                Err(e) => PollOutcome::FailTransient(e.to_string()),
            }
        })
        .await?;

        tracing::info!(name = %name, "Schema extension is established");
        Ok(())
    }
}
