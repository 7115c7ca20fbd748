//! Error types for the orchestrator.
//!
//! Every failure carries the record and operation it concerns. [`ErrorKind`]
//! gives callers a coarse classification to branch on.

use std::fmt;
use std::time::Duration;

use apptest_catalog::CatalogError;
use apptest_kube::KubeConfigError;
use apptest_storage::{RecordKind, StorageError, record_key};

/// Coarse classification of an [`AppTestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller input or configuration is invalid. Never retried.
    InputValidation,
    /// The remote side failed in a way that may succeed on retry.
    TransientRemote,
    /// The reconciler reported a terminal failure.
    TerminalRemoteFailure,
    /// A wait ran out of time.
    DeadlineExceeded,
    /// The caller cancelled the operation.
    Cancelled,
    /// A record or published version does not exist.
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputValidation => write!(f, "input_validation"),
            Self::TransientRemote => write!(f, "transient_remote"),
            Self::TerminalRemoteFailure => write!(f, "terminal_remote_failure"),
            Self::DeadlineExceeded => write!(f, "deadline_exceeded"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::NotFound => write!(f, "not_found"),
        }
    }
}

/// Operation that was being performed against the resource client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Get,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Get => write!(f, "get"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Identity of a record an error refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRef {
    pub kind: RecordKind,
    pub name: String,
    pub namespace: Option<String>,
}

impl RecordRef {
    #[must_use]
    pub fn new(kind: RecordKind, name: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: namespace.map(str::to_string),
        }
    }

    #[must_use]
    pub fn app(name: &str, namespace: &str) -> Self {
        Self::new(RecordKind::App, name, Some(namespace))
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.kind,
            record_key(&self.name, self.namespace.as_deref())
        )
    }
}

/// Errors returned by [`AppSetup`](crate::AppSetup) operations.
#[derive(Debug, thiserror::Error)]
pub enum AppTestError {
    /// A descriptor is invalid.
    #[error("invalid app {app}: {message}")]
    InvalidInput { app: String, message: String },

    /// The setup configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The cluster credentials could not be loaded.
    #[error("cluster configuration: {0}")]
    Cluster(#[from] KubeConfigError),

    /// A resource client call failed.
    #[error("{operation} {target}: {source}")]
    Storage {
        operation: Operation,
        target: RecordRef,
        source: StorageError,
    },

    /// Catalog lookup or version resolution failed.
    #[error("app {app}: {source}")]
    Catalog { app: String, source: CatalogError },

    /// The reconciler reported a terminal status.
    #[error("{target} status {status:?}, reason: {reason}")]
    TerminalFailure {
        target: RecordRef,
        status: String,
        reason: String,
    },

    /// A wait gave up before the record converged.
    #[error("{target} did not converge within {waited:?}: {last_reason}")]
    DeadlineExceeded {
        target: RecordRef,
        waited: Duration,
        last_reason: String,
    },

    /// The caller cancelled a wait.
    #[error("waiting for {target} was cancelled")]
    Cancelled { target: RecordRef },
}

impl AppTestError {
    #[must_use]
    pub fn invalid_input(app: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            app: app.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn storage(operation: Operation, target: RecordRef, source: StorageError) -> Self {
        Self::Storage {
            operation,
            target,
            source,
        }
    }

    #[must_use]
    pub fn catalog(app: impl Into<String>, source: CatalogError) -> Self {
        Self::Catalog {
            app: app.into(),
            source,
        }
    }

    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } | Self::Config(_) | Self::Cluster(_) => {
                ErrorKind::InputValidation
            }
            Self::Storage { source, .. } => match source {
                StorageError::NotFound { .. } => ErrorKind::NotFound,
                StorageError::InvalidRecord { .. } => ErrorKind::InputValidation,
                _ => ErrorKind::TransientRemote,
            },
            Self::Catalog { source, .. } => match source {
                e if e.is_input_error() => ErrorKind::InputValidation,
                CatalogError::AppNotFound { .. } | CatalogError::NoMatchingVersion { .. } => {
                    ErrorKind::NotFound
                }
                _ => ErrorKind::TransientRemote,
            },
            Self::TerminalFailure { .. } => ErrorKind::TerminalRemoteFailure,
            Self::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    #[must_use]
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. })
    }
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, AppTestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let target = RecordRef::app("hello", "giantswarm");
        let err = AppTestError::storage(
            Operation::Get,
            target.clone(),
            StorageError::not_found(RecordKind::App, "giantswarm/hello"),
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = AppTestError::storage(
            Operation::Create,
            target.clone(),
            StorageError::connection_error("reset"),
        );
        assert_eq!(err.kind(), ErrorKind::TransientRemote);

        let err = AppTestError::catalog(
            "hello",
            CatalogError::UnknownCatalog {
                name: "nope".into(),
            },
        );
        assert_eq!(err.kind(), ErrorKind::InputValidation);

        let err = AppTestError::Cancelled { target };
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(!err.is_deadline_exceeded());
    }

    #[test]
    fn test_display_carries_operation_and_record() {
        let err = AppTestError::storage(
            Operation::Update,
            RecordRef::app("hello", "giantswarm"),
            StorageError::not_found(RecordKind::App, "giantswarm/hello"),
        );
        assert_eq!(
            err.to_string(),
            "update App giantswarm/hello: App giantswarm/hello not found"
        );
    }

    #[test]
    fn test_terminal_failure_keeps_reason_verbatim() {
        let err = AppTestError::TerminalFailure {
            target: RecordRef::app("hello", "giantswarm"),
            status: "failed".into(),
            reason: "chart values are invalid: x".into(),
        };
        assert!(err.to_string().ends_with("reason: chart values are invalid: x"));
        assert_eq!(err.kind(), ErrorKind::TerminalRemoteFailure);
    }
}
