//! Errors raised while locating catalogs and resolving chart versions.

/// Errors that can occur while resolving a catalog or a chart version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The descriptor does not name a catalog.
    #[error("catalog name must not be empty for app {app}")]
    MissingCatalogName {
        /// Name of the application.
        app: String,
    },

    /// The catalog is neither registered nor given an explicit URL.
    #[error("catalog {name} not found and no URL provided")]
    UnknownCatalog {
        /// Name of the catalog.
        name: String,
    },

    /// A catalog URL could not be parsed.
    #[error("Invalid catalog URL {url}: {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser message.
        message: String,
    },

    /// A network error occurred while fetching the catalog index.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The catalog index request returned a non-success status code.
    #[error("HTTP error: status {status} fetching {url}")]
    HttpError {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The catalog index could not be parsed.
    #[error("Failed to parse catalog index: {0}")]
    ParseError(String),

    /// The catalog index has no entry for the application.
    #[error("app {app} not found in catalog {catalog_url}")]
    AppNotFound {
        /// Name of the application.
        app: String,
        /// Catalog that was searched.
        catalog_url: String,
    },

    /// No published version matches the constraint.
    #[error("no version of {app} matching {constraint:?} in catalog {catalog_url}")]
    NoMatchingVersion {
        /// Name of the application.
        app: String,
        /// Substring the version had to contain.
        constraint: String,
        /// Catalog that was searched.
        catalog_url: String,
    },
}

impl CatalogError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError(_) => true,
            Self::HttpError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Whether the error stems from caller input rather than the remote side.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCatalogName { .. } | Self::UnknownCatalog { .. } | Self::InvalidUrl { .. }
        )
    }
}
