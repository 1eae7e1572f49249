use async_graphql::ErrorExtensions;
use bookgraph_core::{SecurityError, StoreError};
use thiserror::Error;

/// Extension code shared by every client-facing failure.
pub const BAD_USER_INPUT: &str = "BAD_USER_INPUT";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    AuthorizationRequired(&'static str),

    #[error("{message}")]
    ValidationOrPersistenceFailure {
        message: String,
        invalid_args: String,
        #[source]
        source: StoreError,
    },

    #[error("{entity} not found: {name}")]
    NotFound { entity: &'static str, name: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_authenticated() -> Self {
        Self::AuthorizationRequired("not authenticated")
    }

    pub fn wrong_credentials() -> Self {
        Self::AuthorizationRequired("wrong credentials")
    }

    /// Builds a mapper from a store error to a persistence failure that names
    /// the offending argument.
    pub fn persistence(
        message: impl Into<String>,
        invalid_args: impl Into<String>,
    ) -> impl FnOnce(StoreError) -> Self {
        let message = message.into();
        let invalid_args = invalid_args.into();
        move |source| Self::ValidationOrPersistenceFailure {
            message,
            invalid_args,
            source,
        }
    }

    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::AuthorizationRequired(_) => "AUTHORIZATION_REQUIRED",
            ServiceError::ValidationOrPersistenceFailure { .. } => {
                "VALIDATION_OR_PERSISTENCE_FAILURE"
            }
            ServiceError::NotFound { .. } => "NOT_FOUND",
            ServiceError::Internal(_) => "INTERNAL",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Internal(_) => "INTERNAL_SERVER_ERROR",
            _ => BAD_USER_INPUT,
        }
    }
}

impl From<SecurityError> for ServiceError {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::InvalidCredentials => Self::wrong_credentials(),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl ErrorExtensions for ServiceError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.code());
            e.set("kind", self.kind());
            match self {
                ServiceError::ValidationOrPersistenceFailure {
                    invalid_args,
                    source,
                    ..
                } => {
                    e.set("invalidArgs", invalid_args.as_str());
                    e.set("error", source.to_string());
                }
                ServiceError::NotFound { name, .. } => {
                    e.set("invalidArgs", name.as_str());
                }
                _ => {}
            }
        })
    }
}
