//! Domain errors for the PERF operator.

use thiserror::Error;

/// Domain-level errors that can occur while reconciling PERF resources.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("PerfServer {namespace}/{name} not found")]
    PerfServerNotFound { namespace: String, name: String },

    #[error("Secret {namespace}/{name} not found")]
    SecretNotFound { namespace: String, name: String },

    #[error("Secret {secret} has no '{key}' key")]
    MissingSecretKey { secret: String, key: String },

    #[error("PERF project {0} wasn't found")]
    ProjectNotFound(String),

    #[error("PerfDataSource {0} has no PerfServer owner reference")]
    OwnerReferenceMissing(String),

    #[error("PERF {0} is unavailable")]
    PerfUnavailable(String),

    #[error("couldn't {action} {entity}. Status - {status}")]
    RemoteStatus {
        action: String,
        entity: String,
        status: u16,
    },

    #[error("couldn't {action} {entity}: {message}")]
    Transport {
        action: String,
        entity: String,
        message: String,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Whether the error means a resource the reconciliation depends on is absent.
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PerfServerNotFound { .. } | Self::SecretNotFound { .. } | Self::ProjectNotFound(_)
        )
    }

    /// Wrap the error with the action/entity that was being attempted.
    pub fn transport(action: &str, entity: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            action: action.to_string(),
            entity: entity.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for DomainError {
    fn from(err: serde_yaml::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_status_message_carries_status_and_entity() {
        let err = DomainError::RemoteStatus {
            action: "create".to_string(),
            entity: "sonar datasource under P project".to_string(),
            status: 500,
        };
        assert_eq!(
            err.to_string(),
            "couldn't create sonar datasource under P project. Status - 500"
        );
    }

    #[test]
    fn test_not_found_classification() {
        assert!(DomainError::ProjectNotFound("P".to_string()).is_not_found());
        assert!(DomainError::PerfServerNotFound {
            namespace: "ns".to_string(),
            name: "perf".to_string(),
        }
        .is_not_found());
        assert!(!DomainError::PerfUnavailable("perf".to_string()).is_not_found());
    }
}
