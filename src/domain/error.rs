use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not implemented: {operation} is not supported by the {strategy} resolver")]
    NotImplemented { operation: String, strategy: String },

    #[error("Missing collaborator: {collaborator} is not configured")]
    MissingCollaborator { collaborator: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Attribute error: {message}")]
    Attribute { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DomainError {
    pub fn not_implemented(operation: impl Into<String>, strategy: impl Into<String>) -> Self {
        Self::NotImplemented {
            operation: operation.into(),
            strategy: strategy.into(),
        }
    }

    pub fn missing_collaborator(collaborator: impl Into<String>) -> Self {
        Self::MissingCollaborator {
            collaborator: collaborator.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn attribute(message: impl Into<String>) -> Self {
        Self::Attribute {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the error comes from a failing cache, store or accessor call
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Self::Cache { .. } | Self::Storage { .. } | Self::Attribute { .. }
        )
    }
}
