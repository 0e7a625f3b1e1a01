use thiserror::Error;

use crate::dynamodb::SchemaViolation;

/// Errors raised by the DynamoDB helpers.
///
/// Every variant except [`DynamoError::Transport`] is raised locally,
/// before any network call is made, and is recoverable by fixing the
/// caller's input. `Transport` is the only kind that implies a store
/// call was attempted; it always wraps the underlying SDK error. No
/// variant is retried by this crate.
#[derive(Debug, Error)]
pub enum DynamoError {
    /// A required partition or sort attribute is absent from the caller's
    /// key or attribute mapping.
    #[error("key attribute `{attribute}` is required for {operation}")]
    MissingKey { attribute: String, operation: String },

    /// The named secondary index is not declared on the table descriptor.
    #[error("secondary index `{0}` not found")]
    IndexNotFound(String),

    /// A prefix query was attempted against an index without a sort key.
    #[error("prefix queries require an index with a sort key")]
    PrefixRequiresSortKey,

    /// An item, key, or update attribute set failed schema validation.
    #[error("{subject} does not match schema")]
    SchemaMismatch {
        subject: &'static str,
        #[source]
        source: SchemaViolation,
    },

    /// An update was requested with nothing to set or remove.
    #[error("no attributes to update")]
    NoAttributes,

    /// A prefixed key does not start with the expected prefix.
    #[error("key `{key}` does not start with prefix `{prefix}`")]
    PrefixMismatch { prefix: String, key: String },

    /// The underlying store call failed.
    #[error("failed to perform {operation} command")]
    Transport {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DynamoError {
    pub(crate) fn missing_key(attribute: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::MissingKey {
            attribute: attribute.into(),
            operation: operation.into(),
        }
    }

    pub(crate) fn schema_mismatch(subject: &'static str, source: SchemaViolation) -> Self {
        Self::SchemaMismatch { subject, source }
    }

    pub(crate) fn transport(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            operation,
            source: source.into(),
        }
    }
}
