//! Error types for cattrans-core.
//!
//! Two families live here. `CoreError` is the ordinary `Result` error for
//! fallible library calls. `BatchError`, `ItemError` and `StoreError` form the
//! reassignment taxonomy: they never escape `on_transition_completed`, their
//! `Display` text is what the operator sees.

use crate::item::ItemId;
use crate::message::Severity;
use thiserror::Error;

/// Result type alias for cattrans-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in cattrans-core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The field-definition resource exists but could not be read or parsed.
    #[error("field resource error: {0}")]
    FieldResource(String),
}

/// Batch-level failures. Each one aborts the batch before any item is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// The event carried no resolvable transition descriptor.
    #[error("Invalid transition object type")]
    InvalidTransition,

    /// The transition options are not a key/value mapping.
    #[error("Transition options are not a valid options mapping")]
    InvalidOptions,

    /// `category_id` is missing, non-numeric or not positive.
    #[error("Invalid category ID specified: {0}")]
    InvalidCategory(String),

    /// The event lists no item identifiers.
    #[error("No valid primary keys found")]
    EmptyBatch,
}

/// Item-level failures. Each one is isolated to its own iteration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    /// The store has no item with this id.
    #[error("Article not found: {0}")]
    NotFound(ItemId),

    /// The store refused to save the item.
    #[error("Failed to update article ID {id}: {reason}")]
    Store { id: ItemId, reason: String },

    /// Anything else that went wrong while handling the item.
    #[error("Error processing article {id}: {reason}")]
    Unexpected { id: ItemId, reason: String },
}

impl ItemError {
    /// Severity of the operator message reporting this error.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::NotFound(_) => Severity::Warning,
            Self::Store { .. } | Self::Unexpected { .. } => Severity::Error,
        }
    }
}

/// Errors reported by an `ItemStore`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No item with this id exists.
    #[error("item not found: {0}")]
    NotFound(ItemId),

    /// The store declined the operation; the text is the store's own reason.
    #[error("{0}")]
    Rejected(String),

    /// The backing storage failed.
    #[error("storage failure: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_error_messages() {
        assert_eq!(
            BatchError::InvalidCategory("0".to_string()).to_string(),
            "Invalid category ID specified: 0"
        );
        assert_eq!(BatchError::EmptyBatch.to_string(), "No valid primary keys found");
    }

    #[test]
    fn test_item_error_severity() {
        assert_eq!(ItemError::NotFound(999).severity(), Severity::Warning);
        assert_eq!(ItemError::NotFound(999).to_string(), "Article not found: 999");

        let err = ItemError::Store {
            id: 10,
            reason: "locked".to_string(),
        };
        assert_eq!(err.severity(), Severity::Error);
        assert_eq!(err.to_string(), "Failed to update article ID 10: locked");
    }
}
