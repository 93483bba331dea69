use common::{OrderId, TransitionError};
use thiserror::Error;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    /// No order with this ID exists.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// An order with this ID already exists.
    #[error("Order already exists: {0}")]
    DuplicateId(OrderId),

    /// The requested status change was rejected by the state machine.
    #[error("Order {order_id}: {source}")]
    Transition {
        order_id: OrderId,
        #[source]
        source: TransitionError,
    },

    /// The record kept changing underneath the conditional update.
    #[error("Order {0} was modified concurrently, retry the request")]
    Contended(OrderId),

    /// A stored record could not be decoded.
    #[error("Invalid stored record for order {order_id}: {reason}")]
    InvalidRecord { order_id: String, reason: String },

    /// The store rejected the call (used by test doubles).
    #[error("Order store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, OrderStoreError>;
