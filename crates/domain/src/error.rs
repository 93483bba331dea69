//! Domain error types.

use order_store::OrderStoreError;
use thiserror::Error;

use crate::order::OrderError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The request was rejected by order rules.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// An error occurred in the order store.
    #[error("Order store error: {0}")]
    Store(OrderStoreError),
}

/// Coarse classification used by transports to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Conflict,
    Internal,
}

impl DomainError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Order(err) => err.kind(),
            DomainError::Store(OrderStoreError::DuplicateId(_) | OrderStoreError::Contended(_)) => {
                ErrorKind::Conflict
            }
            DomainError::Store(_) => ErrorKind::Internal,
        }
    }
}

impl From<OrderStoreError> for DomainError {
    fn from(err: OrderStoreError) -> Self {
        match err {
            OrderStoreError::NotFound(order_id) => DomainError::Order(OrderError::NotFound(order_id)),
            OrderStoreError::Transition { order_id, source } => {
                DomainError::Order(OrderError::Transition { order_id, source })
            }
            other => DomainError::Store(other),
        }
    }
}
