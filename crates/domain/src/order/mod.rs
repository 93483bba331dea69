//! Order commands, errors and the lifecycle service.

mod commands;
mod service;

pub use commands::{ChangeStatus, LineItem, PlaceOrder, ValidOrder};
pub use service::{LifecycleConfig, OrderLifecycle};

use common::{ItemId, OrderId, TransitionError};
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Restaurant ID is required.
    #[error("restaurantId is required")]
    RestaurantIdRequired,

    /// Order has no items.
    #[error("Order must contain at least one item")]
    NoItems,

    /// An item is missing its id or name.
    #[error("Item at position {index} is missing {field}")]
    ItemFieldRequired { index: usize, field: &'static str },

    /// Invalid quantity.
    #[error("Invalid quantity for item {item_id}: {quantity} (must be at least 1)")]
    InvalidQuantity { item_id: ItemId, quantity: i64 },

    /// Invalid price.
    #[error("Invalid price for item {item_id}: {price} (must be a non-negative amount)")]
    InvalidPrice { item_id: ItemId, price: f64 },

    /// Delivery address is missing.
    #[error("deliveryAddress is required")]
    AddressRequired,

    /// A delivery address field is blank.
    #[error("deliveryAddress.{0} is required")]
    AddressFieldRequired(&'static str),

    /// Payment method tag is not recognized.
    #[error("Unrecognized paymentMethod: {0}")]
    UnknownPaymentMethod(String),

    /// Status tag is not recognized.
    #[error("Unrecognized status: {0}")]
    UnknownStatus(String),

    /// No such order, or it belongs to someone else.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The state machine rejected the requested status.
    #[error("Order {order_id}: {source}")]
    Transition {
        order_id: OrderId,
        #[source]
        source: TransitionError,
    },
}

impl OrderError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::NotFound(_) => ErrorKind::NotFound,
            OrderError::Transition { .. } => ErrorKind::Conflict,
            OrderError::RestaurantIdRequired
            | OrderError::NoItems
            | OrderError::ItemFieldRequired { .. }
            | OrderError::InvalidQuantity { .. }
            | OrderError::InvalidPrice { .. }
            | OrderError::AddressRequired
            | OrderError::AddressFieldRequired(_)
            | OrderError::UnknownPaymentMethod(_)
            | OrderError::UnknownStatus(_) => ErrorKind::BadRequest,
        }
    }
}
