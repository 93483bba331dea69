//! Shared types for the order lifecycle service.
//!
//! - Identifiers for orders, users, restaurants and menu items
//! - Money in integer cents with a decimal wire format
//! - The `Order` record and its value objects
//! - The order status state machine and transition policies

pub mod money;
pub mod order;
pub mod status;
pub mod types;

pub use money::{InvalidAmount, Money};
pub use order::{DeliveryAddress, Order, OrderItem, PaymentMethod, UnknownPaymentMethod};
pub use status::{OrderStatus, Transition, TransitionError, TransitionPolicy, UnknownStatus};
pub use types::{ItemId, OrderId, RestaurantId, UserId};
