//! Domain layer for the order lifecycle service.
//!
//! This crate provides:
//! - Validated commands for placing orders and changing their status
//! - Domain errors and their classification
//! - `OrderLifecycle`, which orchestrates the repository and the
//!   notification publisher

pub mod error;
pub mod order;

pub use error::{DomainError, ErrorKind};
pub use order::{
    ChangeStatus, LifecycleConfig, LineItem, OrderError, OrderLifecycle, PlaceOrder, ValidOrder,
};
