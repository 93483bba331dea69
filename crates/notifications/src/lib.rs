//! Notification publishers for order status changes.
//!
//! A publisher is fire-and-forget from the caller's point of view: errors
//! are reported so they can be logged, but nothing is rolled back because
//! of them.

pub mod broadcast;
pub mod error;
pub mod event;
pub mod memory;
pub mod publisher;
pub mod webhook;

pub use broadcast::BroadcastPublisher;
pub use error::{PublishError, Result};
pub use event::OrderStatusChanged;
pub use memory::InMemoryPublisher;
pub use publisher::NotificationPublisher;
pub use webhook::WebhookPublisher;
