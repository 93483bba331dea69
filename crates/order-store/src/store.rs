use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Order, OrderId, OrderStatus, Result, TransitionPolicy, UserId};

/// Outcome of a successful `update_status` call.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange {
    /// The status changed and `updated_at` was refreshed.
    Updated {
        order: Order,
        previous: OrderStatus,
    },

    /// The order already had the requested status; nothing was written.
    Unchanged(Order),
}

/// Persistence contract for orders.
///
/// All implementations must be thread-safe (Send + Sync). Concurrent
/// updates of the same order are serialized by the backend, never by the
/// caller.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts a new order.
    ///
    /// Fails with `DuplicateId` if the ID is already taken.
    async fn create(&self, order: Order) -> Result<OrderId>;

    /// Retrieves an order by ID.
    ///
    /// Returns None if the order doesn't exist.
    async fn get_by_id(&self, order_id: &OrderId) -> Result<Option<Order>>;

    /// Lists a user's orders in insertion order.
    ///
    /// Returns an empty vector if the user has none.
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Order>>;

    /// Atomically moves an order to `status`.
    ///
    /// The `policy` check runs against the current stored status inside the
    /// same atomic step as the write. `now` becomes the new `updated_at`
    /// unless that would not advance it.
    async fn update_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
        policy: TransitionPolicy,
        now: DateTime<Utc>,
    ) -> Result<StatusChange>;
}

#[async_trait]
impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    async fn create(&self, order: Order) -> Result<OrderId> {
        (**self).create(order).await
    }

    async fn get_by_id(&self, order_id: &OrderId) -> Result<Option<Order>> {
        (**self).get_by_id(order_id).await
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        (**self).list_by_user(user_id).await
    }

    async fn update_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
        policy: TransitionPolicy,
        now: DateTime<Utc>,
    ) -> Result<StatusChange> {
        (**self).update_status(order_id, status, policy, now).await
    }
}
