//! Notification payloads.

use chrono::{DateTime, Utc};
use common::{OrderId, OrderStatus, UserId};
use serde::{Deserialize, Serialize};

/// Emitted once for every successful status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusChanged {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub previous_status: OrderStatus,
    pub new_status: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

impl OrderStatusChanged {
    /// Short human-readable summary, used as a message subject.
    pub fn subject(&self) -> String {
        format!("Order {} is now {}", self.order_id, self.new_status)
    }
}
