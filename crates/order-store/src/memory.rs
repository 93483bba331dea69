use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::Transition;
use tokio::sync::RwLock;

use crate::{
    Order, OrderId, OrderStatus, OrderStoreError, Result, TransitionPolicy, UserId,
    store::{OrderRepository, StatusChange},
};

#[derive(Default)]
struct MemoryState {
    orders: HashMap<OrderId, Order>,
    insertion_order: Vec<OrderId>,
    unavailable: Option<String>,
}

impl MemoryState {
    fn check_available(&self) -> Result<()> {
        match &self.unavailable {
            Some(reason) => Err(OrderStoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

/// In-memory order repository.
///
/// Provides the same contract as the PostgreSQL implementation. The write
/// lock makes each `update_status` a single atomic read-modify-write.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Makes every subsequent call fail with `Unavailable`, or restores
    /// normal operation with `None`.
    pub async fn set_unavailable(&self, reason: Option<&str>) {
        self.state.write().await.unavailable = reason.map(str::to_string);
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: Order) -> Result<OrderId> {
        let mut state = self.state.write().await;
        state.check_available()?;

        let order_id = order.order_id.clone();
        if state.orders.contains_key(&order_id) {
            return Err(OrderStoreError::DuplicateId(order_id));
        }

        state.insertion_order.push(order_id.clone());
        state.orders.insert(order_id.clone(), order);
        Ok(order_id)
    }

    async fn get_by_id(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state.orders.get(order_id).cloned())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state
            .insertion_order
            .iter()
            .filter_map(|id| state.orders.get(id))
            .filter(|order| &order.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
        policy: TransitionPolicy,
        now: DateTime<Utc>,
    ) -> Result<StatusChange> {
        let mut state = self.state.write().await;
        state.check_available()?;

        let order = state
            .orders
            .get_mut(order_id)
            .ok_or_else(|| OrderStoreError::NotFound(order_id.clone()))?;

        let previous = order.status;
        match policy.check(previous, status) {
            Ok(Transition::Unchanged) => Ok(StatusChange::Unchanged(order.clone())),
            Ok(Transition::Changed) => {
                order.set_status(status, now);
                Ok(StatusChange::Updated {
                    order: order.clone(),
                    previous,
                })
            }
            Err(source) => Err(OrderStoreError::Transition {
                order_id: order_id.clone(),
                source,
            }),
        }
    }
}
