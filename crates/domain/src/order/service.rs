//! Order lifecycle service.

use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use common::{Order, OrderId, TransitionPolicy, UserId};
use notifications::{NotificationPublisher, OrderStatusChanged};
use order_store::{OrderRepository, StatusChange};

use crate::error::DomainError;

use super::{ChangeStatus, OrderError, PlaceOrder};

/// Tunables for [`OrderLifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Which status edges are accepted.
    pub policy: TransitionPolicy,

    /// Upper bound on waiting for the publisher after a status change.
    pub publish_timeout: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            policy: TransitionPolicy::TerminalOnly,
            publish_timeout: Duration::from_secs(2),
        }
    }
}

/// Service for managing orders.
///
/// Holds no mutable state of its own: every operation goes straight to the
/// repository, and status changes are announced through the publisher
/// after they are stored.
pub struct OrderLifecycle<R, P>
where
    R: OrderRepository,
    P: NotificationPublisher,
{
    repository: R,
    publisher: P,
    config: LifecycleConfig,
}

impl<R, P> OrderLifecycle<R, P>
where
    R: OrderRepository,
    P: NotificationPublisher,
{
    /// Creates a new lifecycle service with default configuration.
    pub fn new(repository: R, publisher: P) -> Self {
        Self::with_config(repository, publisher, LifecycleConfig::default())
    }

    /// Creates a new lifecycle service.
    pub fn with_config(repository: R, publisher: P, config: LifecycleConfig) -> Self {
        Self {
            repository,
            publisher,
            config,
        }
    }

    /// Validates and stores a new order in `Pending` status.
    ///
    /// Nothing is written if validation fails. No notification is sent.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id))]
    pub async fn create_order(&self, cmd: PlaceOrder) -> Result<OrderId, DomainError> {
        let valid = cmd.validate()?;
        let order = valid.into_order(OrderId::generate(), now());

        let order_id = self.repository.create(order).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(%order_id, "order created");
        Ok(order_id)
    }

    /// Lists the caller's orders. Empty if there are none.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, user_id: &UserId) -> Result<Vec<Order>, DomainError> {
        Ok(self.repository.list_by_user(user_id).await?)
    }

    /// Loads one of the caller's orders.
    ///
    /// An order owned by someone else is reported as not found.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(
        &self,
        user_id: &UserId,
        order_id: &OrderId,
    ) -> Result<Order, DomainError> {
        match self.repository.get_by_id(order_id).await? {
            Some(order) if &order.user_id == user_id => Ok(order),
            Some(_) => {
                tracing::debug!(%order_id, "order belongs to another user");
                Err(OrderError::NotFound(order_id.clone()).into())
            }
            None => Err(OrderError::NotFound(order_id.clone()).into()),
        }
    }

    /// Moves an order to the requested status and announces the change.
    ///
    /// Repeating the current status of a non-terminal order returns it
    /// unchanged and announces nothing.
    ///
    /// The announcement is awaited, so a slow publisher adds at most
    /// `publish_timeout` to the call. Its outcome never changes the result.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id, status = %cmd.status))]
    pub async fn update_status(&self, cmd: ChangeStatus) -> Result<Order, DomainError> {
        let target = cmd.target()?;

        let change = self
            .repository
            .update_status(&cmd.order_id, target, self.config.policy, now())
            .await?;

        match change {
            StatusChange::Updated { order, previous } => {
                metrics::counter!("order_status_transitions_total", "status" => target.as_str())
                    .increment(1);
                tracing::info!(from = %previous, to = %target, "order status changed");

                let event = OrderStatusChanged {
                    order_id: order.order_id.clone(),
                    user_id: order.user_id.clone(),
                    previous_status: previous,
                    new_status: order.status,
                    occurred_at: order.updated_at,
                };
                self.notify(&event).await;
                Ok(order)
            }
            StatusChange::Unchanged(order) => {
                tracing::debug!("order already has requested status");
                Ok(order)
            }
        }
    }

    /// Publishes without letting a failure reach the caller.
    async fn notify(&self, event: &OrderStatusChanged) {
        let publish = self.publisher.publish(event);
        match tokio::time::timeout(self.config.publish_timeout, publish).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                metrics::counter!("order_notifications_failed_total").increment(1);
                tracing::warn!(order_id = %event.order_id, %error, "status notification failed");
            }
            Err(_) => {
                metrics::counter!("order_notifications_failed_total").increment(1);
                tracing::warn!(
                    order_id = %event.order_id,
                    timeout_ms = self.config.publish_timeout.as_millis() as u64,
                    "status notification timed out"
                );
            }
        }
    }
}

/// Current time at the store's microsecond resolution.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
