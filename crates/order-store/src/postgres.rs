use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{DeliveryAddress, Money, OrderItem, PaymentMethod, RestaurantId, Transition};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    Order, OrderId, OrderStatus, OrderStoreError, Result, TransitionPolicy, UserId,
    store::{OrderRepository, StatusChange},
};

/// Conditional updates retried when the row changes between statements.
const MAX_UPDATE_ATTEMPTS: usize = 3;

const ORDER_COLUMNS: &str = "order_id, user_id, restaurant_id, items, delivery_address, \
     payment_method, total_cents, status, created_at, updated_at";

const TRANSITION_SQL: &str = r#"
    WITH current AS (
        SELECT order_id, status FROM orders WHERE order_id = $1 FOR UPDATE
    )
    UPDATE orders o
    SET status = $2,
        updated_at = GREATEST($3, o.updated_at + INTERVAL '1 microsecond')
    FROM current
    WHERE o.order_id = current.order_id AND current.status = ANY($4)
    RETURNING o.order_id, o.user_id, o.restaurant_id, o.items, o.delivery_address,
              o.payment_method, o.total_cents, o.status, o.created_at, o.updated_at,
              current.status AS previous_status
"#;

/// PostgreSQL-backed order repository.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: &PgRow) -> Result<Order> {
        let order_id: String = row.try_get("order_id")?;
        let invalid = |reason: String| OrderStoreError::InvalidRecord {
            order_id: order_id.clone(),
            reason,
        };

        let status: String = row.try_get("status")?;
        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| invalid(e.to_string()))?;
        let payment_method: String = row.try_get("payment_method")?;
        let payment_method = payment_method
            .parse::<PaymentMethod>()
            .map_err(|e| invalid(e.to_string()))?;
        let items: Vec<OrderItem> = serde_json::from_value(row.try_get("items")?)?;
        let delivery_address: DeliveryAddress =
            serde_json::from_value(row.try_get("delivery_address")?)?;

        Ok(Order {
            order_id: OrderId::new(order_id.clone()),
            user_id: UserId::new(row.try_get::<String, _>("user_id")?),
            restaurant_id: RestaurantId::new(row.try_get::<String, _>("restaurant_id")?),
            items,
            delivery_address,
            payment_method,
            total_amount: Money::from_cents(row.try_get("total_cents")?),
            status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Runs the conditional update once. Returns None if no row matched.
    async fn try_transition(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
        sources: &[String],
        now: DateTime<Utc>,
    ) -> Result<Option<(Order, OrderStatus)>> {
        let row = sqlx::query(TRANSITION_SQL)
            .bind(order_id.as_str())
            .bind(status.as_str())
            .bind(now)
            .bind(sources)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let order = Self::row_to_order(&row)?;
                let previous: String = row.try_get("previous_status")?;
                let previous = previous.parse::<OrderStatus>().map_err(|e| {
                    OrderStoreError::InvalidRecord {
                        order_id: order_id.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(Some((order, previous)))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: Order) -> Result<OrderId> {
        let items = serde_json::to_value(&order.items)?;
        let address = serde_json::to_value(&order.delivery_address)?;

        sqlx::query(
            r#"
            INSERT INTO orders (order_id, user_id, restaurant_id, items, delivery_address,
                                payment_method, total_cents, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.order_id.as_str())
        .bind(order.user_id.as_str())
        .bind(order.restaurant_id.as_str())
        .bind(items)
        .bind(address)
        .bind(order.payment_method.as_str())
        .bind(order.total_amount.cents())
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_pkey")
            {
                return OrderStoreError::DuplicateId(order.order_id.clone());
            }
            OrderStoreError::Database(e)
        })?;

        Ok(order.order_id)
    }

    async fn get_by_id(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1"
        ))
        .bind(order_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_order).transpose()
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY seq ASC"
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_order).collect()
    }

    async fn update_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
        policy: TransitionPolicy,
        now: DateTime<Utc>,
    ) -> Result<StatusChange> {
        let sources: Vec<String> = policy
            .sources(status)
            .into_iter()
            .map(|s| s.as_str().to_string())
            .collect();

        for _ in 0..MAX_UPDATE_ATTEMPTS {
            if let Some((order, previous)) =
                self.try_transition(order_id, status, &sources, now).await?
            {
                return Ok(StatusChange::Updated { order, previous });
            }

            // No row matched: find out why from the current record
            let current = self
                .get_by_id(order_id)
                .await?
                .ok_or_else(|| OrderStoreError::NotFound(order_id.clone()))?;

            match policy.check(current.status, status) {
                Ok(Transition::Unchanged) => return Ok(StatusChange::Unchanged(current)),
                Err(source) => {
                    return Err(OrderStoreError::Transition {
                        order_id: order_id.clone(),
                        source,
                    });
                }
                Ok(Transition::Changed) => {
                    tracing::debug!(%order_id, "order changed during conditional update, retrying");
                }
            }
        }

        Err(OrderStoreError::Contended(order_id.clone()))
    }
}
