//! Order commands.

use chrono::{DateTime, Utc};
use common::{
    DeliveryAddress, ItemId, Money, Order, OrderId, OrderItem, OrderStatus, PaymentMethod,
    RestaurantId, UserId,
};

use super::OrderError;

/// A requested line item, as received and not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub id: ItemId,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, unit_price: f64, quantity: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity,
        }
    }
}

/// Command to place a new order on behalf of an authenticated user.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceOrder {
    /// The caller placing the order.
    pub user_id: UserId,

    /// Target restaurant.
    pub restaurant_id: RestaurantId,

    /// Requested items, in order.
    pub items: Vec<LineItem>,

    /// Where to deliver.
    pub delivery_address: Option<DeliveryAddress>,

    /// Payment method tag, e.g. `CARD`.
    pub payment_method: String,
}

/// A `PlaceOrder` that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidOrder {
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    pub items: Vec<OrderItem>,
    pub delivery_address: DeliveryAddress,
    pub payment_method: PaymentMethod,
}

impl PlaceOrder {
    /// Checks every field, reporting the first problem found.
    pub fn validate(self) -> Result<ValidOrder, OrderError> {
        if self.restaurant_id.is_blank() {
            return Err(OrderError::RestaurantIdRequired);
        }

        if self.items.is_empty() {
            return Err(OrderError::NoItems);
        }

        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(index, item)| validate_item(index, item))
            .collect::<Result<Vec<_>, _>>()?;

        let delivery_address = self.delivery_address.ok_or(OrderError::AddressRequired)?;
        if let Some(field) = delivery_address.first_blank_field() {
            return Err(OrderError::AddressFieldRequired(field));
        }

        let payment_method = self
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(|e| OrderError::UnknownPaymentMethod(e.0))?;

        Ok(ValidOrder {
            user_id: self.user_id,
            restaurant_id: self.restaurant_id,
            items,
            delivery_address,
            payment_method,
        })
    }
}

fn validate_item(index: usize, item: LineItem) -> Result<OrderItem, OrderError> {
    if item.id.is_blank() {
        return Err(OrderError::ItemFieldRequired { index, field: "id" });
    }
    if item.name.trim().is_empty() {
        return Err(OrderError::ItemFieldRequired {
            index,
            field: "name",
        });
    }

    let quantity = u32::try_from(item.quantity)
        .ok()
        .filter(|q| *q >= 1)
        .ok_or_else(|| OrderError::InvalidQuantity {
            item_id: item.id.clone(),
            quantity: item.quantity,
        })?;

    // Sign is checked before rounding to cents
    let unit_price = Some(item.unit_price)
        .filter(|price| *price >= 0.0)
        .and_then(|price| Money::from_decimal(price).ok())
        .ok_or_else(|| OrderError::InvalidPrice {
            item_id: item.id.clone(),
            price: item.unit_price,
        })?;

    Ok(OrderItem {
        id: item.id,
        name: item.name,
        unit_price,
        quantity,
    })
}

impl ValidOrder {
    /// Builds the stored record: status `Pending`, both timestamps `now`.
    pub fn into_order(self, order_id: OrderId, now: DateTime<Utc>) -> Order {
        Order {
            order_id,
            user_id: self.user_id,
            restaurant_id: self.restaurant_id,
            total_amount: Order::items_total(&self.items),
            items: self.items,
            delivery_address: self.delivery_address,
            payment_method: self.payment_method,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Command to move an order to a new status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeStatus {
    /// The order to update.
    pub order_id: OrderId,

    /// Requested status tag, e.g. `DELIVERED`.
    pub status: String,
}

impl ChangeStatus {
    /// Creates a new ChangeStatus command.
    pub fn new(order_id: impl Into<OrderId>, status: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            status: status.into(),
        }
    }

    /// Parses the requested status.
    pub fn target(&self) -> Result<OrderStatus, OrderError> {
        self.status
            .parse::<OrderStatus>()
            .map_err(|e| OrderError::UnknownStatus(e.0))
    }
}
