//! The order record and its value objects.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ItemId, Money, OrderId, OrderStatus, RestaurantId, UserId};

/// How the customer pays on delivery or at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    Cash,
}

/// A payment tag that is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl PaymentMethod {
    /// Returns the wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "CARD",
            PaymentMethod::Cash => "CASH",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CARD" => Ok(PaymentMethod::Card),
            "CASH" => Ok(PaymentMethod::Cash),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Where the order is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    pub street: String,
    pub city: String,
    pub zip_code: String,
}

impl DeliveryAddress {
    /// Creates a new delivery address.
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            zip_code: zip_code.into(),
        }
    }

    /// Returns the wire name of the first blank field, if any.
    pub fn first_blank_field(&self) -> Option<&'static str> {
        [
            ("street", &self.street),
            ("city", &self.city),
            ("zipCode", &self.zip_code),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// A line item in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Menu item identifier.
    pub id: ItemId,

    /// Human-readable item name.
    pub name: String,

    /// Price per unit.
    #[serde(rename = "price", alias = "unitPrice")]
    pub unit_price: Money,

    /// Quantity ordered, at least 1.
    pub quantity: u32,
}

impl OrderItem {
    /// Creates a new order item.
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Returns the total price for this item (quantity * unit_price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A placed order.
///
/// Everything except `status` and `updated_at` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    pub items: Vec<OrderItem>,
    pub delivery_address: DeliveryAddress,
    pub payment_method: PaymentMethod,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the timestamp to record for a mutation at `now`.
    ///
    /// Always later than the current `updated_at`, even if the clock did
    /// not advance.
    pub fn next_updated_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let floor = self.updated_at + Duration::microseconds(1);
        if now > floor { now } else { floor }
    }

    /// Moves the order to `status`, refreshing `updated_at`.
    ///
    /// No legality check happens here; callers consult a
    /// [`TransitionPolicy`](crate::TransitionPolicy) first.
    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.updated_at = self.next_updated_at(now);
        self.status = status;
    }

    /// Sum of all line totals.
    pub fn items_total(items: &[OrderItem]) -> Money {
        items.iter().map(OrderItem::total_price).sum()
    }
}
