//! Order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{DeliveryAddress, ItemId, Order, OrderId, RestaurantId, UserId};
use domain::{ChangeStatus, LineItem, OrderLifecycle, PlaceOrder};
use notifications::NotificationPublisher;
use order_store::OrderRepository;
use serde::{Deserialize, Serialize};

use crate::auth::Caller;
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<R, P>
where
    R: OrderRepository,
    P: NotificationPublisher,
{
    pub lifecycle: OrderLifecycle<R, P>,
}

// -- Request types --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub restaurant_id: String,
    pub items: Vec<OrderItemRequest>,
    pub delivery_address: Option<DeliveryAddressRequest>,
    pub payment_method: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub id: String,
    pub name: String,
    #[serde(alias = "unitPrice")]
    pub price: f64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DeliveryAddressRequest {
    pub street: String,
    pub city: String,
    pub zip_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub status: String,
}

impl CreateOrderRequest {
    fn into_command(self, user_id: UserId) -> PlaceOrder {
        PlaceOrder {
            user_id,
            restaurant_id: RestaurantId::new(self.restaurant_id),
            items: self
                .items
                .into_iter()
                .map(|item| LineItem::new(ItemId::new(item.id), item.name, item.price, item.quantity))
                .collect(),
            delivery_address: self
                .delivery_address
                .map(|a| DeliveryAddress::new(a.street, a.city, a.zip_code)),
            payment_method: self.payment_method,
        }
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedResponse {
    pub message: &'static str,
    pub order_id: OrderId,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdatedResponse {
    pub message: &'static str,
    pub order: Order,
}

// -- Handlers --

/// POST /orders: place an order for the caller.
#[tracing::instrument(skip(state, payload))]
pub async fn create<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Caller(user_id): Caller,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderCreatedResponse>), ApiError>
where
    R: OrderRepository + 'static,
    P: NotificationPublisher + 'static,
{
    let Json(req) = payload?;
    let order_id = state
        .lifecycle
        .create_order(req.into_command(user_id))
        .await?;

    let response = OrderCreatedResponse {
        message: "Order created successfully",
        order_id,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /orders: the caller's orders, oldest first.
#[tracing::instrument(skip(state))]
pub async fn list<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Caller(user_id): Caller,
) -> Result<Json<Vec<Order>>, ApiError>
where
    R: OrderRepository + 'static,
    P: NotificationPublisher + 'static,
{
    let orders = state.lifecycle.list_orders(&user_id).await?;
    Ok(Json(orders))
}

/// GET /orders/{order_id}: one of the caller's orders.
#[tracing::instrument(skip(state))]
pub async fn get<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Caller(user_id): Caller,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError>
where
    R: OrderRepository + 'static,
    P: NotificationPublisher + 'static,
{
    let order = state
        .lifecycle
        .get_order(&user_id, &OrderId::new(order_id))
        .await?;
    Ok(Json(order))
}

/// PUT /orders/{order_id}/status: move an order to a new status.
#[tracing::instrument(skip(state, payload))]
pub async fn update_status<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(order_id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<StatusUpdatedResponse>, ApiError>
where
    R: OrderRepository + 'static,
    P: NotificationPublisher + 'static,
{
    let Json(req) = payload?;
    let order = state
        .lifecycle
        .update_status(ChangeStatus::new(order_id, req.status))
        .await?;

    Ok(Json(StatusUpdatedResponse {
        message: "Order status updated successfully",
        order,
    }))
}
