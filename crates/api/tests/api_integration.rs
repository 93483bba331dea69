//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{SubsecRound, Utc};
use common::{
    DeliveryAddress, Money, Order, OrderId, OrderItem, OrderStatus, PaymentMethod, RestaurantId,
    UserId,
};
use domain::LifecycleConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use notifications::InMemoryPublisher;
use order_store::{InMemoryOrderRepository, OrderRepository};
use serde_json::{Value, json};
use tower::ServiceExt;

use api::auth::AUTHENTICATED_USER_HEADER;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestApp {
    app: Router,
    repository: InMemoryOrderRepository,
    publisher: InMemoryPublisher,
}

fn setup() -> TestApp {
    let repository = InMemoryOrderRepository::new();
    let publisher = InMemoryPublisher::new();
    let state = api::create_state(
        repository.clone(),
        publisher.clone(),
        LifecycleConfig::default(),
    );
    let app = api::create_app(state, get_metrics_handle());
    TestApp {
        app,
        repository,
        publisher,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    /// Stores an order directly, bypassing the create endpoint.
    async fn seed(&self, order_id: &str, user_id: &str) {
        let now = Utc::now().trunc_subsecs(6);
        let items = vec![OrderItem::new("item1", "Burger", Money::from_cents(1099), 2)];
        let order = Order {
            order_id: OrderId::from(order_id),
            user_id: UserId::from(user_id),
            restaurant_id: RestaurantId::from("rest123"),
            total_amount: Order::items_total(&items),
            items,
            delivery_address: DeliveryAddress::new("123 Main St", "Test City", "12345"),
            payment_method: PaymentMethod::Card,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.repository.create(order).await.unwrap();
    }
}

fn valid_order_body() -> Value {
    json!({
        "restaurantId": "rest123",
        "items": [{ "id": "item1", "name": "Burger", "price": 10.99, "quantity": 2 }],
        "deliveryAddress": { "street": "123 Main St", "city": "Test City", "zipCode": "12345" },
        "paymentMethod": "CARD"
    })
}

fn json_request(method: &str, uri: &str, user: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header(AUTHENTICATED_USER_HEADER, user);
    }
    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(user) = user {
        builder = builder.header(AUTHENTICATED_USER_HEADER, user);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let test = setup();
    let (status, json) = test.send(get_request("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let test = setup();
    let (status, _) = test
        .send(json_request("POST", "/orders", Some("alice"), &valid_order_body()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let response = test
        .app
        .clone()
        .oneshot(get_request("/metrics", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("orders_created_total"));
}

#[tokio::test]
async fn test_create_order() {
    let test = setup();
    let (status, json) = test
        .send(json_request(
            "POST",
            "/orders",
            Some("test@example.com"),
            &valid_order_body(),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "Order created successfully");
    let order_id = json["orderId"].as_str().unwrap();
    assert!(!order_id.is_empty());
    assert_eq!(test.repository.order_count().await, 1);
    assert_eq!(test.publisher.published_count(), 0);
}

#[tokio::test]
async fn test_create_and_get_order() {
    let test = setup();
    let (_, created) = test
        .send(json_request("POST", "/orders", Some("alice"), &valid_order_body()))
        .await;
    let order_id = created["orderId"].as_str().unwrap();

    let (status, order) = test
        .send(get_request(&format!("/orders/{order_id}"), Some("alice")))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["orderId"], order_id);
    assert_eq!(order["userId"], "alice");
    assert_eq!(order["restaurantId"], "rest123");
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["paymentMethod"], "CARD");
    assert_eq!(order["totalAmount"], 21.98);
    assert_eq!(order["items"][0]["price"], 10.99);
    assert_eq!(order["deliveryAddress"]["zipCode"], "12345");
    assert_eq!(order["createdAt"], order["updatedAt"]);
}

#[tokio::test]
async fn test_order_ids_are_unique() {
    let test = setup();
    let mut ids = std::collections::HashSet::new();
    for _ in 0..10 {
        let (_, json) = test
            .send(json_request("POST", "/orders", Some("alice"), &valid_order_body()))
            .await;
        assert!(ids.insert(json["orderId"].as_str().unwrap().to_string()));
    }
}

#[tokio::test]
async fn test_create_requires_identity() {
    let test = setup();
    let (status, json) = test
        .send(json_request("POST", "/orders", None, &valid_order_body()))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json["message"].is_string());
    assert_eq!(test.repository.order_count().await, 0);
}

#[tokio::test]
async fn test_create_with_empty_items_is_rejected() {
    let test = setup();
    let mut body = valid_order_body();
    body["items"] = json!([]);

    let (status, json) = test
        .send(json_request("POST", "/orders", Some("alice"), &body))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Order must contain at least one item");
    assert_eq!(test.repository.order_count().await, 0);
}

#[tokio::test]
async fn test_create_validation_failures() {
    let test = setup();

    let mut zero_quantity = valid_order_body();
    zero_quantity["items"][0]["quantity"] = json!(0);

    let mut negative_fraction = valid_order_body();
    negative_fraction["items"][0]["price"] = json!(-0.004);

    let mut missing_zip = valid_order_body();
    missing_zip["deliveryAddress"]["zipCode"] = json!("");

    let mut no_address = valid_order_body();
    no_address.as_object_mut().unwrap().remove("deliveryAddress");

    let mut bad_payment = valid_order_body();
    bad_payment["paymentMethod"] = json!("BITCOIN");

    let mut unknown_field = valid_order_body();
    unknown_field["couponCode"] = json!("FREE");

    let mut missing_field = valid_order_body();
    missing_field.as_object_mut().unwrap().remove("restaurantId");

    for body in [
        zero_quantity,
        negative_fraction,
        missing_zip,
        no_address,
        bad_payment,
        unknown_field,
        missing_field,
    ] {
        let (status, json) = test
            .send(json_request("POST", "/orders", Some("alice"), &body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert!(json["message"].is_string());
    }

    assert_eq!(test.repository.order_count().await, 0);
}

#[tokio::test]
async fn test_create_with_sub_cent_negative_price() {
    let test = setup();
    let mut body = valid_order_body();
    body["items"][0]["price"] = json!(-0.004);

    let (status, json) = test
        .send(json_request("POST", "/orders", Some("alice"), &body))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("Invalid price"));
    assert_eq!(test.repository.order_count().await, 0);
}

#[tokio::test]
async fn test_create_with_malformed_json() {
    let test = setup();
    let request = Request::builder()
        .method("POST")
        .uri("/orders")
        .header("content-type", "application/json")
        .header(AUTHENTICATED_USER_HEADER, "alice")
        .body(Body::from("{ not json"))
        .unwrap();

    let (status, json) = test.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_create_without_content_type() {
    let test = setup();
    let request = Request::builder()
        .method("POST")
        .uri("/orders")
        .header(AUTHENTICATED_USER_HEADER, "alice")
        .body(Body::from(valid_order_body().to_string()))
        .unwrap();

    let (status, _) = test.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_status_delivered() {
    let test = setup();
    test.seed("ord123", "test@example.com").await;

    let (status, json) = test
        .send(json_request(
            "PUT",
            "/orders/ord123/status",
            None,
            &json!({ "status": "DELIVERED" }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Order status updated successfully");
    assert_eq!(json["order"]["orderId"], "ord123");
    assert_eq!(json["order"]["status"], "DELIVERED");

    let published = test.publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].order_id, OrderId::from("ord123"));
    assert_eq!(published[0].new_status, OrderStatus::Delivered);
    assert_eq!(published[0].user_id, UserId::from("test@example.com"));
}

#[tokio::test]
async fn test_update_status_advances_updated_at() {
    let test = setup();
    test.seed("ord123", "alice").await;
    let before = test
        .repository
        .get_by_id(&OrderId::from("ord123"))
        .await
        .unwrap()
        .unwrap();

    let (_, json) = test
        .send(json_request(
            "PUT",
            "/orders/ord123/status",
            None,
            &json!({ "status": "CONFIRMED" }),
        ))
        .await;

    let updated_at: chrono::DateTime<Utc> =
        serde_json::from_value(json["order"]["updatedAt"].clone()).unwrap();
    assert!(updated_at > before.updated_at);
}

#[tokio::test]
async fn test_update_terminal_order_conflicts() {
    let test = setup();
    test.seed("ord123", "alice").await;
    let status_request = |status: &str| {
        json_request(
            "PUT",
            "/orders/ord123/status",
            None,
            &json!({ "status": status }),
        )
    };

    let (status, _) = test.send(status_request("CANCELLED")).await;
    assert_eq!(status, StatusCode::OK);
    let stored = test
        .repository
        .get_by_id(&OrderId::from("ord123"))
        .await
        .unwrap();

    let (status, json) = test.send(status_request("PREPARING")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["message"].is_string());

    let (status, _) = test.send(status_request("CANCELLED")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let after = test
        .repository
        .get_by_id(&OrderId::from("ord123"))
        .await
        .unwrap();
    assert_eq!(after, stored);
    assert_eq!(test.publisher.published_count(), 1);
}

#[tokio::test]
async fn test_update_nonexistent_order() {
    let test = setup();
    let (status, json) = test
        .send(json_request(
            "PUT",
            "/orders/nope/status",
            None,
            &json!({ "status": "CONFIRMED" }),
        ))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_update_with_unknown_status() {
    let test = setup();
    test.seed("ord123", "alice").await;

    let (status, json) = test
        .send(json_request(
            "PUT",
            "/orders/ord123/status",
            None,
            &json!({ "status": "LOST_IN_SPACE" }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());
    assert_eq!(test.publisher.published_count(), 0);
}

#[tokio::test]
async fn test_update_survives_publisher_failure() {
    let test = setup();
    test.seed("ord123", "alice").await;
    test.publisher.set_fail_on_publish(true);

    let (status, json) = test
        .send(json_request(
            "PUT",
            "/orders/ord123/status",
            None,
            &json!({ "status": "PREPARING" }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["order"]["status"], "PREPARING");
}

#[tokio::test]
async fn test_list_orders_empty() {
    let test = setup();
    let (status, json) = test.send(get_request("/orders", Some("nobody"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_list_orders_only_own() {
    let test = setup();
    test.seed("a1", "alice").await;
    test.seed("b1", "bob").await;
    test.seed("a2", "alice").await;

    let (status, json) = test.send(get_request("/orders", Some("alice"))).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["orderId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a1", "a2"]);
}

#[tokio::test]
async fn test_list_requires_identity() {
    let test = setup();
    let (status, _) = test.send(get_request("/orders", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_missing_order() {
    let test = setup();
    let (status, json) = test.send(get_request("/orders/missing", Some("alice"))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_get_other_users_order_is_not_found() {
    let test = setup();
    test.seed("ord123", "alice").await;

    let (status, _) = test.send(get_request("/orders/ord123", Some("mallory"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = test.send(get_request("/orders/ord123", Some("alice"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let test = setup();
    test.repository.set_unavailable(Some("connection reset")).await;

    let (status, json) = test.send(get_request("/orders", Some("alice"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Internal Server Error");
}

#[tokio::test]
async fn test_unmatched_route() {
    let test = setup();
    let (status, json) = test.send(get_request("/invalid", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({ "message": "Not Found" }));
}

#[tokio::test]
async fn test_unmatched_method() {
    let test = setup();
    let request = Request::builder()
        .method("DELETE")
        .uri("/orders/ord123")
        .body(Body::empty())
        .unwrap();

    let (status, json) = test.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({ "message": "Not Found" }));
}
