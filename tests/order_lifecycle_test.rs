mod common;

use axum::http::StatusCode;
use sea_orm::EntityTrait;
use serde_json::json;
use uuid::Uuid;

use common::{response_json, TestApp};
use supplylink_api::entities::order::OrderStatus;
use supplylink_api::entities::{incoming_order, order};

async fn setup_counterparties(app: &TestApp) -> (Uuid, Uuid) {
    let vendor = app.register_user("vendor", "Chaat Corner", "9100000000").await;
    let supplier = app
        .register_user("supplier", "Fresh Farms", "9000000001")
        .await;
    (vendor, supplier)
}

fn onion_line(quantity: i32) -> serde_json::Value {
    json!([{ "name": "Onions", "quantity": quantity, "price": 30.0, "unit": "kg" }])
}

#[tokio::test]
async fn placing_an_order_creates_both_copies_with_a_shared_id() {
    let app = TestApp::spawn().await;
    let (vendor, supplier) = setup_counterparties(&app).await;

    let order_id = app
        .place_order(vendor, supplier, onion_line(10), 300.0, "Cash")
        .await;

    let vendor_copy = order::Entity::find_by_id(order_id)
        .one(app.state.db.as_ref())
        .await
        .expect("query vendor copy")
        .expect("vendor copy exists");
    let supplier_copy = incoming_order::Entity::find_by_id(order_id)
        .one(app.state.db.as_ref())
        .await
        .expect("query supplier copy")
        .expect("supplier copy exists");

    assert_eq!(vendor_copy.status, OrderStatus::Pending);
    assert_eq!(supplier_copy.status, OrderStatus::Pending);
    assert_eq!(vendor_copy.vendor_name, "Chaat Corner");
    assert_eq!(supplier_copy.supplier_name, "Fresh Farms");
    assert_eq!(vendor_copy.items, supplier_copy.items);
}

#[tokio::test]
async fn placing_an_order_without_items_is_rejected() {
    let app = TestApp::spawn().await;
    let (vendor, supplier) = setup_counterparties(&app).await;

    let response = app
        .post(
            "/api/orders/place",
            json!({
                "vendorId": vendor,
                "supplierId": supplier,
                "items": [],
                "total": 0.0,
                "paymentMethod": "Cash",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn vendor_order_list_shows_only_active_orders() {
    let app = TestApp::spawn().await;
    let (vendor, supplier) = setup_counterparties(&app).await;

    let active = app
        .place_order(vendor, supplier, onion_line(5), 150.0, "Cash")
        .await;
    let cancelled = app
        .place_order(vendor, supplier, onion_line(2), 60.0, "Cash")
        .await;
    let response = app
        .put(&format!("/api/orders/vendor/{}/cancel/{}", vendor, cancelled))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get(&format!("/api/orders/vendor/{}", vendor)).await;
    let body = response_json(response).await;
    let orders = body.as_array().expect("order array");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], active.to_string());
    assert_eq!(orders[0]["status"], "pending");
}

#[tokio::test]
async fn accepting_an_order_deducts_inventory_by_item_name() {
    let app = TestApp::spawn().await;
    let (vendor, supplier) = setup_counterparties(&app).await;
    app.seed_inventory(supplier, "Onions", 30.0, 50).await;
    app.seed_inventory(supplier, "Garlic", 80.0, 30).await;

    let order_id = app
        .place_order(
            vendor,
            supplier,
            json!([
                { "name": "Onions", "quantity": 10, "price": 30.0, "unit": "kg" },
                { "name": "Garlic", "quantity": 5, "price": 80.0, "unit": "kg" },
            ]),
            700.0,
            "Cash",
        )
        .await;

    let response = app
        .put(&format!(
            "/api/orders/supplier/{}/accept/{}",
            supplier, order_id
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .get(&format!("/api/inventory/supplier/{}", supplier))
        .await;
    let body = response_json(response).await;
    let items = body.as_array().expect("item array");
    assert_eq!(items[0]["name"], "Garlic");
    assert_eq!(items[0]["quantity"], 25);
    assert_eq!(items[1]["name"], "Onions");
    assert_eq!(items[1]["quantity"], 40);

    // Both copies moved to confirmed
    let response = app.get(&format!("/api/orders/vendor/{}", vendor)).await;
    let body = response_json(response).await;
    assert_eq!(body[0]["status"], "confirmed");
    let response = app
        .get(&format!(
            "/api/orders/supplier/{}/incoming?status=confirmed",
            supplier
        ))
        .await;
    let body = response_json(response).await;
    assert_eq!(body.as_array().expect("order array").len(), 1);
}

#[tokio::test]
async fn insufficient_stock_rolls_back_the_whole_acceptance() {
    let app = TestApp::spawn().await;
    let (vendor, supplier) = setup_counterparties(&app).await;
    app.seed_inventory(supplier, "Onions", 30.0, 50).await;
    app.seed_inventory(supplier, "Garlic", 80.0, 3).await;

    let order_id = app
        .place_order(
            vendor,
            supplier,
            json!([
                { "name": "Onions", "quantity": 10, "price": 30.0, "unit": "kg" },
                { "name": "Garlic", "quantity": 5, "price": 80.0, "unit": "kg" },
            ]),
            700.0,
            "Cash",
        )
        .await;

    let response = app
        .put(&format!(
            "/api/orders/supplier/{}/accept/{}",
            supplier, order_id
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The onion deduction did not survive and the order is still pending
    let response = app
        .get(&format!("/api/inventory/supplier/{}", supplier))
        .await;
    let body = response_json(response).await;
    let items = body.as_array().expect("item array");
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(items[1]["quantity"], 50);

    let response = app
        .get(&format!(
            "/api/orders/supplier/{}/incoming?status=pending",
            supplier
        ))
        .await;
    let body = response_json(response).await;
    assert_eq!(body.as_array().expect("order array").len(), 1);
}

#[tokio::test]
async fn ordered_items_missing_from_inventory_are_skipped() {
    let app = TestApp::spawn().await;
    let (vendor, supplier) = setup_counterparties(&app).await;
    app.seed_inventory(supplier, "Onions", 30.0, 50).await;

    let order_id = app
        .place_order(
            vendor,
            supplier,
            json!([
                { "name": "Onions", "quantity": 10, "price": 30.0, "unit": "kg" },
                { "name": "Paneer", "quantity": 2, "price": 250.0, "unit": "kg" },
            ]),
            800.0,
            "Cash",
        )
        .await;

    let response = app
        .put(&format!(
            "/api/orders/supplier/{}/accept/{}",
            supplier, order_id
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .get(&format!("/api/inventory/supplier/{}", supplier))
        .await;
    let body = response_json(response).await;
    assert_eq!(body[0]["quantity"], 40);
}

#[tokio::test]
async fn accepting_twice_is_rejected() {
    let app = TestApp::spawn().await;
    let (vendor, supplier) = setup_counterparties(&app).await;
    app.seed_inventory(supplier, "Onions", 30.0, 50).await;
    let order_id = app
        .place_order(vendor, supplier, onion_line(10), 300.0, "Cash")
        .await;

    let uri = format!("/api/orders/supplier/{}/accept/{}", supplier, order_id);
    assert_eq!(app.put(&uri).await.status(), StatusCode::OK);
    assert_eq!(app.put(&uri).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rejecting_shows_cancelled_to_the_vendor() {
    let app = TestApp::spawn().await;
    let (vendor, supplier) = setup_counterparties(&app).await;
    let order_id = app
        .place_order(vendor, supplier, onion_line(10), 300.0, "Cash")
        .await;

    let response = app
        .put(&format!(
            "/api/orders/supplier/{}/reject/{}",
            supplier, order_id
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let supplier_copy = incoming_order::Entity::find_by_id(order_id)
        .one(app.state.db.as_ref())
        .await
        .expect("query supplier copy")
        .expect("supplier copy exists");
    assert_eq!(supplier_copy.status, OrderStatus::Rejected);

    let vendor_copy = order::Entity::find_by_id(order_id)
        .one(app.state.db.as_ref())
        .await
        .expect("query vendor copy")
        .expect("vendor copy exists");
    assert_eq!(vendor_copy.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn cancelling_updates_both_copies() {
    let app = TestApp::spawn().await;
    let (vendor, supplier) = setup_counterparties(&app).await;
    let order_id = app
        .place_order(vendor, supplier, onion_line(10), 300.0, "Cash")
        .await;

    let response = app
        .put(&format!("/api/orders/vendor/{}/cancel/{}", vendor, order_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let supplier_copy = incoming_order::Entity::find_by_id(order_id)
        .one(app.state.db.as_ref())
        .await
        .expect("query supplier copy")
        .expect("supplier copy exists");
    assert_eq!(supplier_copy.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn delivering_completes_the_vendor_copy() {
    let app = TestApp::spawn().await;
    let (vendor, supplier) = setup_counterparties(&app).await;
    app.seed_inventory(supplier, "Onions", 30.0, 50).await;
    let order_id = app
        .place_order(vendor, supplier, onion_line(10), 300.0, "Cash")
        .await;

    app.put(&format!(
        "/api/orders/supplier/{}/accept/{}",
        supplier, order_id
    ))
    .await;
    let response = app
        .put(&format!(
            "/api/orders/supplier/{}/deliver/{}",
            supplier, order_id
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let supplier_copy = incoming_order::Entity::find_by_id(order_id)
        .one(app.state.db.as_ref())
        .await
        .expect("query supplier copy")
        .expect("supplier copy exists");
    assert_eq!(supplier_copy.status, OrderStatus::Delivered);

    let vendor_copy = order::Entity::find_by_id(order_id)
        .one(app.state.db.as_ref())
        .await
        .expect("query vendor copy")
        .expect("vendor copy exists");
    assert_eq!(vendor_copy.status, OrderStatus::Completed);

    // A delivered order can no longer be cancelled
    let response = app
        .put(&format!("/api/orders/vendor/{}/cancel/{}", vendor, order_id))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delivering_before_acceptance_is_rejected() {
    let app = TestApp::spawn().await;
    let (vendor, supplier) = setup_counterparties(&app).await;
    let order_id = app
        .place_order(vendor, supplier, onion_line(10), 300.0, "Cash")
        .await;

    let response = app
        .put(&format!(
            "/api/orders/supplier/{}/deliver/{}",
            supplier, order_id
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_orders_are_not_found() {
    let app = TestApp::spawn().await;
    let (vendor, supplier) = setup_counterparties(&app).await;
    let missing = Uuid::new_v4();

    let response = app
        .put(&format!("/api/orders/vendor/{}/cancel/{}", vendor, missing))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .put(&format!(
            "/api/orders/supplier/{}/accept/{}",
            supplier, missing
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_defaults_to_settled_orders() {
    let app = TestApp::spawn().await;
    let (vendor, supplier) = setup_counterparties(&app).await;
    app.seed_inventory(supplier, "Onions", 30.0, 50).await;

    let settled = app
        .place_order(vendor, supplier, onion_line(5), 150.0, "Cash")
        .await;
    app.put(&format!("/api/orders/vendor/{}/cancel/{}", vendor, settled))
        .await;
    app.place_order(vendor, supplier, onion_line(2), 60.0, "Cash")
        .await;

    let response = app
        .get(&format!("/api/orders/history/vendor/{}", vendor))
        .await;
    let body = response_json(response).await;
    let orders = body.as_array().expect("order array");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], "cancelled");

    // "all" lifts the settled-status filter
    let response = app
        .get(&format!("/api/orders/history/vendor/{}?status=all", vendor))
        .await;
    let body = response_json(response).await;
    assert_eq!(body.as_array().expect("order array").len(), 2);
}

#[tokio::test]
async fn history_date_window_is_inclusive_of_to_date() {
    let app = TestApp::spawn().await;
    let (vendor, supplier) = setup_counterparties(&app).await;

    let order_id = app
        .place_order(vendor, supplier, onion_line(5), 150.0, "Cash")
        .await;
    app.put(&format!("/api/orders/vendor/{}/cancel/{}", vendor, order_id))
        .await;

    let today = chrono::Utc::now().date_naive();
    let response = app
        .get(&format!(
            "/api/orders/history/vendor/{}?fromDate={}&toDate={}",
            vendor, today, today
        ))
        .await;
    let body = response_json(response).await;
    assert_eq!(body.as_array().expect("order array").len(), 1);

    let yesterday = today.pred_opt().expect("yesterday");
    let response = app
        .get(&format!(
            "/api/orders/history/vendor/{}?fromDate={}&toDate={}",
            vendor, yesterday, yesterday
        ))
        .await;
    let body = response_json(response).await;
    assert!(body.as_array().expect("order array").is_empty());
}

#[tokio::test]
async fn incoming_queue_rejects_unknown_status_filters() {
    let app = TestApp::spawn().await;
    let (_, supplier) = setup_counterparties(&app).await;

    let response = app
        .get(&format!(
            "/api/orders/supplier/{}/incoming?status=shipped",
            supplier
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
