#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use supplylink_api::config::AppConfig;
use supplylink_api::db::{establish_connection_with_config, run_migrations, DbConfig};
use supplylink_api::events::{process_events, EventSender};
use supplylink_api::handlers::AppServices;
use supplylink_api::{app_router, AppState};

/// In-process application backed by an in-memory database.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        // A pool of one keeps every query on the same in-memory database
        let db_config = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let db = establish_connection_with_config(&db_config)
            .await
            .expect("connect to in-memory database");
        run_migrations(&db).await.expect("run migrations");
        let db = Arc::new(db);

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        tokio::spawn(process_events(event_rx));

        let services = AppServices::new(db.clone(), Arc::new(event_sender.clone()));
        let state = Arc::new(AppState {
            db,
            config: test_config(),
            event_sender,
            services,
        });

        Self {
            router: app_router(state.clone()),
            state,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                builder
                    .body(Body::from(value.to_string()))
                    .expect("build request")
            }
            None => builder.body(Body::empty()).expect("build request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("dispatch request")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response<Body> {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str) -> Response<Body> {
        self.request(Method::PUT, uri, None).await
    }

    /// Registers a user through the API and returns its id.
    pub async fn register_user(&self, role: &str, name: &str, phone: &str) -> Uuid {
        let response = self
            .post(
                "/api/auth/register",
                json!({
                    "name": name,
                    "phone": phone,
                    "address": "12 Market Road",
                    "password": "secret123",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_json(response).await;
        body["user"]["id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .expect("registered user id")
    }

    /// Adds an inventory item for a supplier and returns its id.
    pub async fn seed_inventory(
        &self,
        supplier_id: Uuid,
        name: &str,
        price: f64,
        quantity: i32,
    ) -> Uuid {
        let response = self
            .post(
                &format!("/api/inventory/supplier/{}/add", supplier_id),
                json!({
                    "name": name,
                    "unit": "kg",
                    "price": price,
                    "quantity": quantity,
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_json(response).await;
        body["itemId"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .expect("inventory item id")
    }

    /// Places an order and returns its id.
    pub async fn place_order(
        &self,
        vendor_id: Uuid,
        supplier_id: Uuid,
        items: Value,
        total: f64,
        payment_method: &str,
    ) -> Uuid {
        let response = self
            .post(
                "/api/orders/place",
                json!({
                    "vendorId": vendor_id,
                    "supplierId": supplier_id,
                    "items": items,
                    "total": total,
                    "paymentMethod": payment_method,
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_json(response).await;
        body["orderId"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .expect("order id")
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "development".to_string(),
        log_level: "warn".to_string(),
        log_json: false,
        auto_migrate: true,
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
        cors_allow_credentials: false,
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 5,
        db_idle_timeout_secs: 60,
        db_acquire_timeout_secs: 5,
    }
}

pub async fn response_json(response: Response<Body>) -> Value {
    use http_body_util::BodyExt;

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

/// Parses an amount that may be serialized as a JSON number or string.
pub fn amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().expect("numeric amount"),
        Value::String(s) => s.parse().expect("parsable amount"),
        other => panic!("unexpected amount representation: {:?}", other),
    }
}
