//! HTTP-level tests driving the full router with `oneshot`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::post;
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::{json, Value};
use tower::ServiceExt;

use market_api::storage::{image_key, MemoryObjectStore, ObjectStore, StorageError};
use market_api::{create_router, ApiConfig, AppState};
use market_db::{Database, DbConfig};

const BOUNDARY: &str = "X-MARKET-TEST-BOUNDARY";

// =============================================================================
// Harness
// =============================================================================

struct TestApp {
    router: Router,
    state: Arc<AppState>,
}

impl TestApp {
    async fn new() -> Self {
        Self::with(ApiConfig::default(), Arc::new(MemoryObjectStore::new())).await
    }

    async fn with(config: ApiConfig, storage: Arc<dyn ObjectStore>) -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = Arc::new(AppState::new(db, storage, config));
        TestApp {
            router: create_router(state.clone()),
            state,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_images(&self, product_id: i64, count: usize) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(format!("/products/{}", product_id))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(count)))
                .unwrap(),
        )
        .await
    }

    /// Seller plus one product priced 10.00.
    async fn seed_product(&self, quantity: i64) -> (i64, i64) {
        let (_, seller) = self
            .post_json(
                "/sellers/signup",
                json!({"email": "s@shop.sg", "password": "pw", "seller_name": "Shop"}),
            )
            .await;
        let seller_id = seller["seller_id"].as_i64().unwrap();

        let (status, product) = self
            .post_json(
                "/products",
                json!({
                    "title": "Lamp",
                    "seller_id": seller_id,
                    "description": "Warm LED",
                    "product_type": "Buy-Now",
                    "price": 1000,
                    "condition": 5,
                    "product_quantity": quantity
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        (seller_id, product["product_id"].as_i64().unwrap())
    }

    async fn seed_buyer(&self) -> i64 {
        let (_, buyer) = self
            .post_json("/buyers/signup", json!({"email": "b@shop.sg", "password": "pw"}))
            .await;
        buyer["buyer_id"].as_i64().unwrap()
    }
}

fn multipart_body(count: usize) -> Vec<u8> {
    let mut body = Vec::new();
    for i in 0..count {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{}.png\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY, i
            )
            .as_bytes(),
        );
        body.extend_from_slice(&[0x89, b'P', b'N', b'G', i as u8]);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn order_body(product_id: i64, buyer_id: i64) -> Value {
    json!({
        "product_id": product_id,
        "buyer_id": buyer_id,
        "order_quantity": 2,
        "payment_type": "paynow_online",
        "delivery_type": "self_collection",
        "amount": 2100,
        "phone": "91234567",
        "address_line_1": "1 Orchard Rd",
        "postal_code": "238801"
    })
}

/// Store that accepts `ok_puts` objects and fails afterwards.
struct FlakyStore {
    inner: MemoryObjectStore,
    ok_puts: usize,
    puts: AtomicUsize,
}

#[async_trait]
impl ObjectStore for FlakyStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        if self.puts.fetch_add(1, Ordering::SeqCst) >= self.ok_puts {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        self.inner.put(key, data).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.delete(key).await
    }
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn buyer_signup_and_login() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json("/buyers/signup", json!({"email": "ann@shop.sg", "password": "pw"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "ann@shop.sg");
    assert!(body["buyer_id"].is_i64());
    assert!(body.get("password_hash").is_none());

    let (status, login) = app
        .post_json("/buyers/login", json!({"email": "ann@shop.sg", "password": "pw"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["buyer_id"], body["buyer_id"]);
}

#[tokio::test]
async fn duplicate_signups_are_rejected() {
    let app = TestApp::new().await;
    let signup = json!({"email": "s@shop.sg", "password": "pw", "seller_name": "Shop"});

    let (status, _) = app.post_json("/sellers/signup", signup.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post_json("/sellers/signup", signup).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already exists!");

    let (status, body) = app
        .post_json(
            "/sellers/signup",
            json!({"email": "t@shop.sg", "password": "pw", "seller_name": "Shop"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Seller name already exists!");
}

#[rstest]
#[case(json!({"email": "s@shop.sg", "password": "wrong"}))]
#[case(json!({"email": "nobody@shop.sg", "password": "pw"}))]
#[case(json!({"email": "", "password": "pw"}))]
#[case(json!({"email": "s@shop.sg", "password": ""}))]
#[tokio::test]
async fn seller_login_failures_share_one_message(#[case] credentials: Value) {
    let app = TestApp::new().await;
    app.post_json(
        "/sellers/signup",
        json!({"email": "s@shop.sg", "password": "pw", "seller_name": "Shop"}),
    )
    .await;

    let (status, body) = app.post_json("/sellers/login", credentials).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Incorrect user email or password!");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/buyers/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn create_and_get_product() {
    let app = TestApp::new().await;
    let (seller_id, product_id) = app.seed_product(3).await;

    let (status, product) = app.get(&format!("/products/{}", product_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["seller_id"], seller_id);
    assert_eq!(product["product_type"], "Buy-Now");
    assert_eq!(product["price"], 1000);
    assert_eq!(product["sold_quantity"], 0);
    assert_eq!(product["product_quantity"], 3);
    assert!(product["posted_date"].is_string());
}

#[rstest]
#[case(json!({"price": -5, "condition": 9, "product_type": "Auction"}), "Bad price data")]
#[case(json!({"price": 5, "condition": 9, "product_type": "Auction"}), "Bad condition data")]
#[case(json!({"price": 5, "condition": 2, "product_type": "Auction"}), "Bad product_type data")]
#[case(json!({"price": 5, "condition": 2, "product_type": "Pre-Order", "product_quantity": 0}), "Bad product_quantity data")]
#[case(json!({"price": 5, "condition": 2, "product_type": "Pre-Order"}), "Bad seller_id data")]
#[tokio::test]
async fn product_validation_messages(#[case] fields: Value, #[case] expected: &str) {
    let app = TestApp::new().await;

    let mut body = json!({"title": "Lamp", "seller_id": 404, "description": ""});
    for (k, v) in fields.as_object().unwrap() {
        body[k] = v.clone();
    }

    let (status, response) = app.post_json("/products", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], expected);
}

#[tokio::test]
async fn missing_product_is_404_and_bad_id_is_400() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/products/77").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());

    let (status, _) = app.get("/products/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Product Images
// =============================================================================

#[tokio::test]
async fn attach_images_once() {
    let store = Arc::new(MemoryObjectStore::new());
    let app = TestApp::with(ApiConfig::default(), store.clone()).await;
    let (_, product_id) = app.seed_product(1).await;

    let (status, body) = app.post_images(product_id, 2).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product_id"], product_id);

    let ids: Vec<i64> = body["image_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(store.len().await, 2);
    assert_eq!(
        store.get(&image_key(ids[1])).await,
        Some(Bytes::from_static(&[0x89, b'P', b'N', b'G', 1]))
    );

    let (_, product) = app.get(&format!("/products/{}", product_id)).await;
    assert_eq!(product["image_count"], 2);

    let (status, body) = app.post_images(product_id, 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        format!("Product {} already has images", product_id)
    );
}

#[rstest]
#[case(0, "No images attached to the request")]
#[case(6, "Too many images attached, maximum is 5")]
#[tokio::test]
async fn attach_images_count_limits(#[case] count: usize, #[case] expected: &str) {
    let app = TestApp::new().await;
    let (_, product_id) = app.seed_product(1).await;

    let (status, body) = app.post_images(product_id, count).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], expected);
}

#[tokio::test]
async fn attach_images_unknown_product() {
    let app = TestApp::new().await;

    let (status, body) = app.post_images(31, 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Product 31 does not exist");
}

#[tokio::test]
async fn attach_images_requires_multipart() {
    let app = TestApp::new().await;
    let (_, product_id) = app.seed_product(1).await;

    let (status, _) = app
        .post_json(&format!("/products/{}", product_id), json!({"images": []}))
        .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn failed_upload_leaves_no_rows_or_objects() {
    let store = Arc::new(FlakyStore {
        inner: MemoryObjectStore::new(),
        ok_puts: 1,
        puts: AtomicUsize::new(0),
    });
    let app = TestApp::with(ApiConfig::default(), store.clone()).await;
    let (_, product_id) = app.seed_product(1).await;

    let (status, body) = app.post_images(product_id, 3).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to upload product images");

    assert!(store.inner.is_empty().await);
    let images = app.state.db.products().list_images(product_id).await.unwrap();
    assert!(images.is_empty());

    let (_, product) = app.get(&format!("/products/{}", product_id)).await;
    assert_eq!(product["image_count"], 0);
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn order_round_trip() {
    let app = TestApp::new().await;
    let (_, product_id) = app.seed_product(5).await;
    let buyer_id = app.seed_buyer().await;

    let (status, created) = app.post_json("/orders", order_body(product_id, buyer_id)).await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = created["order_id"].as_i64().unwrap();
    assert_eq!(
        created["redirect_url"],
        format!("http://localhost:8080/payment/confirmation?order_id={}", order_id)
    );

    let (status, order) = app.get(&format!("/orders/{}", order_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["product_id"], product_id);
    assert_eq!(order["buyer_id"], buyer_id);
    assert_eq!(order["address_line_1"], "1 Orchard Rd");
    assert_eq!(order["address_line_2"], "");
    assert_eq!(order["postal_code"], "238801");
    assert_eq!(order["payment_status"], "pending");
    assert_eq!(order["payment_type"], "paynow_online");
}

#[tokio::test]
async fn order_validation_reports_first_failure() {
    let app = TestApp::new().await;
    let (_, product_id) = app.seed_product(5).await;
    let buyer_id = app.seed_buyer().await;

    let mut body = order_body(product_id + 10, buyer_id + 10);
    body["order_quantity"] = json!(99);
    body["payment_type"] = json!("cash");
    body["delivery_type"] = json!("drone");
    body["amount"] = json!(1);

    let steps = [
        ("product_id", json!(product_id), "Bad product_id data"),
        ("buyer_id", json!(buyer_id), "Bad buyer_id data"),
        ("order_quantity", json!(2), "Bad order_quantity data"),
        ("payment_type", json!("card"), "Bad payment_type data"),
        ("delivery_type", json!("standard_delivery"), "Bad delivery_type data"),
        ("amount", json!(2550), "Bad amount data"),
    ];

    for (field, fix, expected) in steps {
        let (status, response) = app.post_json("/orders", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["message"], expected);
        body[field] = fix;
    }

    let (status, _) = app.post_json("/orders", body).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[rstest]
#[case("paynow_online", "self_collection", 2100)]
#[case("paynow_online", "standard_delivery", 2500)]
#[case("card", "standard_delivery", 2550)]
#[tokio::test]
async fn order_amount_includes_fees(
    #[case] payment_type: &str,
    #[case] delivery_type: &str,
    #[case] amount: i64,
) {
    let app = TestApp::new().await;
    let (_, product_id) = app.seed_product(5).await;
    let buyer_id = app.seed_buyer().await;

    let mut body = order_body(product_id, buyer_id);
    body["payment_type"] = json!(payment_type);
    body["delivery_type"] = json!(delivery_type);
    body["amount"] = json!(amount);

    let (status, _) = app.post_json("/orders", body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    body["amount"] = json!(amount + 1);
    let (status, response) = app.post_json("/orders", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Bad amount data");
}

#[tokio::test]
async fn orders_cannot_oversell() {
    let app = TestApp::new().await;
    let (_, product_id) = app.seed_product(3).await;
    let buyer_id = app.seed_buyer().await;

    let (status, _) = app.post_json("/orders", order_body(product_id, buyer_id)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post_json("/orders", order_body(product_id, buyer_id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Bad order_quantity data");

    let (_, product) = app.get(&format!("/products/{}", product_id)).await;
    assert_eq!(product["sold_quantity"], 2);
}

#[tokio::test]
async fn huge_order_total_is_rejected_not_panicking() {
    let app = TestApp::new().await;
    let (_, seller) = app
        .post_json(
            "/sellers/signup",
            json!({"email": "s@shop.sg", "password": "pw", "seller_name": "Shop"}),
        )
        .await;
    let (status, product) = app
        .post_json(
            "/products",
            json!({
                "title": "Yacht",
                "seller_id": seller["seller_id"],
                "product_type": "Buy-Now",
                "price": i64::MAX / 2 + 1,
                "condition": 5,
                "product_quantity": 2
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let buyer_id = app.seed_buyer().await;

    let mut body = order_body(product["product_id"].as_i64().unwrap(), buyer_id);
    body["amount"] = json!(i64::MAX);
    let (status, response) = app.post_json("/orders", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Bad amount data");
}

#[tokio::test]
async fn guest_order_round_trip() {
    let app = TestApp::new().await;
    let (_, product_id) = app.seed_product(5).await;

    let mut body = order_body(product_id, 0);
    body.as_object_mut().unwrap().remove("buyer_id");
    body["email"] = json!("guest@x.sg");
    body["address_line_2"] = json!("#05-01");

    let (status, created) = app.post_json("/orders/guest", body).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["guest_order_id"].as_i64().unwrap();
    assert!(created["redirect_url"]
        .as_str()
        .unwrap()
        .ends_with(&format!("guest_order_id={}", id)));

    let (status, order) = app.get(&format!("/orders/guest/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["email"], "guest@x.sg");
    assert_eq!(order["address_line_2"], "#05-01");
}

#[tokio::test]
async fn missing_orders_are_404() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/orders/5").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/orders/guest/5").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/orders/five").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn payment_provider_url_is_used_as_redirect() {
    let provider = Router::new().route(
        "/v1/payment-requests",
        post(|| async {
            (
                StatusCode::CREATED,
                r#"{"id":"pr_9","url":"https://pay.example/checkout/pr_9","status":"pending"}"#,
            )
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, provider).await.unwrap();
    });

    let config = ApiConfig {
        payment_enabled: true,
        payment_api_base_url: Some(format!("http://{}", addr)),
        payment_api_key: Some("test-key".to_string()),
        ..ApiConfig::default()
    };
    let app = TestApp::with(config, Arc::new(MemoryObjectStore::new())).await;
    let (_, product_id) = app.seed_product(5).await;
    let buyer_id = app.seed_buyer().await;

    let (status, created) = app.post_json("/orders", order_body(product_id, buyer_id)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["redirect_url"], "https://pay.example/checkout/pr_9");
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_reports_database() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "database": true}));

    app.state.db.close().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], false);
}
