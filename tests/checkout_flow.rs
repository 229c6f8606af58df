mod common;

use pulsebeat::configuration::get_configuration;
use pulsebeat::connectors::{FlutterwaveConnectorConfig, PayPalConnectorConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn add_to_cart(app: &common::TestApp, cart_code: &str, product_id: i32) {
    let client = reqwest::Client::new();
    let response = client
        .post(&format!("{}/cart/add", &app.address))
        .json(&json!({ "cart_code": cart_code, "product_id": product_id }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn checkout_requires_a_forwarded_identity() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/checkout/flutterwave", &app.address))
        .json(&json!({ "cart_code": "anon-cart" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn flutterwave_checkout_creates_a_pending_transaction() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Hosted Link",
            "data": { "link": "https://checkout.flutterwave.test/pay/abc" }
        })))
        .mount(&mock_server)
        .await;

    let mut configuration = get_configuration().expect("Failed to get configuration");
    configuration.connectors.flutterwave = Some(FlutterwaveConnectorConfig {
        enabled: true,
        base_url: mock_server.uri(),
        secret_key: Some("FLWSECK_TEST-secret".to_string()),
        timeout_secs: 5,
    });

    let Some(app) = common::spawn_app_with_configuration(configuration).await else {
        return;
    };
    let product_id =
        common::seed_product(&app.db_pool, "PulseBeat Pro", "pulsebeat-pro", 249.99, "Headphones")
            .await;
    add_to_cart(&app, "flw-cart", product_id).await;

    let client = reqwest::Client::new();
    let response = client
        .post(&format!("{}/checkout/flutterwave", &app.address))
        .header("x-user-id", "user-1")
        .header("x-user-name", "marta")
        .header("x-user-email", "marta@example.com")
        .json(&json!({ "cart_code": "flw-cart" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("valid json");
    assert_eq!(body["status"], "success");
    assert!(body["data"]["link"].as_str().unwrap_or_default().contains("checkout"));

    // pending transaction with price + flat tax
    let (amount, status): (f64, String) = sqlx::query_as(
        r#"SELECT t.amount, t.status FROM transactions t
           JOIN carts c ON c.id = t.cart_id
           WHERE c.cart_code = $1"#,
    )
    .bind("flw-cart")
    .fetch_one(&app.db_pool)
    .await
    .expect("transaction query");
    assert!((amount - 253.99).abs() < 0.01);
    assert_eq!(status, "pending");
}

#[tokio::test]
async fn flutterwave_callback_completes_the_payment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "link": "https://checkout.flutterwave.test/pay/abc" }
        })))
        .mount(&mock_server)
        .await;

    // verification echoes the expected amount (249.99 + 4.00 tax)
    Mock::given(method("GET"))
        .and(path_regex(r"^/v3/transactions/.*/verify$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "status": "successful",
                "amount": 253.99,
                "currency": "NGN"
            }
        })))
        .mount(&mock_server)
        .await;

    let mut configuration = get_configuration().expect("Failed to get configuration");
    configuration.connectors.flutterwave = Some(FlutterwaveConnectorConfig {
        enabled: true,
        base_url: mock_server.uri(),
        secret_key: Some("FLWSECK_TEST-secret".to_string()),
        timeout_secs: 5,
    });

    let Some(app) = common::spawn_app_with_configuration(configuration).await else {
        return;
    };
    let product_id =
        common::seed_product(&app.db_pool, "PulseBeat Pro", "pulsebeat-pro", 249.99, "Headphones")
            .await;
    add_to_cart(&app, "flw-cart-2", product_id).await;

    let client = reqwest::Client::new();
    client
        .post(&format!("{}/checkout/flutterwave", &app.address))
        .header("x-user-id", "user-2")
        .json(&json!({ "cart_code": "flw-cart-2" }))
        .send()
        .await
        .expect("Failed to execute request.");

    let tx_ref: String = sqlx::query_scalar(
        r#"SELECT t.tx_ref FROM transactions t
           JOIN carts c ON c.id = t.cart_id
           WHERE c.cart_code = $1"#,
    )
    .bind("flw-cart-2")
    .fetch_one(&app.db_pool)
    .await
    .expect("tx_ref query");

    let response = client
        .post(&format!(
            "{}/checkout/flutterwave/callback?status=successful&tx_ref={}&transaction_id=99001",
            &app.address, tx_ref
        ))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("valid json");
    assert_eq!(body["message"], "Payment successful!");

    let (status, paid): (String, bool) = sqlx::query_as(
        r#"SELECT t.status, c.paid FROM transactions t
           JOIN carts c ON c.id = t.cart_id
           WHERE t.tx_ref = $1"#,
    )
    .bind(&tx_ref)
    .fetch_one(&app.db_pool)
    .await
    .expect("status query");
    assert_eq!(status, "completed");
    assert!(paid);
}

#[tokio::test]
async fn paypal_checkout_returns_an_approval_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A21AA-test-token",
            "token_type": "Bearer"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/payments/payment"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "PAY-123",
            "links": [
                { "rel": "self", "href": "https://api.sandbox.paypal.test/PAY-123" },
                { "rel": "approval_url", "href": "https://www.sandbox.paypal.test/approve/PAY-123" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let mut configuration = get_configuration().expect("Failed to get configuration");
    configuration.connectors.paypal = Some(PayPalConnectorConfig {
        enabled: true,
        base_url: mock_server.uri(),
        client_id: Some("client-id".to_string()),
        client_secret: Some("client-secret".to_string()),
        timeout_secs: 5,
    });

    let Some(app) = common::spawn_app_with_configuration(configuration).await else {
        return;
    };
    let product_id =
        common::seed_product(&app.db_pool, "BassBoost Elite", "bassboost-elite", 149.0, "Headphones")
            .await;
    add_to_cart(&app, "pp-cart", product_id).await;

    let client = reqwest::Client::new();
    let response = client
        .post(&format!("{}/checkout/paypal", &app.address))
        .header("x-user-id", "user-3")
        .json(&json!({ "cart_code": "pp-cart" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("valid json");
    assert_eq!(
        body["approval_url"],
        "https://www.sandbox.paypal.test/approve/PAY-123"
    );
}

#[tokio::test]
async fn paypal_callback_executes_and_completes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A21AA-test-token"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/payments/payment"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "PAY-456",
            "links": [
                { "rel": "approval_url", "href": "https://www.sandbox.paypal.test/approve/PAY-456" }
            ]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/payments/payment/PAY-456/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "PAY-456",
            "state": "approved"
        })))
        .mount(&mock_server)
        .await;

    let mut configuration = get_configuration().expect("Failed to get configuration");
    configuration.connectors.paypal = Some(PayPalConnectorConfig {
        enabled: true,
        base_url: mock_server.uri(),
        client_id: Some("client-id".to_string()),
        client_secret: Some("client-secret".to_string()),
        timeout_secs: 5,
    });

    let Some(app) = common::spawn_app_with_configuration(configuration).await else {
        return;
    };
    let product_id =
        common::seed_product(&app.db_pool, "SoundTower", "soundtower", 349.0, "Speakers").await;
    add_to_cart(&app, "pp-cart-2", product_id).await;

    let client = reqwest::Client::new();
    client
        .post(&format!("{}/checkout/paypal", &app.address))
        .header("x-user-id", "user-4")
        .json(&json!({ "cart_code": "pp-cart-2" }))
        .send()
        .await
        .expect("Failed to execute request.");

    let tx_ref: String = sqlx::query_scalar(
        r#"SELECT t.tx_ref FROM transactions t
           JOIN carts c ON c.id = t.cart_id
           WHERE c.cart_code = $1"#,
    )
    .bind("pp-cart-2")
    .fetch_one(&app.db_pool)
    .await
    .expect("tx_ref query");

    let response = client
        .get(&format!(
            "{}/checkout/paypal/callback?paymentId=PAY-456&PayerID=PAYER-1&ref={}",
            &app.address, tx_ref
        ))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let status: String = sqlx::query_scalar("SELECT status FROM transactions WHERE tx_ref = $1")
        .bind(&tx_ref)
        .fetch_one(&app.db_pool)
        .await
        .expect("status query");
    assert_eq!(status, "completed");
}

#[tokio::test]
async fn missing_paypal_callback_params_are_a_400() {
    let Some(app) = common::spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .get(&format!(
            "{}/checkout/paypal/callback?paymentId=PAY-1",
            &app.address
        ))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 400);
}
