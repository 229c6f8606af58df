mod common;

use pulsebeat::configuration::get_configuration;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn spawn_with_generation_stub() -> Option<(common::TestApp, MockServer)> {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": [] })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Claro, tenemos varios modelos de auriculares disponibles."
        })))
        .mount(&mock_server)
        .await;

    let mut configuration = get_configuration().expect("Failed to get configuration");
    configuration.ollama.base_url = mock_server.uri();

    let app = common::spawn_app_with_configuration(configuration).await?;
    Some((app, mock_server))
}

#[tokio::test]
async fn greeting_gets_a_predefined_response() {
    let Some((app, _mock_server)) = spawn_with_generation_stub().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/chat/", &app.address))
        .json(&json!({ "message": "Hola", "session_id": "greeting-session" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("valid json");
    assert_eq!(body["source"], "predefined");
    assert!(!body["response"].as_str().unwrap_or_default().is_empty());
    assert_eq!(body["session_id"], "greeting-session");
    assert!(body["processing_time"].is_number());
    assert!(body["suggestions"].as_array().map_or(0, |s| s.len()) <= 3);
    assert!(body["message_id"].is_string());
}

#[tokio::test]
async fn price_question_embeds_catalog_price() {
    let Some((app, _mock_server)) = spawn_with_generation_stub().await else {
        return;
    };
    common::seed_product(&app.db_pool, "SoundWave X3", "soundwave-x3", 199.99, "Headphones").await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/chat/", &app.address))
        .json(&json!({
            "message": "cuánto cuesta el SoundWave X3",
            "session_id": "price-session"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    let body: Value = response.json().await.expect("valid json");
    assert_eq!(body["source"], "price");
    let text = body["response"].as_str().unwrap_or_default();
    assert!(text.contains("SoundWave X3"));
    assert!(text.contains("$199.99"));
    assert_eq!(body["intent"], "precio_producto");
}

#[tokio::test]
async fn open_question_is_answered_by_the_generation_service() {
    let Some((app, _mock_server)) = spawn_with_generation_stub().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/chat/", &app.address))
        .json(&json!({
            "message": "háblame de la historia de la marca",
            "session_id": "ollama-session"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    let body: Value = response.json().await.expect("valid json");
    assert_eq!(body["source"], "ollama");
    assert!(body["response"]
        .as_str()
        .unwrap_or_default()
        .contains("Claro, tenemos varios modelos"));
}

#[tokio::test]
async fn generation_service_outage_degrades_to_fallback() {
    // no wiremock: the configured ollama endpoint is unreachable
    let mut configuration = get_configuration().expect("Failed to get configuration");
    configuration.ollama.base_url = "http://127.0.0.1:1".to_string();

    let Some(app) = common::spawn_app_with_configuration(configuration).await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/chat/", &app.address))
        .json(&json!({
            "message": "háblame de la historia de la marca",
            "session_id": "outage-session"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("valid json");
    assert_eq!(body["source"], "fallback");
    assert!(!body["response"].as_str().unwrap_or_default().is_empty());
    assert!(body["processing_time"].is_number());
}

#[tokio::test]
async fn empty_message_gets_validation_response_not_an_error() {
    let Some((app, _mock_server)) = spawn_with_generation_stub().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/chat/", &app.address))
        .json(&json!({ "message": "", "session_id": "validation-session" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("valid json");
    assert_eq!(body["source"], "validation");
}

#[tokio::test]
async fn non_post_method_is_rejected_with_405() {
    let Some((app, _mock_server)) = spawn_with_generation_stub().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/chat/", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 405);
}

#[tokio::test]
async fn malformed_body_is_a_400() {
    let Some((app, _mock_server)) = spawn_with_generation_stub().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/chat/", &app.address))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn missing_session_id_is_synthesized() {
    let Some((app, _mock_server)) = spawn_with_generation_stub().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/chat/", &app.address))
        .json(&json!({ "message": "Hola" }))
        .send()
        .await
        .expect("Failed to execute request.");

    let body: Value = response.json().await.expect("valid json");
    let session_id = body["session_id"].as_str().unwrap_or_default();
    assert!(session_id.starts_with("temp_"));
}

#[tokio::test]
async fn feedback_round_trip_creates_one_review_flag_per_negative_call() {
    let Some((app, _mock_server)) = spawn_with_generation_stub().await else {
        return;
    };
    let client = reqwest::Client::new();

    // get a bot message to rate
    let response = client
        .post(&format!("{}/api/chat/", &app.address))
        .json(&json!({ "message": "Hola", "session_id": "feedback-session" }))
        .send()
        .await
        .expect("Failed to execute request.");
    let body: Value = response.json().await.expect("valid json");
    let message_id = body["message_id"].as_str().expect("message id").to_string();

    // positive feedback: no review flag
    let ack = client
        .post(&format!("{}/api/chat/", &app.address))
        .json(&json!({ "message_id": message_id, "feedback": true }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert!(ack.status().is_success());

    let flags: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM review_flags WHERE message_id = $1::uuid")
            .bind(&message_id)
            .fetch_one(&app.db_pool)
            .await
            .expect("count query");
    assert_eq!(flags, 0);

    // negative feedback: exactly one flag, and the message is updated
    let ack = client
        .post(&format!("{}/api/chat/", &app.address))
        .json(&json!({ "message_id": message_id, "feedback": false }))
        .send()
        .await
        .expect("Failed to execute request.");
    let ack_body: Value = ack.json().await.expect("valid json");
    assert_eq!(ack_body["success"], true);

    let flags: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM review_flags WHERE message_id = $1::uuid")
            .bind(&message_id)
            .fetch_one(&app.db_pool)
            .await
            .expect("count query");
    assert_eq!(flags, 1);

    let feedback: Option<bool> =
        sqlx::query_scalar("SELECT feedback FROM messages WHERE id = $1::uuid")
            .bind(&message_id)
            .fetch_one(&app.db_pool)
            .await
            .expect("feedback query");
    assert_eq!(feedback, Some(false));

    // last write wins
    client
        .post(&format!("{}/api/chat/", &app.address))
        .json(&json!({ "message_id": message_id, "feedback": true }))
        .send()
        .await
        .expect("Failed to execute request.");

    let feedback: Option<bool> =
        sqlx::query_scalar("SELECT feedback FROM messages WHERE id = $1::uuid")
            .bind(&message_id)
            .fetch_one(&app.db_pool)
            .await
            .expect("feedback query");
    assert_eq!(feedback, Some(true));
}

#[tokio::test]
async fn concurrent_first_messages_create_one_conversation() {
    let Some((app, _mock_server)) = spawn_with_generation_stub().await else {
        return;
    };

    let meta = pulsebeat::models::ClientMeta::default();
    let (a, b) = tokio::join!(
        pulsebeat::db::conversation::get_or_create(&app.db_pool, "race-session", None, &meta),
        pulsebeat::db::conversation::get_or_create(&app.db_pool, "race-session", None, &meta),
    );
    let (conversation_a, _) = a.expect("first call");
    let (conversation_b, _) = b.expect("second call");
    assert_eq!(conversation_a.id, conversation_b.id);

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM conversations WHERE session_id = $1")
            .bind("race-session")
            .fetch_one(&app.db_pool)
            .await
            .expect("count query");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn chat_turn_persists_both_messages_and_bumps_conversation() {
    let Some((app, _mock_server)) = spawn_with_generation_stub().await else {
        return;
    };
    let client = reqwest::Client::new();

    client
        .post(&format!("{}/api/chat/", &app.address))
        .json(&json!({ "message": "Hola", "session_id": "persist-session" }))
        .send()
        .await
        .expect("Failed to execute request.");

    let messages: i64 = sqlx::query_scalar(
        r#"SELECT COUNT(*) FROM messages m
           JOIN conversations c ON c.id = m.conversation_id
           WHERE c.session_id = $1"#,
    )
    .bind("persist-session")
    .fetch_one(&app.db_pool)
    .await
    .expect("count query");
    assert_eq!(messages, 2);

    let sources: Vec<String> = sqlx::query_scalar(
        r#"SELECT m.source FROM messages m
           JOIN conversations c ON c.id = m.conversation_id
           WHERE c.session_id = $1
           ORDER BY m.created_at, m.is_bot"#,
    )
    .bind("persist-session")
    .fetch_all(&app.db_pool)
    .await
    .expect("sources query");
    assert_eq!(sources[0], "user");
    assert_eq!(sources[1], "predefined");
}
