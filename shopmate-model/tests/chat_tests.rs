//! Integration tests driving the real chat client against a fake hosted
//! completion endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use shopmate_core::types::Product;
use shopmate_model::{ChatClient, ChatConfig, FALLBACK_ANSWER, ModelError};

#[derive(Default)]
struct FakeChat {
    requests: Vec<Value>,
    answer: Option<String>,
    fail: bool,
}

type Shared = Arc<Mutex<FakeChat>>;

async fn completions(State(state): State<Shared>, Json(body): Json<Value>) -> impl IntoResponse {
    let mut state = state.lock().await;
    state.requests.push(body);
    if state.fail {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "boom"})));
    }
    let content = state.answer.clone().unwrap_or_else(|| "It holds 12 ounces.".to_string());
    (StatusCode::OK, Json(json!({"choices": [{"message": {"role": "assistant", "content": content}}]})))
}

async fn spawn_fake(state: Shared) -> String {
    let app = Router::new()
        .route("/openai/deployments/{deployment}/chat/completions", post(completions))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client_for(base: &str) -> ChatClient {
    ChatClient::new(ChatConfig {
        endpoint: base.to_string(),
        api_key: "test-key".to_string(),
        deployment: "gpt-4".to_string(),
    })
    .unwrap()
}

fn product() -> Product {
    serde_json::from_value(json!({
        "id": "GGOEWXXX0828",
        "name": "Camp Mug",
        "description": "Enamel camp mug",
        "price": 12.5,
        "category": "Drinkware"
    }))
    .unwrap()
}

#[tokio::test]
async fn complete_sends_the_fixed_three_message_prompt() {
    let state = Shared::default();
    let base = spawn_fake(state.clone()).await;
    let client = client_for(&base);

    let answer = client.complete("How big is it?", &product()).await.unwrap();
    assert_eq!(answer, "It holds 12 ounces.");

    let state = state.lock().await;
    let request = &state.requests[0];
    assert_eq!(request["max_tokens"], 300);
    assert_eq!(request["temperature"], 0.7);

    let messages = request["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["role"], "system");
    assert!(
        messages[0]["content"].as_str().unwrap().contains("shopping assistant"),
        "system prompt missing: {:?}",
        messages[0]
    );
    assert_eq!(messages[1]["role"], "user");
    assert!(messages[1]["content"].as_str().unwrap().starts_with("Product Info:\n"));
    assert!(messages[1]["content"].as_str().unwrap().contains("GGOEWXXX0828"));
    assert_eq!(messages[2], json!({"role": "user", "content": "How big is it?"}));
}

#[tokio::test]
async fn complete_maps_upstream_failure_to_typed_error() {
    let state = Shared::default();
    state.lock().await.fail = true;
    let base = spawn_fake(state.clone()).await;
    let client = client_for(&base);

    match client.complete("hi", &product()).await {
        Err(ModelError::Upstream { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn ask_returns_the_answer_on_success() {
    let state = Shared::default();
    let base = spawn_fake(state.clone()).await;
    let client = client_for(&base);

    assert_eq!(client.ask("How big?", &product()).await, "It holds 12 ounces.");
}

#[tokio::test]
async fn ask_falls_back_to_the_apology_on_upstream_failure() {
    let state = Shared::default();
    state.lock().await.fail = true;
    let base = spawn_fake(state.clone()).await;
    let client = client_for(&base);

    assert_eq!(client.ask("How big?", &product()).await, FALLBACK_ANSWER);
}

#[tokio::test]
async fn ask_falls_back_when_the_endpoint_is_unreachable() {
    let client = client_for("http://127.0.0.1:9");
    let answer = client.ask("How big?", &product()).await;
    assert_eq!(answer, FALLBACK_ANSWER);
    assert!(!answer.is_empty());
}

#[tokio::test]
async fn ask_treats_an_empty_model_answer_as_a_failure() {
    let state = Shared::default();
    state.lock().await.answer = Some("   ".to_string());
    let base = spawn_fake(state.clone()).await;
    let client = client_for(&base);

    assert_eq!(client.ask("How big?", &product()).await, FALLBACK_ANSWER);
}
