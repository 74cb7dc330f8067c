//! Shared fixtures: service-account credentials and canned API payloads.

use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use newsdesk::config::Config;
use newsdesk::sheets::ServiceAccountKey;

pub const SERVICE_ACCOUNT_JSON: &str = include_str!("../fixtures/service_account.json");
pub const SPREADSHEET_ID: &str = "sheet-123";
pub const API_KEY: &str = "pplx-test-key";
pub const ACCESS_TOKEN: &str = "ya29.test-access-token";
pub const UNPUBLISHED: &str = "Неопубліковано";

/// Fixture key whose `token_uri` points at `server`.
pub fn service_account_for(server: &MockServer) -> ServiceAccountKey {
    let mut key = ServiceAccountKey::from_json(SERVICE_ACCOUNT_JSON).expect("fixture key is valid");
    key.token_uri = format!("{}/token", server.uri());
    key
}

/// Config wired entirely against `server`, with no delay between analyses.
pub fn config_for(server: &MockServer) -> Config {
    Config {
        credentials: service_account_for(server),
        spreadsheet_id: SPREADSHEET_ID.to_string(),
        inference_api_key: API_KEY.to_string(),
        sheets_base_url: server.uri(),
        inference_url: format!("{}/chat/completions", server.uri()),
        request_delay: std::time::Duration::ZERO,
        ..Default::default()
    }
}

/// Mounts a token endpoint that accepts the JWT-bearer grant.
pub async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .mount(server)
        .await;
}

pub fn values_path(range: &str) -> String {
    format!("/v4/spreadsheets/{SPREADSHEET_ID}/values/{range}")
}

/// A `spreadsheets.values.get` body.
pub fn value_range(range: &str, rows: &[&[&str]]) -> Value {
    json!({
        "range": range,
        "majorDimension": "ROWS",
        "values": rows,
    })
}

/// An OpenAI-compatible chat completion body carrying `content`.
pub fn completion_body(content: Option<&str>) -> Value {
    json!({
        "id": "cmpl-test",
        "object": "chat.completion",
        "created": 1_730_000_000,
        "model": "llama-3.1-sonar-small-128k-online",
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": { "role": "assistant", "content": content }
        }],
        "usage": { "prompt_tokens": 60, "completion_tokens": 12, "total_tokens": 72 }
    })
}
