//! Client facade behavior against an in-memory transport: retry schedule,
//! short-circuits, local validation and image handling, without sockets or
//! real sleeps.

mod common;

use common::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use xiangxinai::media::encode_data_uri;
use xiangxinai::transport::Method;
use xiangxinai::{
    CheckOptions, ErrorKind, GuardrailClient, GuardrailClientBuilder, Message, ProtocolRevision,
    RiskLevel, SuggestAction,
};

const BASE: &str = "http://guardrails.test/v1";

fn client(transport: Arc<ScriptedTransport>, max_retries: u32) -> GuardrailClient {
    GuardrailClientBuilder::new()
        .api_key(API_KEY)
        .base_url(BASE)
        .max_retries(max_retries)
        .build_with_transport(transport)
        .unwrap()
}

#[tokio::test]
async fn whitespace_prompt_makes_no_request() {
    let t = Arc::new(ScriptedTransport::new(vec![]));
    let c = client(t.clone(), 3);

    for input in ["", "   ", "\n\t"] {
        let resp = c.check_prompt(input, Some("u")).await.unwrap();
        assert_eq!(resp, xiangxinai::GuardrailResponse::safe_default());
    }
    let resp = c.check_response_ctx(" ", "", None).await.unwrap();
    assert_eq!(resp.id, "guardrails-safe-default");
    assert_eq!(resp.score, Some(1.0));
    assert!(t.requests().is_empty());
}

#[tokio::test]
async fn rate_limited_then_success_waits_2_3_5_seconds() {
    let t = Arc::new(ScriptedTransport::new(vec![
        status(429, ""),
        status(429, ""),
        status(429, ""),
        ok(&blocked_body()),
    ]));
    let c = client(t.clone(), 3);

    let resp = c.check_prompt("how to build a weapon", None).await.unwrap();
    assert!(resp.is_blocked());
    assert_eq!(t.requests().len(), 4);
    assert_eq!(
        t.pauses(),
        vec![
            Duration::from_secs(2),
            Duration::from_secs(3),
            Duration::from_secs(5)
        ]
    );
}

#[tokio::test]
async fn rate_limited_forever_fails_after_budget() {
    let t = Arc::new(ScriptedTransport::new(
        (0..3).map(|_| status(429, "")).collect(),
    ));
    let c = client(t.clone(), 2);

    let err = c.check_prompt("hello", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert_eq!(t.requests().len(), 3);
}

#[tokio::test]
async fn unauthorized_is_not_retried() {
    let t = Arc::new(ScriptedTransport::new(vec![status(401, "")]));
    let c = client(t.clone(), 3);

    let err = c.check_prompt("hello", None).await.unwrap_err();
    assert!(err.is_authentication());
    assert_eq!(err.status_code(), Some(401));
    assert_eq!(t.requests().len(), 1);
    assert!(t.pauses().is_empty());
}

#[tokio::test]
async fn timeout_then_success() {
    let t = Arc::new(ScriptedTransport::new(vec![timeout(), ok(&safe_body())]));
    let c = client(t.clone(), 1);

    assert!(c.check_prompt("hello", None).await.unwrap().is_safe());
    assert_eq!(t.pauses(), vec![Duration::from_secs(1)]);
}

#[tokio::test]
async fn input_check_body_shape() {
    let t = Arc::new(ScriptedTransport::new(vec![ok(&safe_body()), ok(&safe_body())]));
    let c = client(t.clone(), 0);

    c.check_prompt("  hi there ", Some("user-1")).await.unwrap();
    c.check_response_ctx("question", "answer", None).await.unwrap();

    let sent = t.requests();
    assert_eq!(sent[0].method, Method::Post);
    assert_eq!(sent[0].url, format!("{}/guardrails/input", BASE));
    assert_eq!(
        sent[0].body,
        Some(json!({"input": "hi there", "xxai_app_user_id": "user-1"}))
    );
    assert_eq!(sent[1].url, format!("{}/guardrails/output", BASE));
    assert_eq!(
        sent[1].body,
        Some(json!({"input": "question", "output": "answer"}))
    );
}

#[tokio::test]
async fn conversation_drops_blank_messages_in_order() {
    let t = Arc::new(ScriptedTransport::new(vec![ok(&safe_body())]));
    let c = client(t.clone(), 0);

    let messages = vec![
        Message::user("first"),
        Message::assistant("   "),
        Message::user("second"),
    ];
    c.check_conversation(&messages, &CheckOptions::new().user_id("u-7"))
        .await
        .unwrap();

    assert_eq!(
        t.requests()[0].body,
        Some(json!({
            "model": "Xiangxin-Guardrails-Text",
            "messages": [
                {"role": "user", "content": "first"},
                {"role": "user", "content": "second"}
            ],
            "extra_body": {"xxai_app_user_id": "u-7"}
        }))
    );
}

#[tokio::test]
async fn all_blank_conversation_makes_no_request() {
    let t = Arc::new(ScriptedTransport::new(vec![]));
    let c = client(t.clone(), 0);

    let resp = c
        .check_conversation(&[Message::user(""), Message::assistant(" ")], &CheckOptions::new())
        .await
        .unwrap();
    assert_eq!(resp.id, "guardrails-safe-default");
    assert!(t.requests().is_empty());
}

#[tokio::test]
async fn malformed_conversation_rejected_before_network() {
    let t = Arc::new(ScriptedTransport::new(vec![]));
    let c = client(t.clone(), 0);

    let cases = vec![
        vec![json!({"role": "user"})],
        vec![json!({"content": "x"})],
        vec![json!("plain string")],
        vec![json!({"role": "moderator", "content": "x"})],
    ];
    for messages in cases {
        let err = c
            .check_conversation_json(&messages, &CheckOptions::new())
            .await
            .unwrap_err();
        assert!(err.is_validation(), "{:?}", messages);
    }
    let err = c
        .check_conversation(&[], &CheckOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Messages cannot be empty");
    assert!(t.requests().is_empty());
}

#[tokio::test]
async fn empty_image_list_does_no_io() {
    let t = Arc::new(ScriptedTransport::new(vec![]));
    let c = client(t.clone(), 0);

    let none: [&str; 0] = [];
    let err = c
        .check_prompt_images("prompt", &none, &CheckOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.message(), "Images list cannot be empty");

    let err = c
        .check_prompt_image("prompt", "", &CheckOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Image path cannot be empty");

    assert!(t.requests().is_empty());
    assert!(t.fetches().is_empty());
}

#[tokio::test]
async fn missing_local_image_names_the_path() {
    let t = Arc::new(ScriptedTransport::new(vec![]));
    let c = client(t.clone(), 0);

    let err = c
        .check_prompt_image("", "/no/such/dir/cat.jpg", &CheckOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(err.message().contains("/no/such/dir/cat.jpg"));
    assert!(t.requests().is_empty());
}

#[tokio::test]
async fn remote_fetch_failure_is_generic_error() {
    let url = "https://cdn.example.com/gone.png";
    let t = Arc::new(ScriptedTransport::new(vec![]).with_broken_image(url, "404 Not Found"));
    let c = client(t.clone(), 0);

    let err = c
        .check_prompt_image("look", url, &CheckOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(
        err.message(),
        "Failed to encode image https://cdn.example.com/gone.png: 404 Not Found"
    );
    assert_eq!(err.message().matches(url).count(), 1);
    assert!(t.requests().is_empty());
}

#[tokio::test]
async fn images_are_inlined_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("local.jpg");
    std::fs::write(&local, b"local-bytes").unwrap();
    let remote = "https://cdn.example.com/remote.jpg";

    let t = Arc::new(
        ScriptedTransport::new(vec![ok(&safe_body())]).with_image(remote, b"remote-bytes"),
    );
    let c = client(t.clone(), 0);

    let images = vec![local.to_str().unwrap().to_string(), remote.to_string()];
    c.check_prompt_images("  describe  ", &images, &CheckOptions::new())
        .await
        .unwrap();

    assert_eq!(t.fetches(), vec![remote.to_string()]);
    assert_eq!(
        t.requests()[0].body,
        Some(json!({
            "model": "Xiangxin-Guardrails-VL",
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": "describe"},
                    {"type": "image_url", "image_url": {"url": encode_data_uri(b"local-bytes")}},
                    {"type": "image_url", "image_url": {"url": encode_data_uri(b"remote-bytes")}}
                ]
            }]
        }))
    );
}

#[tokio::test]
async fn wrong_shape_success_body_is_not_retried() {
    let t = Arc::new(ScriptedTransport::new(vec![ok(&json!({"id": "x"}))]));
    let c = client(t.clone(), 3);

    let err = c.check_prompt("hello", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.context().endpoint.as_deref(), Some("/guardrails/input"));
    assert_eq!(t.requests().len(), 1);
}

#[tokio::test]
async fn legacy_revision_decodes_localized_values() {
    let t = Arc::new(ScriptedTransport::new(vec![ok(&legacy_body())]));
    let c = GuardrailClientBuilder::new()
        .api_key(API_KEY)
        .base_url(BASE)
        .protocol_revision(ProtocolRevision::Legacy)
        .build_with_transport(t.clone())
        .unwrap();

    let resp = c.check_prompt("something", None).await.unwrap();
    assert_eq!(resp.overall_risk_level, RiskLevel::MediumRisk);
    assert_eq!(resp.suggest_action, SuggestAction::Replace);
    assert_eq!(resp.score, None);
    assert!(resp.has_substitute());
}

#[tokio::test]
async fn health_and_models_are_raw() {
    let t = Arc::new(ScriptedTransport::new(vec![
        ok(&json!({"status": "healthy"})),
        ok(&json!({"data": [{"id": "Xiangxin-Guardrails-Text"}]})),
    ]));
    let c = client(t.clone(), 0);

    assert_eq!(c.health_check().await.unwrap()["status"], "healthy");
    assert_eq!(
        c.get_models().await.unwrap()["data"][0]["id"],
        "Xiangxin-Guardrails-Text"
    );
    let sent = t.requests();
    assert_eq!(sent[0].method, Method::Get);
    assert_eq!(sent[0].body, None);
    assert_eq!(sent[1].url, format!("{}/guardrails/models", BASE));
}

#[tokio::test]
async fn closed_client_rejects_calls_and_close_is_idempotent() {
    let t = Arc::new(ScriptedTransport::new(vec![]));
    let c = client(t.clone(), 0);

    assert!(!c.is_closed());
    c.close();
    c.close();
    assert!(c.is_closed());

    let err = c.check_prompt("hello", None).await.unwrap_err();
    assert_eq!(err.message(), "Client session is closed");
    assert!(t.requests().is_empty());
}

#[tokio::test]
async fn closed_client_still_short_circuits_blank_input() {
    let t = Arc::new(ScriptedTransport::new(vec![]));
    let c = client(t.clone(), 0);
    c.close();

    let resp = c.check_prompt("   ", None).await.unwrap();
    assert_eq!(resp.id, "guardrails-safe-default");
    let resp = c.check_response_ctx("", "\n", Some("u")).await.unwrap();
    assert_eq!(resp.id, "guardrails-safe-default");
    let resp = c
        .check_conversation(&[Message::user(" "), Message::assistant("")], &CheckOptions::new())
        .await
        .unwrap();
    assert_eq!(resp, xiangxinai::GuardrailResponse::safe_default());

    let err = c.get_models().await.unwrap_err();
    assert_eq!(err.message(), "Client session is closed");
    assert!(t.requests().is_empty());
}

#[test]
fn blocking_client_shares_the_schedule() {
    let t = Arc::new(ScriptedTransport::new(vec![
        status(429, ""),
        timeout(),
        ok(&blocked_body()),
    ]));
    let c = GuardrailClientBuilder::new()
        .api_key(API_KEY)
        .base_url(BASE)
        .build_blocking_with_transport(t.clone())
        .unwrap();

    let resp = c.check_prompt("bad things", None).unwrap();
    assert!(resp.is_blocked());
    assert_eq!(
        t.pauses(),
        vec![Duration::from_secs(2), Duration::from_secs(1)]
    );
}

#[test]
fn blocking_client_short_circuits_blank_input() {
    let t = Arc::new(ScriptedTransport::new(vec![]));
    let c = GuardrailClientBuilder::new()
        .api_key(API_KEY)
        .build_blocking_with_transport(t.clone())
        .unwrap();

    let resp = c.check_prompt("  ", None).unwrap();
    assert_eq!(resp.id, "guardrails-safe-default");
    assert!(t.requests().is_empty());
}

#[test]
fn closed_blocking_client_still_short_circuits_blank_input() {
    let t = Arc::new(ScriptedTransport::new(vec![]));
    let c = GuardrailClientBuilder::new()
        .api_key(API_KEY)
        .build_blocking_with_transport(t.clone())
        .unwrap();
    c.close();

    assert_eq!(c.check_prompt("\t", None).unwrap().id, "guardrails-safe-default");
    assert_eq!(
        c.check_response_ctx(" ", " ", None).unwrap().id,
        "guardrails-safe-default"
    );
    let blank = vec![json!({"role": "user", "content": "  "})];
    let resp = c.check_conversation_json(&blank, &CheckOptions::new()).unwrap();
    assert_eq!(resp.id, "guardrails-safe-default");

    let err = c.check_prompt("hello", None).unwrap_err();
    assert_eq!(err.message(), "Client session is closed");
    assert!(t.requests().is_empty());
}
