//! End-to-end forwarding through the relay to mock tablets.

mod common;

use std::time::Duration;

use common::{
    client, closed_port, server_config, start_mock_backend, start_programmable_backend,
    start_relay, start_silent_backend, MockResponse,
};
use serde_json::{json, Value};

async fn register(relay: std::net::SocketAddr, ip: &str) {
    let response = client()
        .post(format!("http://{}/api/register", relay))
        .json(&json!({ "payload": { "ip": ip } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn binary_payload_round_trips_through_master() {
    let upstream_body: Vec<u8> = (0..=255u8).collect();
    let reply = upstream_body.clone();
    let (backend, mut requests) = start_programmable_backend(move |_| {
        let reply = reply.clone();
        async move {
            MockResponse::new(201, reply)
                .header("content-type", "application/octet-stream")
                .header("content-encoding", "gzip")
                .header("x-upstream", "yes")
        }
    })
    .await;

    let (relay, shutdown) = start_relay(server_config()).await;
    register(relay, &backend.to_string()).await;

    let request_body: Vec<u8> = (0..=255u8).rev().collect();
    let response = client()
        .post(format!(
            "http://{}/api/proxy/upload/file?name=a&name=b&x=1",
            relay
        ))
        .header("send-to", "master")
        .header("sender", "tablet-3")
        .header("x-custom", "abc")
        .header("content-type", "application/octet-stream")
        .body(request_body.clone())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    assert_eq!(response.headers().get("x-upstream").unwrap(), "yes");
    assert!(response.headers().get("content-encoding").is_none());
    assert_eq!(response.bytes().await.unwrap().to_vec(), upstream_body);

    let seen = requests.recv().await.unwrap();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.target, "/upload/file?name=a&name=b&x=1");
    assert_eq!(seen.body, request_body);
    assert_eq!(seen.header("x-custom"), Some("abc"));
    assert_eq!(seen.header("content-type"), Some("application/octet-stream"));
    assert_eq!(seen.header("host"), Some(backend.to_string().as_str()));
    assert!(seen.header("send-to").is_none());
    assert!(seen.header("sender").is_none());

    // Everything upstream saw was sent by the client or is framing.
    let client_sent = ["x-custom", "content-type", "accept", "host", "content-length"];
    for (name, _) in &seen.headers {
        assert!(
            client_sent.contains(&name.as_str()),
            "upstream saw header {name:?} the client never sent"
        );
    }

    shutdown.trigger();
}

#[tokio::test]
async fn caller_request_id_is_forwarded() {
    let (backend, mut requests) =
        start_programmable_backend(|_| async { MockResponse::new(200, "ok") }).await;
    let (relay, shutdown) = start_relay(server_config()).await;

    let response = client()
        .get(format!("http://{}/api/proxy/ping", relay))
        .header("send-to", backend.to_string())
        .header("x-request-id", "tablet-7-req-1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "tablet-7-req-1");

    let seen = requests.recv().await.unwrap();
    assert_eq!(seen.header("x-request-id"), Some("tablet-7-req-1"));

    shutdown.trigger();
}

#[tokio::test]
async fn generated_request_id_stays_local() {
    let (backend, mut requests) =
        start_programmable_backend(|_| async { MockResponse::new(200, "ok") }).await;
    let (relay, shutdown) = start_relay(server_config()).await;

    let response = client()
        .get(format!("http://{}/api/proxy/ping", relay))
        .header("send-to", backend.to_string())
        .header("x-custom", "v")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().get("x-request-id").is_some());

    let seen = requests.recv().await.unwrap();
    assert_eq!(seen.header("x-custom"), Some("v"));
    assert!(seen.header("x-request-id").is_none());

    shutdown.trigger();
}

#[tokio::test]
async fn get_is_forwarded_without_body() {
    let (backend, mut requests) =
        start_programmable_backend(|_| async { MockResponse::new(200, "ok") }).await;
    let (relay, shutdown) = start_relay(server_config()).await;
    register(relay, &backend.to_string()).await;

    let response = client()
        .get(format!("http://{}/api/proxy", relay))
        .header("send-to", "master")
        .body("ignored")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let seen = requests.recv().await.unwrap();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.target, "/");
    assert!(seen.body.is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn upstream_error_status_is_passed_through() {
    let (backend, _requests) = start_programmable_backend(|_| async {
        MockResponse::new(418, r#"{"teapot":true}"#).header("content-type", "application/json")
    })
    .await;
    let (relay, shutdown) = start_relay(server_config()).await;
    register(relay, &backend.to_string()).await;

    let response = client()
        .delete(format!("http://{}/api/proxy/items/7", relay))
        .header("send-to", "master")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 418);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "teapot": true }));

    shutdown.trigger();
}

#[tokio::test]
async fn direct_address_bypasses_registry() {
    let backend = start_mock_backend("direct").await;
    let (relay, shutdown) = start_relay(server_config()).await;

    let response = client()
        .get(format!("http://{}/api/proxy/status", relay))
        .header("send-to", backend.to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "direct");

    shutdown.trigger();
}

#[tokio::test]
async fn unregistered_master_is_404() {
    let (relay, shutdown) = start_relay(server_config()).await;

    let response = client()
        .get(format!("http://{}/api/proxy/status", relay))
        .header("send-to", "master")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Master tablet IP not registered" }));

    shutdown.trigger();
}

#[tokio::test]
async fn missing_target_header_is_404() {
    let (relay, shutdown) = start_relay(server_config()).await;

    let response = client()
        .post(format!("http://{}/api/proxy/status", relay))
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Empty target IP (send-to)" }));

    shutdown.trigger();
}

#[tokio::test]
async fn unreachable_master_is_503_and_stays_registered() {
    let dead = closed_port().await;
    let (relay, shutdown) = start_relay(server_config()).await;
    register(relay, &dead.to_string()).await;
    let client = client();

    let response = client
        .get(format!("http://{}/api/proxy/status", relay))
        .header("send-to", "master")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 503);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Target unavailable");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    let status: Value = client
        .get(format!("http://{}/api/master-tablet/register", relay))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status, json!({ "isRegistered": true }));

    shutdown.trigger();
}

#[tokio::test]
async fn silent_target_times_out_with_503() {
    let backend = start_silent_backend().await;
    let mut config = server_config();
    config.proxy.timeout_secs = 1;
    let (relay, shutdown) = start_relay(config).await;

    let response = tokio::time::timeout(
        Duration::from_secs(10),
        client()
            .get(format!("http://{}/api/proxy/slow", relay))
            .header("send-to", backend.to_string())
            .send(),
    )
    .await
    .expect("relay should answer before the test deadline")
    .unwrap();

    assert_eq!(response.status(), 503);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "timeout of 1000ms exceeded");

    shutdown.trigger();
}

#[tokio::test]
async fn malformed_target_is_500() {
    let (relay, shutdown) = start_relay(server_config()).await;

    let response = client()
        .get(format!("http://{}/api/proxy/status", relay))
        .header("send-to", "bad host")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    shutdown.trigger();
}

#[tokio::test]
async fn concurrent_requests_all_complete() {
    let (backend, _requests) = start_programmable_backend(|request| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        MockResponse::new(200, request.target)
    })
    .await;
    let (relay, shutdown) = start_relay(server_config()).await;
    register(relay, &backend.to_string()).await;

    let client = client();
    let mut handles = Vec::new();
    for i in 0..16 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .get(format!("http://{}/api/proxy/item/{}", relay, i))
                .header("send-to", "master")
                .send()
                .await
                .unwrap()
                .text()
                .await
                .unwrap()
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), format!("/item/{}", i));
    }

    shutdown.trigger();
}
