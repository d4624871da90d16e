//! Client tests against a mock memory server

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{any, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn create_test_client(base_url: &str) -> RemoteMemoryClient {
    let http = Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to create HTTP client");
    ClientConfig::new("test-api-key")
        .with_base_url(base_url)
        .with_http_client(http)
        .build()
        .expect("Failed to create client")
}

fn memory_json(id: &str, text: &str) -> serde_json::Value {
    json!({
        "id": id,
        "memory": text,
        "user_id": "alex",
        "hash": "5f1c",
        "metadata": {"source": "test", "turn": 1},
        "created_at": "2024-07-20T01:02:03-07:00",
        "updated_at": "2024-07-20T01:02:03-07:00"
    })
}

/// Shared buffer the test subscriber formats events into
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_debug_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}

async fn assert_no_requests(server: &MockServer) {
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty(), "expected no requests, got {}", received.len());
}

#[tokio::test]
async fn test_store_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/memories/"))
        .and(header("Authorization", "Token test-api-key"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(memory_json("m1", "Is vegetarian")))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let request = StoreRequest::for_user("alex", vec![Message::user("I'm a vegetarian")]);

    let memory = client.store(&CallContext::background(), request).await.unwrap();
    assert_eq!(memory.id, "m1");
    assert_eq!(memory.text(), "Is vegetarian");
    assert!(memory.created_at_utc().is_some());
}

#[tokio::test]
async fn test_store_copies_owner_into_metadata() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/memories/"))
        .and(body_partial_json(json!({
            "user_id": "alex",
            "metadata": {"user_id": "alex", "source": "test_client"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(memory_json("m1", "x")))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let mut metadata = Metadata::new();
    metadata.insert("source".to_string(), json!("test_client"));
    let request = StoreRequest {
        metadata: Some(metadata),
        ..StoreRequest::for_user("alex", vec![Message::user("hello")])
    };

    client.store(&CallContext::background(), request).await.unwrap();
}

#[tokio::test]
async fn test_store_without_owner_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let request = StoreRequest {
        messages: vec![Message::user("hello")],
        ..Default::default()
    };

    let err = client.store(&CallContext::background(), request).await.unwrap_err();
    assert!(err.is_validation());
    assert_no_requests(&server).await;
}

#[tokio::test]
async fn test_store_without_messages_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let request = StoreRequest::for_user("alex", Vec::new());

    let err = client.store(&CallContext::background(), request).await.unwrap_err();
    assert!(err.is_validation());
    assert_no_requests(&server).await;
}

#[tokio::test]
async fn test_store_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/memories/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "bad request", "code": "E1"})),
        )
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let request = StoreRequest::for_user("alex", vec![Message::user("hello")]);

    let err = client.store(&CallContext::background(), request).await.unwrap_err();
    assert!(matches!(err, MemoryError::Api(_)));
    let msg = err.to_string();
    assert!(msg.contains("bad request"));
    assert!(msg.contains("E1"));
}

#[tokio::test]
async fn test_store_raw_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let request = StoreRequest::for_user("alex", vec![Message::user("hello")]);

    let err = client.store(&CallContext::background(), request).await.unwrap_err();
    match err {
        MemoryError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "service unavailable");
        }
        other => panic!("expected raw status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_store_non_ok_success_status_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/memories/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(memory_json("m1", "Is vegetarian")))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let request = StoreRequest::for_user("alex", vec![Message::user("I'm a vegetarian")]);

    let err = client.store(&CallContext::background(), request).await.unwrap_err();
    match err {
        MemoryError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 201);
            assert!(body.contains("m1"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_no_content_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let err = client
        .list(&CallContext::background(), &GetOptions::for_user("alex"))
        .await
        .unwrap_err();
    assert!(matches!(err, MemoryError::UnexpectedStatus { status: 204, .. }));
}

#[tokio::test]
async fn test_list_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/memories/"))
        .and(query_param("user_id", "alex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [memory_json("m1", "a"), memory_json("m2", "b")],
            "count": 2
        })))
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let entries = client
        .list(&CallContext::background(), &GetOptions::for_user("alex"))
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn test_list_empty_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/memories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [], "count": 0})))
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let entries = client
        .list(&CallContext::background(), &GetOptions::default())
        .await
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_list_bare_array_and_object() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("user_id", "array"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([memory_json("m1", "a")])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("user_id", "object"))
        .respond_with(ResponseTemplate::new(200).set_body_json(memory_json("m2", "b")))
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let ctx = CallContext::background();

    let entries = client.list(&ctx, &GetOptions::for_user("array")).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].memory.id, "m1");

    let entries = client.list(&ctx, &GetOptions::for_user("object")).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].memory.id, "m2");
}

#[tokio::test]
async fn test_list_unknown_shape_reports_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let err = client
        .list(&CallContext::background(), &GetOptions::default())
        .await
        .unwrap_err();
    match err {
        MemoryError::Decode { body, .. } => assert_eq!(body, "not json at all"),
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_sends_repeated_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/memories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let mut metadata = Metadata::new();
    metadata.insert("test_run".to_string(), json!("retrieval"));
    let options = GetOptions {
        user_id: Some("alex".to_string()),
        page: Some(1),
        page_size: Some(10),
        metadata: Some(metadata),
        categories: vec!["food".to_string(), "health".to_string()],
        ..Default::default()
    };

    client.list(&CallContext::background(), &options).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let pairs: Vec<(String, String)> = requests[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let categories: Vec<&str> = pairs
        .iter()
        .filter(|(k, _)| k == "categories")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(categories, vec!["food", "health"]);
    assert!(pairs.contains(&("metadata".to_string(), r#"{"test_run":"retrieval"}"#.to_string())));
    assert!(pairs.contains(&("page_size".to_string(), "10".to_string())));
}

#[tokio::test]
async fn test_search_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/memories/search/"))
        .and(body_partial_json(json!({"query": "hobbies", "top_k": 5, "rerank": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "m1", "memory": "Plays cricket", "score": 0.91},
            {"id": "m2", "memory": "Plays tennis", "score": 0.55}
        ])))
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let request = SearchRequest {
        top_k: Some(5),
        rerank: Some(true),
        ..SearchRequest::new("hobbies")
    };

    let results = client.search(&CallContext::background(), &request).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].memory.score, Some(0.91));
}

#[tokio::test]
async fn test_query_shorthand_sets_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/memories/search/"))
        .and(body_partial_json(json!({"query": "diet", "top_k": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let results = client.query(&CallContext::background(), "diet", 3).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_search_empty_query_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let err = client
        .search(&CallContext::background(), &SearchRequest::new(""))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_no_requests(&server).await;
}

#[tokio::test]
async fn test_update_success() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/memories/m1/"))
        .and(body_partial_json(json!({"text": "Likes to play tennis on weekends"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(memory_json("m1", "Likes to play tennis on weekends")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let memory = client
        .update(
            &CallContext::background(),
            "m1",
            &UpdateRequest::new("Likes to play tennis on weekends"),
        )
        .await
        .unwrap();
    assert_eq!(memory.text(), "Likes to play tennis on weekends");
}

#[tokio::test]
async fn test_update_validation() {
    let server = MockServer::start().await;
    let client = create_test_client(&server.uri());
    let ctx = CallContext::background();

    let err = client.update(&ctx, "m1", &UpdateRequest::new(" ")).await.unwrap_err();
    assert!(err.is_validation());

    let err = client.update(&ctx, "", &UpdateRequest::new("text")).await.unwrap_err();
    assert!(err.is_validation());

    assert_no_requests(&server).await;
}

#[tokio::test]
async fn test_update_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"detail": "Memory not found", "code": "not_found"})),
        )
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let err = client
        .update(&CallContext::background(), "missing", &UpdateRequest::new("x"))
        .await
        .unwrap_err();
    match err {
        MemoryError::Api(api) => {
            assert_eq!(api.status, 404);
            assert_eq!(api.detail.as_deref(), Some("Memory not found"));
        }
        other => panic!("expected api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_identity_headers_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("Mem0-Organization-ID", "org-1"))
        .and(header("Mem0-Project-ID", "proj-1"))
        .and(header("Mem0-User-ID", "alex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClientConfig::new("Token already-prefixed")
        .with_base_url(server.uri())
        .with_organization_id("org-1")
        .with_project_id("proj-1")
        .with_user_id("alex")
        .build()
        .unwrap();

    client
        .list(&CallContext::background(), &GetOptions::default())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("Authorization").unwrap();
    assert_eq!(auth.to_str().unwrap(), "Token already-prefixed");
}

#[tokio::test]
async fn test_identity_headers_can_be_disabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = ClientConfig::new("k")
        .with_base_url(server.uri())
        .with_organization_id("org-1")
        .with_user_id("alex")
        .with_header_toggles(HeaderToggles::none())
        .build()
        .unwrap();

    client
        .list(&CallContext::background(), &GetOptions::default())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("Mem0-User-ID").is_none());
    assert!(requests[0].headers.get("Mem0-Organization-ID").is_none());
    assert!(requests[0].headers.get("Authorization").is_some());
}

#[tokio::test]
async fn test_cancel_mid_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let ctx = CallContext::background();
    let token = ctx.cancellation_token().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client.list(&ctx, &GetOptions::default()),
    )
    .await
    .expect("call should not hang after cancellation");

    assert!(matches!(result, Err(MemoryError::Cancelled)));
}

#[tokio::test]
async fn test_context_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());
    let ctx = CallContext::with_timeout(Duration::from_millis(100));

    let err = client
        .search(&ctx, &SearchRequest::new("anything"))
        .await
        .unwrap_err();
    assert!(matches!(err, MemoryError::Timeout(_)));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Nothing listens on port 9 on a test host
    let client = create_test_client("http://127.0.0.1:9");
    let err = client
        .list(&CallContext::background(), &GetOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MemoryError::Transport(_)));
}

#[tokio::test]
async fn test_trait_object_dispatch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([memory_json("m1", "a")])))
        .mount(&server)
        .await;

    let api: Box<dyn MemoryApi> = Box::new(create_test_client(&server.uri()));
    let entries = api
        .list(&CallContext::background(), &GetOptions::default())
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_debug_logs_payload_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/memories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(memory_json("m1", "Is vegetarian")))
        .mount(&server)
        .await;

    let http = Client::builder().no_proxy().build().unwrap();
    let client = ClientConfig::new("test-api-key")
        .with_base_url(server.uri())
        .with_http_client(http)
        .with_debug(true)
        .build()
        .unwrap();

    let (logs, _guard) = capture_debug_logs();
    let request = StoreRequest::for_user("alex", vec![Message::user("I'm a vegetarian")]);
    let memory = client.store(&CallContext::background(), request).await.unwrap();
    assert_eq!(memory.id, "m1");

    let output = logs.contents();
    assert!(output.contains("mem0_client::wire"), "no wire events in:\n{}", output);
    assert!(output.contains("store request"));
    assert!(output.contains("I'm a vegetarian"));
    assert!(output.contains("response body"));
    assert!(output.contains("Is vegetarian"));
}

#[tokio::test]
async fn test_wire_logging_off_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(memory_json("m1", "Is vegetarian")))
        .mount(&server)
        .await;

    let client = create_test_client(&server.uri());

    let (logs, _guard) = capture_debug_logs();
    let request = StoreRequest::for_user("alex", vec![Message::user("I'm a vegetarian")]);
    client.store(&CallContext::background(), request).await.unwrap();

    assert!(!logs.contents().contains("mem0_client::wire"));
}
