//! End-to-end pipeline tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every verb through
//! `UreqTransport` over real HTTP. The `/echo` route reports what arrived on
//! the wire, so header merging and body encoding are checked on the server
//! side rather than on the built request.

use std::net::SocketAddr;

use api_client_core::{options, ApiClient, ApiError, ClientConfig, ErrorKind, Overrides};
use serde_json::{json, Value};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client_for(addr: SocketAddr) -> ApiClient {
    let config = ClientConfig::new(&format!("http://{addr}/")).with_option(options::TIMEOUT, "10");
    ApiClient::new(config)
}

#[test]
fn get_decodes_post() {
    let client = client_for(start_server());

    let post = client.get("/posts/1", &[], &Overrides::new()).unwrap();
    assert_eq!(post["id"], 1);
    assert_eq!(post["title"], "sunt aut facere");
}

#[test]
fn get_with_query_filters() {
    let client = client_for(start_server());

    let posts = client.get("posts", &[("userId", "1")], &Overrides::new()).unwrap();
    assert_eq!(posts.as_array().map(Vec::len), Some(2));

    let posts = client.get("posts", &[("userId", "42")], &Overrides::new()).unwrap();
    assert_eq!(posts, json!([]));
}

#[test]
fn post_put_delete_lifecycle() {
    let client = client_for(start_server());

    // create: the server echoes the input plus an id
    let input = json!({"title": "t", "body": "b", "userId": 1});
    let created = client.post("/posts", Some(&input), &Overrides::new()).unwrap();
    let mut expected = input.clone();
    expected["id"] = json!(101);
    assert_eq!(created, expected);

    // update
    let update = json!({"title": "Titre mis à jour", "body": "modifié", "userId": 1});
    let updated = client.put("/posts/101", Some(&update), &Overrides::new()).unwrap();
    assert_eq!(updated["title"], "Titre mis à jour");
    assert_eq!(updated["id"], 101);

    let fetched = client.get("/posts/101", &[], &Overrides::new()).unwrap();
    assert_eq!(fetched["body"], "modifié");

    // delete returns an empty object
    let deleted = client.delete("/posts/101", &Overrides::new()).unwrap();
    assert_eq!(deleted, json!({}));

    // gone
    let err = client.get("/posts/101", &[], &Overrides::new()).unwrap_err();
    match err {
        ApiError::HttpStatus { status, message, .. } => {
            assert_eq!(status, 404);
            assert_eq!(message, "post 101 not found");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[test]
fn status_errors_carry_code() {
    let client = client_for(start_server());

    for code in [400u16, 404, 418, 500, 503] {
        let err = client
            .get(&format!("/status/{code}"), &[], &Overrides::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HttpStatus, "{code}");
        assert_eq!(err.status(), Some(code));
    }
}

#[test]
fn json_body_sends_single_content_type() {
    let client = client_for(start_server());

    let echoed = client.post("/echo", Some(&json!({"x": 1})), &Overrides::new()).unwrap();
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["headers"]["content-type"], "application/json");
    assert_eq!(echoed["body"], r#"{"x":1}"#);
}

#[test]
fn form_body_is_urlencoded() {
    let client = client_for(start_server());

    let overrides = Overrides::new().header("Content-Type", "application/x-www-form-urlencoded");
    let echoed = client
        .put("/echo", Some(&json!({"x": 1})), &overrides)
        .unwrap();
    assert_eq!(echoed["method"], "PUT");
    assert_eq!(echoed["headers"]["content-type"], "application/x-www-form-urlencoded");
    assert_eq!(echoed["body"], "x=1");
}

#[test]
fn per_call_headers_override_defaults() {
    let addr = start_server();
    let config = ClientConfig::new(&format!("http://{addr}"))
        .with_header("X-Api-Key", "default")
        .with_header("X-Tenant", "acme");
    let client = ApiClient::new(config);

    let echoed = client
        .delete("/echo", &Overrides::new().header("x-api-key", "per-call"))
        .unwrap();
    assert_eq!(echoed["method"], "DELETE");
    assert_eq!(echoed["headers"]["x-api-key"], "per-call");
    assert_eq!(echoed["headers"]["x-tenant"], "acme");
    assert_eq!(echoed["body"], "");
}

#[test]
fn query_string_arrives_encoded() {
    let client = client_for(start_server());

    let echoed = client
        .get("/echo", &[("q", "a b&c"), ("lang", "fr")], &Overrides::new())
        .unwrap();
    assert_eq!(echoed["query"], "q=a+b%26c&lang=fr");
}

#[test]
fn user_agent_option_reaches_server() {
    let client = client_for(start_server());

    let echoed = client
        .get("/echo", &[], &Overrides::new().option(options::USER_AGENT, "api-client-test/1.0"))
        .unwrap();
    assert_eq!(echoed["headers"]["user-agent"], "api-client-test/1.0");
}

#[test]
fn empty_success_body_is_null() {
    let client = client_for(start_server());
    assert_eq!(client.get("/empty", &[], &Overrides::new()).unwrap(), Value::Null);
}

#[test]
fn body_over_ten_mib_is_read_whole() {
    let client = client_for(start_server());

    let large = client.get("/large", &[], &Overrides::new()).unwrap();
    assert_eq!(large.as_str().map(str::len), Some(mock_server::LARGE_BODY_LEN));
}

#[test]
fn redirects_are_not_followed_by_default() {
    let client = client_for(start_server());
    assert_eq!(client.get("/redirect", &[], &Overrides::new()).unwrap(), Value::Null);
}

#[test]
fn max_redirects_option_follows_location() {
    let client = client_for(start_server());

    let overrides = Overrides::new().option(options::MAX_REDIRECTS, "5");
    let post = client.get("/redirect", &[], &overrides).unwrap();
    assert_eq!(post["id"], 1);
}

#[test]
fn non_json_success_body_is_decode_error() {
    let client = client_for(start_server());

    let err = client.get("/text", &[], &Overrides::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn connection_refused_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = client_for(addr);

    let err = client.get("/posts/1", &[], &Overrides::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), None);
}

#[test]
fn missing_ca_bundle_is_transport_error() {
    let client = client_for(start_server());

    let overrides = Overrides::new().option(options::CA_BUNDLE, "/nonexistent/WE1.crt");
    let err = client.get("/posts/1", &[], &overrides).unwrap_err();
    assert!(matches!(err, ApiError::Transport(ref msg) if msg.contains("WE1.crt")));
}

#[test]
fn concurrent_calls_share_one_client() {
    let client = client_for(start_server());

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let client = &client;
                s.spawn(move || {
                    let id = if i % 2 == 0 { "1" } else { "2" };
                    client.get(&format!("/posts/{id}"), &[], &Overrides::new())
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let post = handle.join().unwrap().unwrap();
            assert_eq!(post["id"], if i % 2 == 0 { 1 } else { 2 });
        }
    });
}
