//! Round trips against the live mock server.
//!
//! # Design
//! Each test starts the stub on a random port in a background thread, then
//! drives `Client::execute` over real HTTP. The stub's request log is used
//! to assert on the exact wire traffic: header presence, credential value,
//! and request body bytes.

use std::net::SocketAddr;
use std::sync::Arc;

use mock_server::{RecordedRequest, RequestLog};
use serde::Serialize;
use serde_json::{json, Value};
use validator::Validate;
use zeptomail_core::{ApiError, Client};

const TOKEN: &str = "Zoho-enczapikey ABC123";

/// Start the mock server on a random port and hand back its address plus
/// the request log it records into.
fn spawn_server() -> (SocketAddr, RequestLog) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let (router, log) = mock_server::app();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            axum::serve(listener, router).await
        })
        .unwrap();
    });

    (addr, log)
}

/// Agent configured the way the client expects: non-2xx statuses come back
/// as data, not transport errors.
fn agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

fn client_for(addr: SocketAddr) -> Client {
    let base = format!("http://{addr}");
    Client::new(agent(), TOKEN, Some(&base))
}

fn last_recorded(log: &RequestLog) -> RecordedRequest {
    log.blocking_read().last().cloned().expect("no request recorded")
}

#[test]
fn send_email_round_trip() {
    let (addr, log) = spawn_server();
    let client = client_for(addr);

    let payload = json!({"from": "a@x.com"});
    let out: Value = client
        .execute("POST", "/v1.1/email", Some(&payload))
        .unwrap();

    assert_eq!(
        out,
        json!({
            "data": [{"code": "EM_104", "message": "Email request received"}],
            "message": "OK",
        })
    );

    let seen = last_recorded(&log);
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.path, "/v1.1/email");
    assert_eq!(seen.header("authorization"), Some(TOKEN));
    assert_eq!(seen.header("content-type"), Some("application/json"));
    // Body bytes on the wire equal the JSON encoding of the payload.
    assert_eq!(
        seen.body.as_bytes(),
        serde_json::to_vec(&payload).unwrap().as_slice()
    );
}

#[test]
fn bodiless_request_goes_out_unauthenticated() {
    let (addr, log) = spawn_server();
    let client = client_for(addr);

    let out: Value = client
        .execute::<Value, _>("GET", "/v1.1/email/templates", None)
        .unwrap();
    assert_eq!(out, json!({"data": [], "message": "OK"}));

    // Without a body, neither the content-type nor the authorization header
    // is attached.
    let seen = last_recorded(&log);
    assert_eq!(seen.header("authorization"), None);
    assert_eq!(seen.header("content-type"), None);
}

#[test]
fn error_status_body_is_still_decoded() {
    let (addr, _log) = spawn_server();
    let client = client_for(addr);

    // A bodiless POST carries no authorization header, so the stub answers
    // 401 with a JSON error document. The client never looks at the status
    // code and decodes the document like any success.
    let out: Value = client.execute::<Value, _>("POST", "/v1.1/email", None).unwrap();
    assert_eq!(
        out,
        json!({"error": {"code": "TM_4001", "message": "unauthorized"}})
    );
}

#[test]
fn unknown_path_decodes_the_404_body() {
    let (addr, log) = spawn_server();
    let client = client_for(addr);

    let out: Value = client
        .execute::<Value, _>("GET", "/v2/does-not-exist", None)
        .unwrap();
    assert_eq!(
        out,
        json!({"error": {"code": "TM_3301", "message": "invalid api request url"}})
    );
    assert_eq!(last_recorded(&log).path, "/v2/does-not-exist");
}

#[test]
fn malformed_response_body_is_a_decode_error() {
    let (addr, _log) = spawn_server();
    let client = client_for(addr);

    let err = client
        .execute::<Value, Value>("GET", "/broken", None)
        .unwrap_err();
    assert!(matches!(err, ApiError::DeserializationError(_)));
}

#[test]
fn closed_port_is_a_transport_error() {
    // Bind and immediately drop a listener so the port is known to be
    // closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr);
    let err = client
        .execute::<Value, Value>("GET", "/v1.1/email/templates", None)
        .unwrap_err();
    assert!(matches!(err, ApiError::TransportError(_)));
}

#[test]
fn validated_payload_round_trips() {
    #[derive(Serialize, Validate)]
    struct SendMailRequest {
        #[validate(email)]
        from: String,
    }

    let (addr, log) = spawn_server();
    let client = client_for(addr);

    let payload = SendMailRequest {
        from: "a@x.com".to_string(),
    };
    let out: Value = client
        .execute_validated("POST", "/v1.1/email", &payload)
        .unwrap();
    assert_eq!(out["message"], "OK");
    assert_eq!(last_recorded(&log).header("authorization"), Some(TOKEN));
}

#[test]
fn shared_client_serves_concurrent_calls() {
    let (addr, log) = spawn_server();
    let client = Arc::new(client_for(addr));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = Arc::clone(&client);
            std::thread::spawn(move || {
                let out: Value = client
                    .execute::<Value, _>("GET", "/v1.1/email/templates", None)
                    .unwrap();
                assert_eq!(out["message"], "OK");
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(log.blocking_read().len(), 4);
}
