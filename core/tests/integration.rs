//! Dispatcher round-trips against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port and drives the dispatcher with
//! the real `UreqTransport`. The server listens on loopback, which the
//! connector refuses to target, so these tests build `Settings` directly
//! instead of going through `Connector::initialize`.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use http_connector::{
    ActionKind, Auth, Call, Connector, ConnectorConfig, ConfigError, Dispatcher, HttpMethod,
    ParsedBody, Settings, UreqTransport,
};
use serde_json::json;

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

/// Accept a single connection and hand it to `handle` on its own thread.
fn serve_once(handle: impl FnOnce(TcpStream) + Send + 'static) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            handle(stream);
        }
    });
    addr
}

fn read_request_head(stream: &mut TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
}

fn dispatcher(addr: SocketAddr, auth: Auth) -> Dispatcher<UreqTransport> {
    let settings = Settings {
        timeout: Some(Duration::from_secs(10)),
        auth,
        ..Settings::new(format!("http://{addr}"))
    };
    Dispatcher::new(settings, UreqTransport)
}

fn get(dispatcher: &Dispatcher<UreqTransport>, path: &str) -> http_connector::ActionResult {
    dispatcher.dispatch(ActionKind::Http(HttpMethod::Get), &Call::new(HttpMethod::Get, path))
}

#[test]
fn loopback_server_cannot_be_configured() {
    let addr = start_server();
    let err = Connector::initialize(&ConnectorConfig::new(format!("http://{addr}")), json!({}))
        .unwrap_err();
    assert!(matches!(err, ConfigError::LoopbackTarget));
}

#[test]
fn content_types_over_the_wire() {
    let addr = start_server();
    let d = dispatcher(addr, Auth::None);

    // JSON success: parsed value doubles as the response body.
    let result = get(&d, "/json/ok");
    assert!(result.is_success(), "{:?}", result.message);
    assert_eq!(result.data[0].parsed_response_body, Some(ParsedBody::Json(json!({"ok": true}))));
    assert_eq!(result.data[0].response_body, json!({"ok": true}));
    assert_eq!(result.summary.status_code, Some(200));
    assert_eq!(result.summary.reason.as_deref(), Some("OK"));

    // JSON error: nested message is surfaced.
    let result = get(&d, "/json/error");
    assert!(!result.is_success());
    assert!(result.message.as_deref().unwrap().contains("bad token"));
    assert_eq!(result.summary.status_code, Some(500));

    // XML success.
    let result = get(&d, "/xml");
    assert!(result.is_success());
    assert_eq!(
        result.data[0].parsed_response_body,
        Some(ParsedBody::Xml(json!({"inventory": {"@region": "eu", "item": ["bolt", "nut"]}})))
    );
    assert!(result.data[0].response_body.as_str().unwrap().starts_with("<?xml"));

    // HTML error page.
    let result = get(&d, "/html/missing");
    assert!(!result.is_success());
    assert_eq!(
        result.message.as_deref(),
        Some("Status Code: 404. Data from server:\nNot Found\n")
    );

    // Plain text error.
    let result = get(&d, "/text/maintenance");
    assert_eq!(
        result.message.as_deref(),
        Some("Can't process response from server. Status Code: 503 Data from server: down for {{maintenance}}")
    );

    // Empty body.
    let result = get(&d, "/empty");
    assert!(result.is_success());
    assert_eq!(result.data[0].parsed_response_body, None);
}

#[test]
fn status_boundaries_over_the_wire() {
    let addr = start_server();
    let d = dispatcher(addr, Auth::None);

    for (code, success) in [(200, true), (204, true), (400, false), (404, false), (503, false)] {
        let result = get(&d, &format!("/status/{code}"));
        assert_eq!(result.is_success(), success, "status {code}");
        assert_eq!(result.summary.status_code, Some(code));
    }
}

#[test]
fn verbs_headers_and_body_reach_the_server() {
    let addr = start_server();
    let d = dispatcher(addr, Auth::None);

    for method in [HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch, HttpMethod::Delete] {
        let mut call = Call::new(method, "/echo");
        call.headers.push(("x-request-id".to_string(), "42".to_string()));
        call.body = Some("payload".to_string());

        let result = d.dispatch(ActionKind::Http(method), &call);
        assert!(result.is_success(), "{method}: {:?}", result.message);
        let echo = &result.data[0].response_body;
        assert_eq!(echo["method"], method.as_str());
        assert_eq!(echo["headers"]["x-request-id"], "42");
        assert_eq!(echo["body"], "payload");
        assert_eq!(result.data[0].method, method.as_str());
    }
}

#[test]
fn token_auth_respects_caller_header() {
    let addr = start_server();
    let auth = Auth::Token {
        header: "ph-auth-token".to_string(),
        value: "secret".to_string(),
    };
    let d = dispatcher(addr, auth);

    let result = get(&d, "/echo");
    assert_eq!(result.data[0].response_body["headers"]["ph-auth-token"], "secret");

    let mut call = Call::new(HttpMethod::Get, "/echo");
    call.headers.push(("ph-auth-token".to_string(), "caller".to_string()));
    let result = d.dispatch(ActionKind::Http(HttpMethod::Get), &call);
    assert_eq!(result.data[0].response_body["headers"]["ph-auth-token"], "caller");
}

#[test]
fn basic_auth_is_sent() {
    let addr = start_server();
    let auth = Auth::Basic {
        username: "user".to_string(),
        password: "pass".to_string(),
    };
    let result = get(&dispatcher(addr, auth), "/echo");
    assert_eq!(
        result.data[0].response_body["headers"]["authorization"],
        "Basic dXNlcjpwYXNz"
    );
}

#[test]
fn head_with_ok_status_is_plain_success() {
    let addr = start_server();
    let d = dispatcher(addr, Auth::None);
    let result = d.dispatch(ActionKind::Http(HttpMethod::Head), &Call::new(HttpMethod::Head, "/echo"));
    assert!(result.is_success());
    assert!(result.data.is_empty());
}

#[test]
fn refused_connection_is_a_transport_failure() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let d = dispatcher(addr, Auth::None);

    let result = get(&d, "/anything");
    assert!(!result.is_success());
    let message = result.message.unwrap();
    assert!(message.starts_with("Error Connecting to server."), "{message}");
    assert!(result.data.is_empty());
}

#[test]
fn body_larger_than_ten_mebibytes_is_classified() {
    let size = 11 * 1024 * 1024;
    let addr = serve_once(move |mut stream| {
        read_request_head(&mut stream);
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {size}\r\nConnection: close\r\n\r\n"
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(&vec![b'a'; size]);
    });

    let result = get(&dispatcher(addr, Auth::None), "/large");
    assert!(result.is_success(), "{:?}", result.message);
    assert_eq!(result.summary.status_code, Some(200));
    assert_eq!(result.data.len(), 1);
    assert_eq!(result.data[0].response_body.as_str().map(str::len), Some(size));
}

#[test]
fn stalled_server_times_out_as_transport_failure() {
    let addr = serve_once(|mut stream| {
        read_request_head(&mut stream);
        // Hold the connection open without answering.
        std::thread::sleep(Duration::from_secs(5));
        drop(stream);
    });
    let settings = Settings {
        timeout: Some(Duration::from_secs(1)),
        ..Settings::new(format!("http://{addr}"))
    };
    let d = Dispatcher::new(settings, UreqTransport);

    let result = get(&d, "/slow");
    assert!(!result.is_success());
    let message = result.message.unwrap();
    assert!(message.starts_with("Error Connecting to server."), "{message}");
    assert!(result.data.is_empty());
    assert_eq!(result.summary.status_code, None);
}
