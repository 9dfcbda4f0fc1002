use std::{
    cell::{Ref, RefCell},
    collections::VecDeque,
};

use insta::assert_snapshot;
use reqwest::{header::HeaderMap, Method, StatusCode};
use serde_json::{json, Value};
use svc_client::{locator, Client, ClientBuilder, Error, NoResolver, StaticResolver, Transport};

struct Sent {
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Option<Value>,
}

/// Answers requests with canned responses and remembers what was sent.
#[derive(Default)]
struct Recorder {
    responses: RefCell<VecDeque<(StatusCode, String)>>,
    sent: RefCell<Vec<Sent>>,
}

impl Recorder {
    fn answering(bodies: &[&str]) -> Self {
        let recorder = Self::default();
        for body in bodies {
            recorder.respond(StatusCode::OK, body);
        }
        recorder
    }

    fn respond(&self, status: StatusCode, body: &str) {
        self.responses
            .borrow_mut()
            .push_back((status, body.to_string()));
    }

    fn count(&self) -> usize {
        self.sent.borrow().len()
    }

    fn last(&self) -> Ref<'_, Sent> {
        Ref::map(self.sent.borrow(), |s| s.last().expect("Something was sent"))
    }
}

impl Transport for Recorder {
    fn send(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&Value>,
    ) -> anyhow::Result<(StatusCode, String)> {
        self.sent.borrow_mut().push(Sent {
            method,
            url: url.to_string(),
            headers: headers.clone(),
            body: body.cloned(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("No response queued for {url}"))
    }
}

fn test_client(transport: &Recorder) -> Client<&Recorder> {
    Client::new("http://some-service-url", &NoResolver, transport).unwrap()
}

#[test]
fn construct_with_login_connects() {
    let transport = Recorder::answering(&[include_str!("data/construct-with-login.json")]);
    let client = ClientBuilder::new("http://example.com/")
        .credentials("login", "password")
        .build(&NoResolver, &transport)
        .unwrap();

    assert_eq!(client.stored_login(), "login");
    assert_eq!(client.token(), "session id");

    let sent = transport.last();
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.url, "http://example.com/connect/");
    assert_eq!(
        sent.body,
        Some(json!({"login": "login", "password": "password"}))
    );
    assert!(sent.headers.is_empty());
}

#[test]
fn construct_with_login_and_invalid_session_id_fails() {
    let transport =
        Recorder::answering(&[include_str!("data/login-with-invalid-session-id.json")]);
    let e = ClientBuilder::new("http://example.com/")
        .credentials("login", "password")
        .build(&NoResolver, &transport)
        .err()
        .unwrap();
    assert!(matches!(e, Error::AuthenticationFailed { code: 0, .. }));
}

#[test]
fn construct_with_rejected_credentials_fails_with_service_error() {
    let transport = Recorder::answering(&[include_str!("data/connect-rejected.json")]);
    let e = ClientBuilder::new("http://example.com")
        .credentials("login", "1234567")
        .build(&NoResolver, &transport)
        .err()
        .unwrap();
    let Error::ServiceError { message, code, .. } = e else {
        panic!("Expected a service error");
    };
    assert_eq!(message, "Invalid login or password");
    assert_eq!(code, 2);
}

#[test]
fn construct_without_login_leaves_session_empty() {
    let transport = Recorder::default();
    let client = ClientBuilder::new("http://example.com/")
        .credentials("", "password")
        .build(&NoResolver, &transport)
        .unwrap();
    assert_eq!(client.token(), "");
    assert_eq!(client.stored_login(), "");
    assert_eq!(transport.count(), 0);
}

#[test]
fn service_from_url_has_no_name() {
    let client = Client::new("http://example.com/", &NoResolver, Recorder::default()).unwrap();
    assert_eq!(client.service(), "");
    assert_eq!(client.base_url(), "http://example.com/");
}

#[test]
fn service_found_in_directory() {
    let resolver =
        StaticResolver::new().with_service("existing-service", "https://existing-service.com");
    let transport = Recorder::answering(&[include_str!("data/self-id.json")]);
    let client = Client::new("existing-service", &resolver, &transport).unwrap();
    assert_eq!(client.service(), "existing-service");
    client.self_id().unwrap();
    assert_eq!(transport.last().url, "https://existing-service.com/self/id/");
}

#[test]
fn unknown_service_is_not_found() {
    let resolver =
        StaticResolver::new().with_service("existing-service", "https://existing-service.com");
    let e = Client::new("auth", &resolver, Recorder::default())
        .err()
        .unwrap();
    assert!(matches!(e, Error::ServiceNotFound(ref s) if s == "auth"));
    assert_snapshot!(e.to_string(), @"Service auth was not found in the service directory");
}

#[test]
fn set_token_is_local() {
    let transport = Recorder::default();
    let mut client = test_client(&transport);
    assert_eq!(client.token(), "");

    client.set_token("token", "login").unwrap();

    assert_eq!(client.token(), "token");
    assert_eq!(client.stored_login(), "login");
    assert_eq!(transport.count(), 0);
}

#[test]
fn set_empty_token_fails_without_mutation() {
    let transport = Recorder::default();
    let mut client = test_client(&transport);
    client.set_token("token", "login").unwrap();

    let e = client.set_token("", "someone").unwrap_err();

    assert!(matches!(e, Error::EmptyToken));
    assert_eq!(e.code(), Some(-4));
    assert_eq!(client.token(), "token");
    assert_eq!(client.stored_login(), "login");
    assert_eq!(transport.count(), 0);
}

#[test]
fn self_id_unwraps_field() {
    let transport = Recorder::answering(&[include_str!("data/self-id.json")]);
    let client = test_client(&transport);
    assert_eq!(client.self_id().unwrap(), "123");
    assert_eq!(transport.last().method, Method::GET);
    assert_eq!(transport.last().body, None);
}

#[test]
fn self_login_unwraps_field() {
    let transport = Recorder::answering(&[include_str!("data/self-login.json")]);
    let client = test_client(&transport);
    assert_eq!(client.self_login().unwrap(), "admin");
    assert_eq!(transport.last().url, "http://some-service-url/self/login/");
}

#[test]
fn self_queries_tolerate_bare_values() {
    let transport = Recorder::answering(&["\"123\"", "\"admin\""]);
    let client = test_client(&transport);
    assert_eq!(client.self_id().unwrap(), "123");
    assert_eq!(client.self_login().unwrap(), "admin");
}

#[test]
fn login_as_by_login_replaces_token() {
    let transport = Recorder::answering(&[include_str!("data/login-as.json")]);
    let mut client = test_client(&transport);
    client.set_token("admin-token", "admin").unwrap();

    client.login_as("registered", "login").unwrap();

    assert_eq!(client.token(), "session-id");
    assert_eq!(client.stored_login(), "registered");
    let sent = transport.last();
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.url, "http://some-service-url/login-as/");
    assert_eq!(sent.body, Some(json!({"login": "registered"})));
    assert_eq!(sent.headers["authentication"], "Basic admin-token");
}

#[test]
fn login_as_current_login_skips_request() {
    let transport = Recorder::default();
    let mut client = test_client(&transport);
    client.set_token("token", "registered").unwrap();

    client.login_as("registered", "login").unwrap();

    assert_eq!(transport.count(), 0);
    assert_eq!(client.token(), "token");
    assert_eq!(client.stored_login(), "registered");
}

#[test]
fn login_as_with_invalid_session_id_fails_without_mutation() {
    let transport =
        Recorder::answering(&[include_str!("data/login-with-invalid-session-id.json")]);
    let mut client = test_client(&transport);
    client.set_token("token", "admin").unwrap();

    let e = client.login_as("registered-user", "login").unwrap_err();

    assert!(matches!(e, Error::AuthenticationFailed { .. }));
    assert_eq!(client.token(), "token");
    assert_eq!(client.stored_login(), "admin");
}

#[test]
fn login_as_by_id_clears_login() {
    let transport =
        Recorder::answering(&[include_str!("data/login-with-invalid-session-id.json")]);
    let mut client = test_client(&transport);
    client.set_token("token", "admin").unwrap();

    client.login_as("registered", "id").unwrap();

    assert_eq!(client.stored_login(), "");
    assert_eq!(client.token(), "token");
    assert_eq!(transport.count(), 0);
}

#[test]
fn login_as_by_id_after_login_impersonation_clears_login() {
    let transport = Recorder::answering(&[include_str!("data/login-as.json")]);
    let mut client = test_client(&transport);
    client.login_as("registered", "login").unwrap();
    assert_eq!(client.stored_login(), "registered");

    client.login_as("registered", "id").unwrap();

    assert_eq!(client.stored_login(), "");
    assert_eq!(client.token(), "session-id");
}

#[test]
fn requests_carry_both_authentication_headers() {
    let transport = Recorder::answering(&[r#"{"session_id":"some-password"}"#]);
    let mut client = test_client(&transport);
    client.set_token("some-token", "").unwrap();

    client.connect("some-login", "some-password").unwrap();

    let sent = transport.last();
    assert_eq!(sent.headers["Authentication"], "Basic some-token");
    assert_eq!(sent.headers["Cgi-Authorization"], "Basic some-token");
    drop(sent);
    assert_eq!(client.token(), "some-password");
    assert_eq!(client.stored_login(), "some-login");
}

#[test]
fn requests_without_token_carry_no_authentication_headers() {
    let transport = Recorder::answering(&[include_str!("data/test-request.json")]);
    let client = test_client(&transport);
    client.get("/some-endpoint").unwrap();
    let sent = transport.last();
    assert!(sent.headers.get("authentication").is_none());
    assert!(sent.headers.get("cgi-authorization").is_none());
}

#[test]
fn query_mode_routes_through_parameter() {
    let transport = Recorder::answering(&[
        include_str!("data/self-id.json"),
        include_str!("data/construct-with-login.json"),
    ]);
    let mut client = test_client(&transport);
    assert!(client.rewrite_mode());
    client.set_rewrite_mode(false);
    assert!(!client.rewrite_mode());

    client.self_id().unwrap();
    assert_eq!(transport.last().url, "http://some-service-url?r=self%2Fid");
    client.connect("login", "password").unwrap();
    assert_eq!(transport.last().url, "http://some-service-url?r=connect");
}

#[test]
fn request_urls_follow_rewrite_mode() {
    let transport = Recorder::default();
    let mut client = test_client(&transport);
    let expected = [
        (locator::CONNECT, "/connect/", "?r=connect"),
        (locator::SELF_ID, "/self/id/", "?r=self%2Fid"),
        (locator::SELF_LOGIN, "/self/login/", "?r=self%2Flogin"),
        (locator::LOGIN_AS, "/login-as/", "?r=login-as"),
    ];
    for (locator, rewritten, routed) in expected {
        client.set_rewrite_mode(true);
        assert_eq!(client.get_request_url(locator).unwrap(), rewritten);
        client.set_rewrite_mode(false);
        assert_eq!(client.get_request_url(locator).unwrap(), routed);
    }
    let e = client.get_request_url("unexistingUri").unwrap_err();
    assert!(matches!(e, Error::UnknownLocator(_)));
}

#[test]
fn generic_requests_use_their_methods() {
    let body = include_str!("data/test-request.json");
    let transport = Recorder::answering(&[body, body, body, body]);
    let client = test_client(&transport);
    let data = json!({"key": "value"});

    assert_eq!(client.get("/items/").unwrap()["result"], 1);
    assert_eq!(transport.last().method, Method::GET);
    assert_eq!(client.post("/items/", &data).unwrap()["result"], 1);
    assert_eq!(transport.last().method, Method::POST);
    assert_eq!(client.put("/items/1/", &data).unwrap()["result"], 1);
    assert_eq!(transport.last().method, Method::PUT);
    assert_eq!(client.delete("/items/1/", &data).unwrap()["result"], 1);
    assert_eq!(transport.last().method, Method::DELETE);
    assert_eq!(transport.last().body.as_ref(), Some(&data));
}

#[test]
fn service_errors_are_reported() {
    let transport = Recorder::default();
    transport.respond(StatusCode::OK, r#"{"message": "X", "code": 1}"#);
    let client = test_client(&transport);

    let e = client.get("/some-endpoint").unwrap_err();

    assert_eq!(e.code(), Some(1));
    assert_snapshot!(e.to_string(), @"(1) X; http-status: 200 OK; url: http://some-service-url/some-endpoint");
}

#[test]
fn garbage_is_an_invalid_result() {
    let transport = Recorder::default();
    transport.respond(StatusCode::INTERNAL_SERVER_ERROR, "some crap");
    let client = test_client(&transport);

    let e = client.get("/some-endpoint").unwrap_err();

    let Error::InvalidResult { status, body, url } = e else {
        panic!("Expected an invalid result");
    };
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "some crap");
    assert_eq!(url, "http://some-service-url/some-endpoint");
}

#[test]
fn transport_failures_propagate() {
    let transport = Recorder::default();
    let mut client = test_client(&transport);
    let e = client.connect("login", "password").unwrap_err();
    assert!(matches!(e, Error::Transport(_)));
    assert_eq!(client.token(), "");
}
