#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempus_fugit::application::services::AuthService;
use tempus_fugit::domain::gateway::{AccountingTransport, GatewayError};
use tempus_fugit::domain::openair::{ApplicationIdentity, TaskQuery};
use tempus_fugit::infrastructure::ExpiringMemoryStore;
use tempus_fugit::routes::{RouterOptions, build_router};
use tempus_fugit::state::AppState;
use tempus_fugit::web::session::SessionSettings;

pub const TEST_COMPANY: &str = "BFA";

pub const TEST_SECRET: &str = "test-session-secret-that-is-long-enough";

/// Reply of an accounting service that accepted the login.
pub const AUTHORIZED_REPLY: &str = r#"<?xml version="1.0" standalone="yes"?>
<response><Auth status="0"></Auth><Read status="0"><Task><id>1</id><timesheetid>7</timesheetid></Task></Read></response>"#;

/// Reply of an accounting service that rejected the login.
pub const REJECTED_REPLY: &str =
    r#"<?xml version="1.0" standalone="yes"?><response><Auth status="1"></Auth></response>"#;

/// How the stub accounting service answers.
#[derive(Clone)]
pub enum StubReply {
    Xml(String),
    TransportFailure,
    HttpStatus(u16),
}

/// In-process accounting service recording every request body.
pub struct StubTransport {
    reply: StubReply,
    calls: AtomicUsize,
    bodies: Mutex<Vec<String>>,
}

impl StubTransport {
    pub fn new(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            bodies: Mutex::new(Vec::new()),
        })
    }

    pub fn authorized() -> Arc<Self> {
        Self::new(StubReply::Xml(AUTHORIZED_REPLY.to_string()))
    }

    pub fn rejected() -> Arc<Self> {
        Self::new(StubReply::Xml(REJECTED_REPLY.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<String> {
        self.bodies.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AccountingTransport for StubTransport {
    async fn send(&self, body: String) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies.lock().unwrap().push(body);

        match &self.reply {
            StubReply::Xml(xml) => Ok(xml.clone()),
            StubReply::TransportFailure => Err(GatewayError::Transport(
                "connection refused".to_string(),
            )),
            StubReply::HttpStatus(code) => Err(GatewayError::HttpStatus(*code)),
        }
    }
}

pub fn test_application() -> ApplicationIdentity {
    ApplicationIdentity {
        client: "tempus-fugit".to_string(),
        client_version: "1.1".to_string(),
        namespace: "default".to_string(),
        api_key: "test-api-key".to_string(),
    }
}

pub fn test_query() -> TaskQuery {
    TaskQuery {
        since: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap(),
        project_id: "313".to_string(),
        limit: 1000,
    }
}

pub fn create_test_state(transport: Arc<StubTransport>) -> AppState {
    let auth_service = Arc::new(AuthService::new(
        transport,
        test_application(),
        test_query(),
    ));

    AppState::new(auth_service, TEST_COMPANY)
}

pub fn test_options() -> RouterOptions {
    test_options_with_store(ExpiringMemoryStore::new())
}

/// Router options whose sessions live in `store`, so tests can inspect it.
pub fn test_options_with_store(store: ExpiringMemoryStore) -> RouterOptions {
    RouterOptions {
        session: SessionSettings {
            secret: TEST_SECRET.to_string(),
            secure: false,
            idle_timeout: Duration::from_secs(3600),
            store,
        },
        login_rate_limit: false,
        behind_proxy: false,
        static_dir: "static".to_string(),
    }
}

pub fn test_router(transport: Arc<StubTransport>) -> Router {
    build_router(create_test_state(transport), &test_options())
}

/// Test server that keeps cookies between requests, like a browser.
pub fn test_server(transport: Arc<StubTransport>) -> TestServer {
    TestServer::builder()
        .save_cookies()
        .build(test_router(transport))
        .unwrap()
}

/// Test server whose session store is returned alongside it.
pub fn test_server_with_store(transport: Arc<StubTransport>) -> (TestServer, ExpiringMemoryStore) {
    let store = ExpiringMemoryStore::new();
    let router = build_router(
        create_test_state(transport),
        &test_options_with_store(store.clone()),
    );
    let server = TestServer::builder().save_cookies().build(router).unwrap();

    (server, store)
}

/// Pulls the hidden CSRF token out of a rendered login form.
pub fn extract_csrf_token(html: &str) -> String {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker).expect("login form has a csrf field") + marker.len();
    let end = html[start..].find('"').expect("csrf value is quoted") + start;
    html[start..end].to_string()
}

/// Loads the login form and returns its CSRF token.
pub async fn fetch_csrf_token(server: &TestServer) -> String {
    let page = server.get("/login.html").await;
    page.assert_status_ok();
    extract_csrf_token(&page.text())
}

/// Logs in through the form; returns the POST response.
pub async fn login(server: &TestServer, username: &str, password: &str) -> axum_test::TestResponse {
    let token = fetch_csrf_token(server).await;

    server
        .post("/login.html")
        .form(&[
            ("username", username),
            ("password", password),
            ("csrf_token", token.as_str()),
        ])
        .await
}
